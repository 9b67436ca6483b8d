use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use crate::usecases::contracts::{ChatClient, ChatUser};

/// Chat client that only records the connected user. Stands in where no chat
/// SDK is linked.
#[derive(Debug, Default)]
pub struct LoggingChatClient {
    current: Mutex<Option<ChatUser>>,
}

impl LoggingChatClient {
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn current_user(&self) -> Option<ChatUser> {
        self.current.lock().ok().and_then(|user| user.clone())
    }
}

#[async_trait]
impl ChatClient for LoggingChatClient {
    async fn connect_user(&self, user: &ChatUser, _token: &str) -> Result<()> {
        if let Ok(mut current) = self.current.lock() {
            *current = Some(user.clone());
        }
        tracing::info!(user_id = %user.id, "chat user connected");
        Ok(())
    }

    async fn disconnect(&self) {
        if let Ok(mut current) = self.current.lock() {
            if current.take().is_some() {
                tracing::info!("chat user disconnected");
            }
        }
    }

    async fn add_device(&self, _token: &str, push_provider: &str) -> Result<()> {
        tracing::debug!(push_provider, "chat device added");
        Ok(())
    }
}
