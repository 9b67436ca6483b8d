use std::sync::{Arc, Mutex};

use crate::{
    domain::session::Session,
    usecases::contracts::{AlertPresenter, ChatClient, ChatUser, SessionApi},
};

const CHAT_ERROR_TITLE: &str = "Error connecting to chat";
const CHAT_TOKEN_MISSING: &str = "Did not receive token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatSessionState {
    Disconnected,
    Connecting { user_id: String, attempt: u64 },
    Connected { user_id: String, attempt: u64 },
}

impl ChatSessionState {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Disconnected => "CHAT_DISCONNECTED",
            Self::Connecting { .. } => "CHAT_CONNECTING",
            Self::Connected { .. } => "CHAT_CONNECTED",
        }
    }

    fn user_id(&self) -> Option<&str> {
        match self {
            Self::Disconnected => None,
            Self::Connecting { user_id, .. } | Self::Connected { user_id, .. } => Some(user_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BeginConnect {
    AlreadyActive,
    Start { attempt: u64, drop_previous: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FinishConnect {
    Connected,
    /// A newer attempt or a disconnect superseded this one.
    Stale { tear_down: bool },
}

#[derive(Debug)]
struct GateInner {
    state: ChatSessionState,
    next_attempt: u64,
}

/// Owns the single chat-client session. Connects are keyed by user id and
/// numbered so a late completion can never resurrect a superseded session.
/// Connects run one at a time; a disconnect never waits for them.
pub struct ChatSessionGate {
    client: Arc<dyn ChatClient>,
    inner: Mutex<GateInner>,
    connecting: tokio::sync::Mutex<()>,
}

impl ChatSessionGate {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            inner: Mutex::new(GateInner {
                state: ChatSessionState::Disconnected,
                next_attempt: 1,
            }),
            connecting: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> ChatSessionState {
        self.inner
            .lock()
            .map(|inner| inner.state.clone())
            .unwrap_or(ChatSessionState::Disconnected)
    }

    pub fn client(&self) -> &Arc<dyn ChatClient> {
        &self.client
    }

    /// Bootstraps chat for `session`. Failures are surfaced as a blocking
    /// alert and never propagate to the login that triggered them.
    pub async fn login_to_chat(
        &self,
        session: &Session,
        api: &dyn SessionApi,
        alerts: &dyn AlertPresenter,
    ) {
        let _serial = self.connecting.lock().await;
        let attempt = match self.begin(&session.id) {
            BeginConnect::AlreadyActive => {
                tracing::debug!(user_id = %session.id, "chat session already active for user");
                return;
            }
            BeginConnect::Start {
                attempt,
                drop_previous,
            } => {
                if drop_previous {
                    self.client.disconnect().await;
                }
                attempt
            }
        };

        let image = match session.avatar_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => url.to_owned(),
            None => api.default_avatar_image_url().await.unwrap_or_else(|error| {
                tracing::warn!(
                    code = error.code(),
                    "default avatar lookup failed, connecting chat without image"
                );
                String::new()
            }),
        };
        let user = ChatUser {
            id: session.id.clone(),
            name: session.full_name.clone(),
            image,
        };

        let token = match api.chat_token().await {
            Ok(Some(token)) if !token.is_empty() => token,
            Ok(_) => {
                self.abandon(attempt);
                alerts.alert(CHAT_ERROR_TITLE, CHAT_TOKEN_MISSING);
                return;
            }
            Err(error) => {
                self.abandon(attempt);
                alerts.alert(CHAT_ERROR_TITLE, &error.to_string());
                return;
            }
        };

        if !self.is_current(attempt) {
            tracing::debug!(user_id = %user.id, attempt, "chat connect superseded before start");
            return;
        }

        if let Err(error) = self.client.connect_user(&user, &token).await {
            self.abandon(attempt);
            alerts.alert(CHAT_ERROR_TITLE, &error.to_string());
            return;
        }

        match self.finish(attempt) {
            FinishConnect::Connected => {
                tracing::info!(user_id = %user.id, attempt, "chat session connected");
            }
            FinishConnect::Stale { tear_down } => {
                tracing::warn!(
                    code = "CHAT_STALE_CONNECT",
                    user_id = %user.id,
                    attempt,
                    "chat connect completed after being superseded"
                );
                if tear_down {
                    self.client.disconnect().await;
                }
            }
        }
    }

    /// Drops any chat session, connected or in flight.
    pub async fn disconnect(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.state = ChatSessionState::Disconnected;
        }
        self.client.disconnect().await;
    }

    fn begin(&self, user_id: &str) -> BeginConnect {
        let Ok(mut inner) = self.inner.lock() else {
            return BeginConnect::AlreadyActive;
        };

        let drop_previous = match inner.state.user_id() {
            Some(current) if current == user_id => return BeginConnect::AlreadyActive,
            Some(_) => true,
            None => false,
        };

        let attempt = inner.next_attempt;
        inner.next_attempt += 1;
        inner.state = ChatSessionState::Connecting {
            user_id: user_id.to_owned(),
            attempt,
        };

        BeginConnect::Start {
            attempt,
            drop_previous,
        }
    }

    fn finish(&self, attempt: u64) -> FinishConnect {
        let Ok(mut inner) = self.inner.lock() else {
            return FinishConnect::Stale { tear_down: false };
        };

        match &inner.state {
            ChatSessionState::Connecting {
                user_id,
                attempt: current,
            } if *current == attempt => {
                inner.state = ChatSessionState::Connected {
                    user_id: user_id.clone(),
                    attempt,
                };
                FinishConnect::Connected
            }
            ChatSessionState::Disconnected => FinishConnect::Stale { tear_down: true },
            _ => FinishConnect::Stale { tear_down: false },
        }
    }

    fn is_current(&self, attempt: u64) -> bool {
        self.inner.lock().is_ok_and(|inner| {
            matches!(
                inner.state,
                ChatSessionState::Connecting { attempt: current, .. } if current == attempt
            )
        })
    }

    fn abandon(&self, attempt: u64) {
        if let Ok(mut inner) = self.inner.lock() {
            if matches!(
                inner.state,
                ChatSessionState::Connecting { attempt: current, .. } if current == attempt
            ) {
                inner.state = ChatSessionState::Disconnected;
            }
        }
    }
}
