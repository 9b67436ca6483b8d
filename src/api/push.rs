use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;

use crate::usecases::contracts::{PushRegistrar, PushSubscriptionStatus};

#[derive(Debug, Default)]
struct PushState {
    permission_requested: bool,
    subscribed: bool,
    external_user_id: Option<String>,
    tags: BTreeMap<String, String>,
}

/// Push registrar for hosts without a push service. It tracks what the app
/// asked for and never yields a device token, so nothing is registered with
/// the backend.
#[derive(Debug)]
pub struct LocalPushRegistrar {
    is_emulator: bool,
    state: Mutex<PushState>,
}

impl LocalPushRegistrar {
    pub fn new(is_emulator: bool) -> Self {
        Self {
            is_emulator,
            state: Mutex::new(PushState::default()),
        }
    }

    fn update(&self, apply: impl FnOnce(&mut PushState)) {
        if let Ok(mut state) = self.state.lock() {
            apply(&mut state);
        }
    }
}

#[async_trait]
impl PushRegistrar for LocalPushRegistrar {
    async fn is_emulator(&self) -> bool {
        self.is_emulator
    }

    fn request_permission(&self) {
        self.update(|state| state.permission_requested = true);
    }

    fn set_subscription(&self, enabled: bool) {
        self.update(|state| state.subscribed = enabled);
        tracing::debug!(enabled, "push subscription changed");
    }

    fn send_tags(&self, tags: &BTreeMap<String, String>) {
        self.update(|state| {
            state
                .tags
                .extend(tags.iter().map(|(key, value)| (key.clone(), value.clone())))
        });
    }

    fn delete_tag(&self, key: &str) {
        self.update(|state| {
            state.tags.remove(key);
        });
    }

    fn set_external_user_id(&self, user_id: &str) {
        self.update(|state| state.external_user_id = Some(user_id.to_owned()));
    }

    fn remove_external_user_id(&self) {
        self.update(|state| state.external_user_id = None);
    }

    async fn subscription_status(&self) -> PushSubscriptionStatus {
        let player_id = self
            .state
            .lock()
            .ok()
            .and_then(|state| state.external_user_id.clone());

        PushSubscriptionStatus {
            push_token: None,
            player_id,
        }
    }
}
