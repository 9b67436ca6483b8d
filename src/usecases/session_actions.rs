use std::{collections::BTreeMap, sync::Arc};

use chrono::Utc;

use crate::{
    domain::{
        session::Session,
        session_store::{SessionAction, SessionStore},
    },
    usecases::{
        chat_session::ChatSessionGate,
        contracts::{
            AlertPresenter, Analytics, ApiError, CrashReporter, CrashUser, Credentials,
            DeviceRegistration, Platform, PushRegistrar, SessionApi,
        },
    },
};

const LOGIN_TRACK_EVENT: &str = "login_succeeded";

/// Static description of the device the app runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceProfile {
    pub platform: Platform,
    pub brand: String,
    pub model: String,
    pub os_version: String,
    pub app_version: String,
    pub build_number: String,
    pub bundle_id: String,
    pub device_uuid: String,
}

impl DeviceProfile {
    fn registration(&self, token: String, player_id: Option<String>) -> DeviceRegistration {
        DeviceRegistration {
            token,
            player_id,
            platform: self.platform,
            brand: self.brand.clone(),
            model: self.model.clone(),
            sys_version: self.os_version.clone(),
            app_version: self.app_version.clone(),
            build_number: self.build_number.clone(),
            bundle_id: self.bundle_id.clone(),
            device_uuid: self.device_uuid.clone(),
        }
    }
}

/// External services the session actions talk to.
#[derive(Clone)]
pub struct SessionServices {
    pub api: Arc<dyn SessionApi>,
    pub analytics: Arc<dyn Analytics>,
    pub crash: Arc<dyn CrashReporter>,
    pub push: Arc<dyn PushRegistrar>,
    pub chat: Arc<ChatSessionGate>,
    pub alerts: Arc<dyn AlertPresenter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSettings {
    pub api_version: String,
    pub chat_enabled: bool,
    pub device: DeviceProfile,
}

/// Async orchestrators for login, relogin, logout and push registration.
///
/// Every successful authentication updates the store first and only then
/// touches analytics, crash reporting and chat, in that order.
pub struct SessionActions {
    services: SessionServices,
    store: SessionStore,
    settings: SessionSettings,
}

impl SessionActions {
    pub fn new(services: SessionServices, store: SessionStore, settings: SessionSettings) -> Self {
        Self {
            services,
            store,
            settings,
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn services(&self) -> &SessionServices {
        &self.services
    }

    pub fn api_version(&self) -> &str {
        &self.settings.api_version
    }

    /// Logs in with explicit credentials. Backend errors propagate.
    pub async fn login(
        &self,
        credentials: &Credentials,
        version: &str,
    ) -> Result<Session, ApiError> {
        let session = self.services.api.login(credentials, version).await?;
        tracing::info!(user_id = %session.id, version, "login succeeded");

        self.store.dispatch(SessionAction::Login(session.clone()));
        self.announce_session(&session).await;

        Ok(session)
    }

    /// Silent background refresh from the stored token. Never fails; a
    /// rejected or unreachable backend yields `None`.
    pub async fn relogin(&self, version: &str) -> Option<Session> {
        let session = match self.services.api.relogin(version).await {
            Ok(session) => session,
            Err(error) => {
                tracing::warn!(
                    code = error.code(),
                    version,
                    "relogin failed, continuing signed out"
                );
                return None;
            }
        };
        tracing::info!(user_id = %session.id, version, "relogin succeeded");

        self.store.dispatch(SessionAction::Login(session.clone()));
        self.announce_session(&session).await;

        Some(session)
    }

    /// Signs out. Every local cleanup step runs exactly once whatever the
    /// backend answers; the return value is the backend's verdict.
    pub async fn logout(&self) -> bool {
        self.services.analytics.flush();
        self.services.analytics.reset();

        let logout_successful = match self.services.api.logout().await {
            Ok(successful) => successful,
            Err(error) => {
                tracing::warn!(
                    code = error.code(),
                    "backend logout failed, clearing local session anyway"
                );
                false
            }
        };

        if self.settings.chat_enabled {
            self.services.chat.disconnect().await;
        }
        self.unregister_from_push();
        self.services.crash.set_user_context(None);
        self.store.dispatch(SessionAction::Logout);

        tracing::info!(logout_successful, "logout completed");
        logout_successful
    }

    #[cfg_attr(not(test), allow(dead_code))]
    pub fn update_current_user(&self, session: Session) {
        self.store.dispatch(SessionAction::Update(session));
    }

    pub async fn register_for_push(
        &self,
        user_id: &str,
        role: &str,
        extra_tags: Option<&BTreeMap<String, String>>,
    ) {
        let push = &self.services.push;
        if push.is_emulator().await {
            tracing::debug!("skipping push registration on emulator");
            return;
        }

        if self.settings.device.platform == Platform::Ios {
            push.request_permission();
        }
        push.set_subscription(true);

        let mut tags = BTreeMap::from([
            ("user_id".to_owned(), user_id.to_owned()),
            ("user_type".to_owned(), role.to_owned()),
            (
                "app_version".to_owned(),
                self.settings.device.app_version.clone(),
            ),
        ]);
        if let Some(extra) = extra_tags {
            tags.extend(extra.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        push.send_tags(&tags);
        push.set_external_user_id(user_id);

        let status = push.subscription_status().await;
        let Some(token) = status.push_token else {
            tracing::debug!("push subscription has no token yet");
            return;
        };

        let device = self
            .settings
            .device
            .registration(token.clone(), status.player_id);
        if let Err(error) = self.services.api.register_for_push(&device).await {
            tracing::warn!(code = error.code(), "push device registration failed");
        }

        if self.settings.chat_enabled {
            let provider = self.settings.device.platform.chat_push_provider();
            if let Err(error) = self
                .services
                .chat
                .client()
                .add_device(&token, provider)
                .await
            {
                tracing::warn!(
                    code = "CHAT_ADD_DEVICE_FAILED",
                    error = %error,
                    "failed to attach push token to chat"
                );
            }
        }
    }

    async fn announce_session(&self, session: &Session) {
        let analytics = &self.services.analytics;
        let now = Utc::now();

        analytics.set_user_property("id", &session.id);
        analytics.set_user(&session.id);
        analytics.set_user_property("Email", &session.email);
        analytics.set_user_property("Role", session.role.as_str());
        if session.is_trainer() {
            analytics.set_user_property(
                "active_subscriptions",
                &session.has_active_subscription(now).to_string(),
            );
            analytics.set_user_property("Purchases", &session.has_purchases().to_string());
        }
        analytics.set_user_property("LevelOfSubscription", &session.subscription_tier(now));
        analytics.track(LOGIN_TRACK_EVENT);

        self.services.crash.set_user_context(Some(CrashUser {
            id: session.id.clone(),
            email: session.email.clone(),
        }));

        if self.settings.chat_enabled {
            self.services
                .chat
                .login_to_chat(
                    session,
                    self.services.api.as_ref(),
                    self.services.alerts.as_ref(),
                )
                .await;
        }
    }

    fn unregister_from_push(&self) {
        let push = &self.services.push;
        push.set_subscription(false);
        push.delete_tag("user_id");
        push.delete_tag("user_type");
        push.remove_external_user_id();
    }
}
