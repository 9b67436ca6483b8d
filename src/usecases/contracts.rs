use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Failure surface of the backend. The variants follow what the UI can do
/// with them: render inline, show as an alert, or show the raw message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("{title}")]
    Structured {
        title: String,
        description: Option<String>,
    },
    #[error("{0}")]
    Message(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Structured { .. } => "API_STRUCTURED_ERROR",
            Self::Message(_) => "API_MESSAGE_ERROR",
            Self::Transport(_) => "API_TRANSPORT_ERROR",
            Self::Decode(_) => "API_DECODE_ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct TermsStatus {
    #[serde(default)]
    pub requires_pp_update: bool,
    #[serde(default)]
    pub requires_tc_update: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
        }
    }

    /// Push provider name the chat backend expects for this platform.
    pub fn chat_push_provider(self) -> &'static str {
        match self {
            Self::Ios => "apn",
            Self::Android => "firebase",
        }
    }
}

/// Device payload sent to the backend when a push token is available.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRegistration {
    pub token: String,
    pub player_id: Option<String>,
    pub platform: Platform,
    pub brand: String,
    pub model: String,
    pub sys_version: String,
    pub app_version: String,
    pub build_number: String,
    pub bundle_id: String,
    pub device_uuid: String,
}

#[async_trait]
pub trait SessionApi: Send + Sync {
    async fn login(&self, credentials: &Credentials, version: &str) -> Result<Session, ApiError>;
    async fn relogin(&self, version: &str) -> Result<Session, ApiError>;
    async fn logout(&self) -> Result<bool, ApiError>;
    async fn verify_edge_credentials(&self, credentials: &Credentials) -> Result<bool, ApiError>;
    async fn migrate_edge_account_to_ua(&self, credentials: &Credentials) -> Result<(), ApiError>;
    async fn register_trainer_with_ua_account(
        &self,
        credentials: &Credentials,
        accepted_terms: bool,
    ) -> Result<(), ApiError>;
    async fn check_terms(&self) -> Result<TermsStatus, ApiError>;
    async fn create_password_reset_request(&self, email: &str) -> Result<(), ApiError>;
    async fn chat_token(&self) -> Result<Option<String>, ApiError>;
    async fn default_avatar_image_url(&self) -> Result<String, ApiError>;
    async fn register_for_push(&self, device: &DeviceRegistration) -> Result<(), ApiError>;
}

/// Locally persisted "remember me" setting.
pub trait LoginPreferenceStore: Send + Sync {
    fn update_login_preferences(&self, remember_me: bool, email: &str) -> Result<()>;
}

pub trait Analytics: Send + Sync {
    fn set_user(&self, user_id: &str);
    fn set_user_property(&self, key: &str, value: &str);
    fn log_event(&self, name: &str, props: &[(&str, &str)]);
    fn track(&self, event: &str);
    fn flush(&self);
    fn reset(&self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrashUser {
    pub id: String,
    pub email: String,
}

pub trait CrashReporter: Send + Sync {
    fn set_user_context(&self, user: Option<CrashUser>);
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushSubscriptionStatus {
    pub push_token: Option<String>,
    pub player_id: Option<String>,
}

#[async_trait]
pub trait PushRegistrar: Send + Sync {
    async fn is_emulator(&self) -> bool;
    fn request_permission(&self);
    fn set_subscription(&self, enabled: bool);
    fn send_tags(&self, tags: &BTreeMap<String, String>);
    fn delete_tag(&self, key: &str);
    fn set_external_user_id(&self, user_id: &str);
    fn remove_external_user_id(&self);
    /// Resolves once the OS has reported the current subscription.
    async fn subscription_status(&self) -> PushSubscriptionStatus;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatUser {
    pub id: String,
    pub name: String,
    pub image: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn connect_user(&self, user: &ChatUser, token: &str) -> Result<()>;
    async fn disconnect(&self);
    async fn add_device(&self, token: &str, push_provider: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeRole {
    Trainer,
    Client,
    WalkIn,
}

impl HomeRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trainer => "trainer",
            Self::Client => "client",
            Self::WalkIn => "walk_in",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    TermsAndConditions { update_privacy: bool },
    PrivacyPolicy,
    ChangePassword {
        email: String,
        password: String,
        remember_me: bool,
    },
    LinkAccount { email: String, remember_me: bool },
    WebView { title: String, uri: String },
    DeepLink(String),
    /// Reset the stack to the signed-in home for the given role.
    Home { role: HomeRole, user_id: String },
}

pub trait Navigator: Send + Sync {
    fn navigate(&self, destination: Destination);
    fn go_back(&self);
}

pub trait AlertPresenter: Send + Sync {
    fn alert(&self, title: &str, message: &str);
    fn confirm(&self, title: &str, message: &str) -> bool;
}
