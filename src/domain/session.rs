use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// Account role as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Client,
    Trainer,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Client => "CLIENT",
            Self::Trainer => "TRAINER",
            Self::Other(value) => value,
        }
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CLIENT" => Self::Client,
            "TRAINER" => Self::Trainer,
            _ => Self::Other(value),
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_owned()
    }
}

/// Backend ids arrive as JSON numbers or strings; both are kept as text.
fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(Number),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerRef {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientUser {
    #[serde(default)]
    pub trainer: Option<TrainerRef>,
}

/// The authenticated user record held by the session store.
///
/// Fields the core does not interpret are kept in `extra` so a profile
/// update can carry them through unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub subscription_expiration_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub purchased_product_ids: Vec<String>,
    #[serde(default)]
    pub subscription_level: Option<String>,
    #[serde(default)]
    pub client_user: Option<ClientUser>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Session {
    pub fn is_trainer(&self) -> bool {
        self.role == Role::Trainer
    }

    /// A client with no assigned trainer.
    pub fn is_walk_in_client(&self) -> bool {
        if self.role != Role::Client {
            return false;
        }

        self.client_user
            .as_ref()
            .and_then(|client| client.trainer.as_ref())
            .is_none()
    }

    pub fn has_active_subscription(&self, now: DateTime<Utc>) -> bool {
        self.subscription_expiration_date
            .is_some_and(|expires_at| now <= expires_at)
    }

    pub fn has_purchases(&self) -> bool {
        !self.purchased_product_ids.is_empty()
    }

    /// Subscription tier label reported to analytics.
    pub fn subscription_tier(&self, now: DateTime<Utc>) -> String {
        if let Some(level) = self
            .subscription_level
            .as_deref()
            .filter(|level| !level.is_empty())
        {
            return level.to_owned();
        }

        match self.role {
            Role::Trainer if self.has_active_subscription(now) => "active".to_owned(),
            Role::Trainer => "expired".to_owned(),
            _ => "none".to_owned(),
        }
    }
}
