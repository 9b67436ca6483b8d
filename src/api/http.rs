use std::{fs, path::PathBuf, sync::Mutex, time::Duration};

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use crate::{
    domain::session::Session,
    infra::{config::ApiConfig, error::AppError},
    usecases::contracts::{ApiError, Credentials, DeviceRegistration, SessionApi, TermsStatus},
};

const API_TOKEN_PERSIST_FAILED: &str = "API_TOKEN_PERSIST_FAILED";

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
    user: Session,
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    verified: bool,
}

#[derive(Debug, Deserialize)]
struct ChatTokenResponse {
    #[serde(default, rename = "chat-token")]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvatarResponse {
    url: String,
}

/// `SessionApi` over the REST backend.
///
/// The bearer token from the last login is mirrored to `token_file` so a later
/// process can `relogin` without credentials.
pub struct HttpSessionApi {
    http: reqwest::Client,
    base_url: String,
    default_version: String,
    token: Mutex<Option<String>>,
    token_file: PathBuf,
}

impl HttpSessionApi {
    pub fn new(config: &ApiConfig, token_file: PathBuf) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(AppError::HttpClient)?;

        let token = match fs::read_to_string(&token_file) {
            Ok(raw) => Some(raw.trim().to_owned()).filter(|token| !token.is_empty()),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => {
                return Err(AppError::StorageIo {
                    path: token_file,
                    source,
                })
            }
        };

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            default_version: config.version.clone(),
            token: Mutex::new(token),
            token_file,
        })
    }

    fn url(&self, version: &str, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, version, path.trim_start_matches('/'))
    }

    fn bearer(&self) -> Option<String> {
        self.token.lock().ok().and_then(|token| token.clone())
    }

    fn store_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.lock() {
            slot.clone_from(&token);
        }

        let result = match token {
            Some(token) => fs::write(&self.token_file, token),
            None => match fs::remove_file(&self.token_file) {
                Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };

        if let Err(error) = result {
            tracing::warn!(
                code = API_TOKEN_PERSIST_FAILED,
                path = %self.token_file.display(),
                error = %error,
                "session token could not be persisted"
            );
        }
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        url: String,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = self.bearer() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        tracing::debug!(%method, %url, "api request");
        let response = request
            .send()
            .await
            .map_err(|error| ApiError::Transport(error.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(error_from_body(status, &text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|error| ApiError::Transport(error.without_url().to_string()))?;
        decode_body(&bytes)
    }
}

/// Decodes a success body. An empty body reads as JSON `null`, whatever the
/// status code.
fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ApiError> {
    let result = if bytes.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(bytes)
    };

    result.map_err(|error| ApiError::Decode(error.to_string()))
}

/// A logout body without an explicit `success` flag counts as success.
fn logout_succeeded(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool).unwrap_or(true)
}

/// Maps a non-success response body to the error surface the screens use.
pub fn error_from_body(status: StatusCode, body: &str) -> ApiError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|mut value| value.get_mut("message").map(Value::take));

    match message {
        Some(Value::String(text)) if !text.is_empty() => ApiError::Message(text),
        Some(Value::Object(object)) => match object.get("title").and_then(Value::as_str) {
            Some(title) => ApiError::Structured {
                title: title.to_owned(),
                description: object
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_owned),
            },
            None => ApiError::Message(format!("HTTP {}", status.as_u16())),
        },
        _ => ApiError::Message(format!("HTTP {}", status.as_u16())),
    }
}

#[async_trait]
impl SessionApi for HttpSessionApi {
    async fn login(&self, credentials: &Credentials, version: &str) -> Result<Session, ApiError> {
        let response: LoginResponse = self
            .request(
                Method::POST,
                self.url(version, "auth/login"),
                Some(json!({
                    "email": credentials.email,
                    "password": credentials.password,
                })),
            )
            .await?;

        self.store_token(Some(response.token));
        Ok(response.user)
    }

    async fn relogin(&self, version: &str) -> Result<Session, ApiError> {
        if self.bearer().is_none() {
            return Err(ApiError::Message("No saved session".to_owned()));
        }

        self.request(Method::GET, self.url(version, "users/me"), None).await
    }

    async fn logout(&self) -> Result<bool, ApiError> {
        let result: Result<Value, ApiError> = self
            .request(
                Method::POST,
                self.url(&self.default_version, "auth/logout"),
                None,
            )
            .await;

        // Local credentials go regardless of what the backend said.
        self.store_token(None);
        result.map(|body| logout_succeeded(&body))
    }

    async fn verify_edge_credentials(&self, credentials: &Credentials) -> Result<bool, ApiError> {
        let response: VerifyResponse = self
            .request(
                Method::POST,
                self.url(&self.default_version, "edge/verify"),
                Some(json!({
                    "email": credentials.email,
                    "password": credentials.password,
                })),
            )
            .await?;

        Ok(response.verified)
    }

    async fn migrate_edge_account_to_ua(&self, credentials: &Credentials) -> Result<(), ApiError> {
        self.request::<Value>(
            Method::POST,
            self.url(&self.default_version, "edge/migrate"),
            Some(json!({
                "email": credentials.email,
                "password": credentials.password,
            })),
        )
        .await
        .map(drop)
    }

    async fn register_trainer_with_ua_account(
        &self,
        credentials: &Credentials,
        accepted_terms: bool,
    ) -> Result<(), ApiError> {
        self.request::<Value>(
            Method::POST,
            self.url(&self.default_version, "trainers/ua"),
            Some(json!({
                "email": credentials.email,
                "password": credentials.password,
                "accepted_terms": accepted_terms,
            })),
        )
        .await
        .map(drop)
    }

    async fn check_terms(&self) -> Result<TermsStatus, ApiError> {
        self.request(
            Method::GET,
            self.url(&self.default_version, "users/me/terms"),
            None,
        )
        .await
    }

    async fn create_password_reset_request(&self, email: &str) -> Result<(), ApiError> {
        self.request::<Value>(
            Method::POST,
            self.url(&self.default_version, "auth/password-reset"),
            Some(json!({ "email": email })),
        )
        .await
        .map(drop)
    }

    async fn chat_token(&self) -> Result<Option<String>, ApiError> {
        let response: ChatTokenResponse = self
            .request(
                Method::GET,
                self.url(&self.default_version, "chat/token"),
                None,
            )
            .await?;

        Ok(response.token.filter(|token| !token.is_empty()))
    }

    async fn default_avatar_image_url(&self) -> Result<String, ApiError> {
        let response: AvatarResponse = self
            .request(
                Method::GET,
                self.url(&self.default_version, "users/default-avatar"),
                None,
            )
            .await?;

        Ok(response.url)
    }

    async fn register_for_push(&self, device: &DeviceRegistration) -> Result<(), ApiError> {
        let body =
            serde_json::to_value(device).map_err(|error| ApiError::Decode(error.to_string()))?;

        self.request::<Value>(
            Method::POST,
            self.url(&self.default_version, "devices"),
            Some(body),
        )
        .await
        .map(drop)
    }
}
