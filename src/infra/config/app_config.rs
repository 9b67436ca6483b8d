use serde::{Deserialize, Serialize};

use crate::usecases::contracts::Platform;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub api: ApiConfig,
    pub features: FeatureConfig,
    pub device: DeviceConfig,
    pub links: LinksConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    /// Also write logs to this file when set.
    pub file: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub version: String,
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.example.com".to_owned(),
            version: "v2.0".to_owned(),
            timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct FeatureConfig {
    pub chat_enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceConfig {
    pub platform: Platform,
    pub app_version: String,
    pub build_number: String,
    pub brand: String,
    pub model: String,
    pub os_version: String,
    pub bundle_id: String,
    pub device_uuid: String,
    pub is_emulator: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            platform: Platform::Android,
            app_version: env!("CARGO_PKG_VERSION").to_owned(),
            build_number: "0".to_owned(),
            brand: "generic".to_owned(),
            model: "cli".to_owned(),
            os_version: std::env::consts::OS.to_owned(),
            bundle_id: "com.example.ualogin".to_owned(),
            device_uuid: "unknown".to_owned(),
            is_emulator: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinksConfig {
    pub password_recovery_url: String,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            password_recovery_url: "https://accounts.example.com/password/recover".to_owned(),
        }
    }
}
