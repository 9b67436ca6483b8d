use serde::Deserialize;

use crate::{
    infra::config::{ApiConfig, AppConfig, DeviceConfig, FeatureConfig, LinksConfig, LogConfig},
    usecases::contracts::Platform,
};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub api: Option<FileApiConfig>,
    pub features: Option<FileFeatureConfig>,
    pub device: Option<FileDeviceConfig>,
    pub links: Option<FileLinksConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(api) = self.api {
            api.merge_into(&mut config.api);
        }

        if let Some(features) = self.features {
            features.merge_into(&mut config.features);
        }

        if let Some(device) = self.device {
            device.merge_into(&mut config.device);
        }

        if let Some(links) = self.links {
            links.merge_into(&mut config.links);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }

        if let Some(file) = self.file {
            config.file = Some(file);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileApiConfig {
    pub base_url: Option<String>,
    pub version: Option<String>,
    pub timeout_ms: Option<u64>,
}

impl FileApiConfig {
    fn merge_into(self, config: &mut ApiConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(version) = self.version {
            config.version = version;
        }

        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileFeatureConfig {
    pub chat_enabled: Option<bool>,
}

impl FileFeatureConfig {
    fn merge_into(self, config: &mut FeatureConfig) {
        if let Some(chat_enabled) = self.chat_enabled {
            config.chat_enabled = chat_enabled;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileDeviceConfig {
    pub platform: Option<Platform>,
    pub app_version: Option<String>,
    pub build_number: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub os_version: Option<String>,
    pub bundle_id: Option<String>,
    pub device_uuid: Option<String>,
    pub is_emulator: Option<bool>,
}

impl FileDeviceConfig {
    fn merge_into(self, config: &mut DeviceConfig) {
        if let Some(platform) = self.platform {
            config.platform = platform;
        }

        let strings = [
            (self.app_version, &mut config.app_version),
            (self.build_number, &mut config.build_number),
            (self.brand, &mut config.brand),
            (self.model, &mut config.model),
            (self.os_version, &mut config.os_version),
            (self.bundle_id, &mut config.bundle_id),
            (self.device_uuid, &mut config.device_uuid),
        ];
        for (value, slot) in strings {
            if let Some(value) = value {
                *slot = value;
            }
        }

        if let Some(is_emulator) = self.is_emulator {
            config.is_emulator = is_emulator;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLinksConfig {
    pub password_recovery_url: Option<String>,
}

impl FileLinksConfig {
    fn merge_into(self, config: &mut LinksConfig) {
        if let Some(url) = self.password_recovery_url {
            config.password_recovery_url = url;
        }
    }
}
