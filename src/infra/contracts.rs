use anyhow::Result;

use crate::infra::config::AppConfig;

pub trait ConfigAdapter {
    fn load(&self) -> Result<AppConfig>;
}

/// Hands a URL to whatever the host uses to show web content.
pub trait ExternalOpener: Send + Sync {
    fn open(&self, target: &str) -> Result<()>;
}
