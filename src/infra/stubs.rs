#![cfg(test)]

use std::sync::Mutex;

use anyhow::Result;

use crate::infra::{
    config::AppConfig,
    contracts::{ConfigAdapter, ExternalOpener},
};

#[derive(Debug, Clone, Default)]
pub struct StubConfigAdapter;

impl ConfigAdapter for StubConfigAdapter {
    fn load(&self) -> Result<AppConfig> {
        Ok(AppConfig::default())
    }
}

/// Records targets instead of launching anything.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("opener lock").clone()
    }
}

impl ExternalOpener for RecordingOpener {
    fn open(&self, target: &str) -> Result<()> {
        if let Ok(mut opened) = self.opened.lock() {
            opened.push(target.to_owned());
        }
        Ok(())
    }
}
