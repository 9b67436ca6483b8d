use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use crate::usecases::contracts::LoginPreferenceStore;

/// Remember-me choices keyed by email, stored as a small JSON object.
#[derive(Debug, Clone)]
pub struct FileLoginPreferences {
    path: PathBuf,
}

impl FileLoginPreferences {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<BTreeMap<String, bool>> {
        read_map(&self.path)
    }

    /// Most recently remembered email, if any. Used to prefill the login prompt.
    pub fn remembered_email(&self) -> Option<String> {
        match self.load() {
            Ok(map) => map
                .into_iter()
                .find_map(|(email, remember)| remember.then_some(email)),
            Err(error) => {
                tracing::warn!(
                    code = "PREFERENCES_READ_FAILED",
                    error = %error,
                    "ignoring unreadable login preferences"
                );
                None
            }
        }
    }
}

impl LoginPreferenceStore for FileLoginPreferences {
    fn update_login_preferences(&self, remember_me: bool, email: &str) -> Result<()> {
        let mut map = read_map(&self.path)?;
        map.insert(email.to_owned(), remember_me);

        let encoded = serde_json::to_vec_pretty(&map).context("encode login preferences")?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encoded)
            .with_context(|| format!("write login preferences to {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replace login preferences at {}", self.path.display()))?;

        tracing::debug!(remember_me, "login preferences saved");
        Ok(())
    }
}

fn read_map(path: &Path) -> Result<BTreeMap<String, bool>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let raw = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("decode {}", path.display()))
}
