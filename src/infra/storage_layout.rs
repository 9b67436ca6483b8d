use std::{env, fs, path::PathBuf};

use crate::infra::error::AppError;

const APP_DIR_NAME: &str = "ualogin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub data_dir: PathBuf,
    pub session_dir: PathBuf,
}

impl StorageLayout {
    /// `$XDG_DATA_HOME` wins over the platform data directory so tests and
    /// sandboxes can redirect storage.
    pub fn resolve() -> Result<Self, AppError> {
        let data_base = env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(dirs::data_dir)
            .ok_or_else(|| AppError::StoragePathResolution {
                details: "unable to resolve data base directory (XDG_DATA_HOME/platform)".into(),
            })?;

        let data_dir = data_base.join(APP_DIR_NAME);
        let session_dir = data_dir.join("session");

        Ok(Self {
            data_dir,
            session_dir,
        })
    }

    pub fn ensure_dirs(&self) -> Result<(), AppError> {
        for dir in [&self.data_dir, &self.session_dir] {
            fs::create_dir_all(dir).map_err(|source| AppError::StorageDirCreate {
                path: dir.clone(),
                source,
            })?;
        }

        Ok(())
    }

    /// Bearer token of the last successful login, used by relogin.
    pub fn session_token_file(&self) -> PathBuf {
        self.session_dir.join("token")
    }

    pub fn login_preferences_file(&self) -> PathBuf {
        self.data_dir.join("login_preferences.json")
    }
}
