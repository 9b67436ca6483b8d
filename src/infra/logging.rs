use std::{fs::OpenOptions, path::PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::infra::{config::LogConfig, error::AppError};

/// Installs the global subscriber. When a log file is configured, output goes
/// there instead of stderr and the returned guard must outlive the program.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>, AppError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let Some(file) = config.file.as_deref() else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(AppError::LoggingInit)?;
        return Ok(None);
    };

    let path = PathBuf::from(file);
    let handle = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|source| AppError::LogFileOpen { path, source })?;
    let (writer, guard) = tracing_appender::non_blocking(handle);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(false)
        .with_writer(writer)
        .try_init()
        .map_err(AppError::LoggingInit)?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_log_file_is_reported_before_subscriber_install() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let config = LogConfig {
            level: "debug".to_owned(),
            file: Some(
                dir.path()
                    .join("missing")
                    .join("ualogin.log")
                    .to_string_lossy()
                    .into_owned(),
            ),
        };

        let error = init(&config).expect_err("missing parent dir must fail");

        assert!(matches!(error, AppError::LogFileOpen { .. }));
    }
}
