//! # Logging
//!
//! Tracing subscriber setup. Diagnostics go to stderr so stdout carries only
//! the echoed beacon record; a daily diagnostics file is added when
//! `logging.directory` is set.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::Result;

/// File name prefix of the diagnostics log
const LOG_FILE_PREFIX: &str = "beacon-logger.log";

/// Build the filter: `RUST_LOG` when set, otherwise the configured level
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Open the daily diagnostics file, or `None` when no directory is configured
///
/// # Errors
///
/// Returns `DiagnosticsLog` if the directory cannot be created or the file
/// cannot be opened.
pub fn file_appender(config: &LoggingConfig) -> Result<Option<RollingFileAppender>> {
    if config.directory.is_empty() {
        return Ok(None);
    }

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(&config.directory)?;
    Ok(Some(appender))
}

/// Install the global subscriber
///
/// The returned guard flushes the diagnostics file on drop and must be held
/// until the program exits.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match file_appender(config)? {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_filter_from_configured_level() {
        std::env::remove_var("RUST_LOG");
        let config = LoggingConfig {
            level: "debug".to_string(),
            directory: String::new(),
        };
        assert_eq!(env_filter(&config).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    fn logging_in(directory: &std::path::Path) -> LoggingConfig {
        LoggingConfig {
            level: "info".to_string(),
            directory: directory.display().to_string(),
        }
    }

    #[test]
    fn test_no_directory_no_file() {
        let config = LoggingConfig::default();
        assert!(file_appender(&config).unwrap().is_none());
    }

    #[test]
    fn test_file_appender_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let appender = file_appender(&logging_in(&dir.path().join("logs"))).unwrap();
        assert!(appender.is_some());
        assert!(dir.path().join("logs").is_dir());
    }

    #[test]
    fn test_directory_under_regular_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let result = file_appender(&logging_in(&file.path().join("sub")));
        assert!(matches!(
            result,
            Err(crate::error::BeaconError::DiagnosticsLog(_))
        ));
    }
}
