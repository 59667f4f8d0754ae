//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays reserved for command output. With
//! `log.file = true` they are also appended to `<home>/logs/socialapp.log`.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{LogConfig, paths};

/// Environment variable overriding the configured level filter.
pub const LOG_ENV: &str = "SOCIALAPP_LOG";

const LOG_FILE_NAME: &str = "socialapp.log";

/// Builds the level filter: env > config.
///
/// # Errors
/// Returns an error if `SOCIALAPP_LOG` or the configured level is not a
/// valid directive.
pub fn build_filter(config: &LogConfig) -> Result<EnvFilter> {
    filter_from(std::env::var(LOG_ENV).ok().as_deref(), config)
}

fn filter_from(env: Option<&str>, config: &LogConfig) -> Result<EnvFilter> {
    if let Some(directive) = env.map(str::trim).filter(|d| !d.is_empty()) {
        return EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid {LOG_ENV} value: {directive}"));
    }
    EnvFilter::try_new(config.level.trim())
        .with_context(|| format!("Invalid log level: {}", config.level))
}

/// Installs the global subscriber.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes and stops the file writer.
///
/// # Errors
/// Returns an error if the filter is invalid, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let filter = build_filter(config)?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let (file_layer, guard) = if config.file {
        let dir = paths::logs_dir();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        let appender = tracing_appender::rolling::never(&dir, LOG_FILE_NAME);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_is_rejected() {
        let config = LogConfig {
            level: "socialapp=loud".to_string(),
            file: false,
        };
        assert!(filter_from(None, &config).is_err());
    }

    #[test]
    fn test_directive_level_is_accepted() {
        let config = LogConfig {
            level: "socialapp_core=debug,warn".to_string(),
            file: false,
        };
        assert!(filter_from(None, &config).is_ok());
    }

    #[test]
    fn test_invalid_env_directive_is_reported() {
        let err = filter_from(Some("socialapp=loud"), &LogConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains(LOG_ENV));
    }

    #[test]
    fn test_env_directive_overrides_invalid_config() {
        let config = LogConfig {
            level: "socialapp=loud".to_string(),
            file: false,
        };
        assert!(filter_from(Some("debug"), &config).is_ok());
        assert!(filter_from(Some("  "), &config).is_err());
    }
}
