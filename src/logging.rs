//! Tracing subscriber setup.
//!
//! Log output goes to stderr so stdout stays the console surface. When
//! `[logging] directory` is configured, a daily rolling file receives the
//! same events without ANSI colors.

use crate::config::LoggingConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Directive used when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_FILTER: &str = "unisearch=info,unisearch_client=info";

const LOG_FILE_PREFIX: &str = "unisearch.log";

/// Resolve the filter: `RUST_LOG`, then the configured directive, then
/// [`DEFAULT_FILTER`]. An unparsable configured directive falls back to the
/// default.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    config
        .filter
        .as_deref()
        .and_then(|directive| EnvFilter::try_new(directive).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is enabled; keep it
/// alive until shutdown so buffered lines are flushed. Calling this more
/// than once is harmless: later calls leave the first subscriber in place.
pub fn init_tracing(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (file_layer, guard) = match config.directory.as_deref() {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("unisearch: cannot create log directory {}: {e}", dir.display());
                (None, None)
            }
        },
        None => (None, None),
    };

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(env_filter(config))
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_directive_used() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let config = LoggingConfig {
            filter: Some("unisearch=trace".into()),
            directory: None,
        };
        assert_eq!(env_filter(&config).to_string(), "unisearch=trace");
    }

    #[test]
    fn falls_back_to_default() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = env_filter(&LoggingConfig::default()).to_string();
        assert!(filter.contains("unisearch=info"));
        assert!(filter.contains("unisearch_client=info"));
    }

    #[test]
    fn file_logging_creates_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let log_dir = dir.path().join("logs");
        let config = LoggingConfig {
            filter: None,
            directory: Some(log_dir.clone()),
        };
        let guard = init_tracing(&config);
        assert!(guard.is_some());
        assert!(log_dir.is_dir());
    }
}
