use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::error::ConfigError;
use crate::settings::LoggingSettings;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `settings.level`. With a `directory` configured, events are
/// written to a daily-rolling file through a non-blocking writer; the returned guard
/// must be held until shutdown so buffered lines are flushed. Otherwise events go to
/// stderr, keeping stdout free for tables and exports.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            tracing::debug!(
                directory = %directory,
                prefix = %settings.file_prefix,
                "Logging to rolling file."
            );
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| ConfigError::Logging(e.to_string()))?;
            tracing::debug!("Logging to stderr.");
            Ok(None)
        }
    }
}
