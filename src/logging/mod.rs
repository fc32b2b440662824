//! Logging System
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` built from the
//! config (or `RUST_LOG`), plus a console layer and/or a rolling file layer.

mod config;

#[cfg(test)]
mod tests;

pub use config::{LogFormat, LogLevel, LogOutput, LoggingConfig, RotationStrategy};

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Name of the log file inside the log directory
pub const LOG_FILE_NAME: &str = "asset-caps.log";

/// Logging system errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationError(String),
}

/// Result type for logging operations
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Installed logging state. Dropping it flushes and stops the file writer.
pub struct LoggingSystem {
    _guard: Option<WorkerGuard>,
}

impl LoggingSystem {
    /// Install the global subscriber described by `config`
    pub fn init(config: LoggingConfig) -> LoggingResult<Self> {
        let console = config
            .output
            .to_console()
            .then(|| format_layer(&config, std::io::stdout, true));

        let (file, guard) = if config.output.to_file() {
            std::fs::create_dir_all(&config.log_directory).map_err(|e| {
                LoggingError::DirectoryCreationError(format!(
                    "{}: {}",
                    config.log_directory.display(),
                    e
                ))
            })?;
            let appender = RollingFileAppender::new(
                rotation(config.rotation),
                &config.log_directory,
                LOG_FILE_NAME,
            );
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(format_layer(&config, writer, false)), Some(guard))
        } else {
            (None, None)
        };

        tracing_subscriber::registry()
            .with(env_filter(&config))
            .with(console)
            .with(file)
            .try_init()
            .map_err(|e| LoggingError::InitializationError(e.to_string()))?;

        Ok(Self { _guard: guard })
    }
}

/// `RUST_LOG` wins over the configured levels when set
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.filter_directives()))
}

fn rotation(strategy: RotationStrategy) -> Rotation {
    match strategy {
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Never => Rotation::NEVER,
    }
}

fn format_layer<S, W>(
    config: &LoggingConfig,
    writer: W,
    ansi: bool,
) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer().with_writer(writer).with_ansi(ansi);
    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}
