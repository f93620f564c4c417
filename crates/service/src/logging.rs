use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::{self, format::FmtSpan};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::{Config, ConfigError};

pub const LOG_FILE_PREFIX: &str = "podgate.log";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot create log directory {path:?}: {source}")]
    LogDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to install subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber: a compact stdout layer, plus a daily
///  rolling file when `log_dir` is set.
///
/// `RUST_LOG` overrides the configured level for both outputs. Returns guards
///  that must be kept alive for the duration of the program.
pub fn init_logging(config: &Config) -> Result<Vec<WorkerGuard>, LoggingError> {
    let level = config.level()?;
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());
    let mut guards = vec![stdout_guard];
    let stdout_layer = fmt::layer().compact().with_writer(stdout_writer);

    let file_layer = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::LogDir {
                path: log_dir.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
            guards.push(file_guard);

            // span timings only go to the file
            Some(
                fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_span_events(FmtSpan::CLOSE),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()?;

    tracing::info!(base_url = %config.base_url, level = %level, "logging initialized");

    Ok(guards)
}
