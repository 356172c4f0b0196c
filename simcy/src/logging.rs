//! Tracing subscriber setup.
//!
//! Log lines go to stderr in a compact human-readable form. An optional log
//! file receives the same events without ANSI colours through a non-blocking
//! writer; the returned [`LoggingGuard`] flushes it on drop.
//!
//! The filter honours `RUST_LOG`; otherwise it defaults to `info`, or `debug`
//! for this crate when verbose output is requested.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Errors that can occur while installing the subscriber.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The log file or its directory could not be created.
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Init(String),
}

/// Keeps the file writer alive; drop it last.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Default filter directive.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,simcy=debug,simcy_cli=debug"
    } else {
        "info"
    }
}

/// Install the global tracing subscriber.
pub fn init_logging(verbose: bool, log_file: Option<&Path>) -> Result<LoggingGuard, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    let stderr_layer = fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::Init(e.to_string()))?;

    Ok(LoggingGuard { _file: guard })
}

fn open_log_file(path: &Path) -> Result<fs::File, LoggingError> {
    let to_err = |source: std::io::Error| LoggingError::LogFile {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(to_err)?;
    }

    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(to_err)
}
