//! CLI error type.

use simcy::config::ConfigError;
use simcy::locator::{FetchError, LocatorError};
use simcy::store::StoreError;
use thiserror::Error;

/// Errors surfaced by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded, validated or saved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] FetchError),

    /// The store root could not be prepared.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// The newest release could not be determined.
    #[error("failed to get last release info: {0}")]
    Discovery(#[from] LocatorError),
}
