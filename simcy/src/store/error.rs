//! Error types for the release store.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by an archive-decoding capability.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error while accessing the archive or its destination.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The archive tool could not be run.
    #[error("failed to run {tool}: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    /// The archive tool rejected the archive or failed while extracting it.
    #[error("{tool} failed: {reason}")]
    ToolFailed { tool: String, reason: String },
}

/// A stale release directory that could not be removed.
#[derive(Debug)]
pub struct CleanupFailure {
    /// Directory that was left behind.
    pub path: PathBuf,
    /// Why removal failed.
    pub source: io::Error,
}

impl fmt::Display for CleanupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.source)
    }
}

fn join_failures(failures: &[CleanupFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors that can occur while managing local releases.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to create the store root.
    #[error("failed to create storage directory {path}: {source}")]
    CreateRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to list the store root.
    #[error("failed to read storage directory {path}: {source}")]
    ReadRoot {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The archive capability rejected the file.
    #[error("failed to open archive {path}: {source}")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },

    /// Extracting the archive failed.
    #[error("failed to extract {path} into {target}: {source}")]
    Extract {
        path: PathBuf,
        target: PathBuf,
        #[source]
        source: ArchiveError,
    },

    /// The archive was extracted but could not be deleted afterwards.
    #[error("failed to remove archive {path}: {source}")]
    RemoveArchive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// One or more stale release directories could not be removed.
    #[error(
        "failed to remove {} stale release(s): {}",
        .failures.len(),
        join_failures(.failures)
    )]
    Cleanup { failures: Vec<CleanupFailure> },

    /// The release identifier does not map onto the executable layout.
    #[error("release {release} is too short to locate its executable")]
    InvalidLayout { release: String },

    /// Starting the executable failed.
    #[error("failed to start {path}: {source}")]
    Launch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
