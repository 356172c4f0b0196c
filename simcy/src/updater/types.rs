//! Updater types and errors

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::locator::LocatorError;
use crate::release::ReleaseId;
use crate::store::StoreError;

/// Exit status for a run that launched the release.
pub const EXIT_SUCCESS: u8 = 0;

/// Exit status for a run that failed at a fatal stage.
pub const EXIT_FAILURE: u8 = 1;

/// Stages of an update-and-launch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Resolving the newest published release.
    CheckLatest,
    /// Downloading the release archive.
    Download,
    /// Extracting the archive into the store.
    Extract,
    /// Removing stale releases (never fatal).
    Cleanup,
    /// Starting the release executable.
    Run,
}

impl Stage {
    /// Get a short label for the stage.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CheckLatest => "check-latest",
            Self::Download => "download",
            Self::Extract => "extract",
            Self::Cleanup => "cleanup",
            Self::Run => "run",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fatal errors of an update-and-launch run.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// The newest release could not be determined.
    #[error("failed to get last release info: {0}")]
    Discovery(#[source] LocatorError),

    /// The release archive could not be downloaded.
    #[error("failed to download {release}: {source}")]
    Download {
        release: ReleaseId,
        #[source]
        source: LocatorError,
    },

    /// The release archive could not be extracted.
    #[error("failed to extract {release}: {source}")]
    Extract {
        release: ReleaseId,
        #[source]
        source: StoreError,
    },

    /// The release executable could not be started.
    #[error("failed to run {release}: {source}")]
    Launch {
        release: ReleaseId,
        #[source]
        source: StoreError,
    },
}

impl UpdateError {
    /// The stage at which the run stopped.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Discovery(_) => Stage::CheckLatest,
            Self::Download { .. } => Stage::Download,
            Self::Extract { .. } => Stage::Extract,
            Self::Launch { .. } => Stage::Run,
        }
    }

    /// Process exit status for this failure.
    pub fn exit_code(&self) -> u8 {
        EXIT_FAILURE
    }
}

/// How the release came to be present locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallAction {
    /// The release was already extracted; nothing was downloaded.
    AlreadyPresent,
    /// The release was downloaded and extracted in this run.
    Installed {
        /// Where the archive was downloaded to before extraction.
        archive: PathBuf,
    },
}

/// Result of a successful update-and-launch run.
#[derive(Debug, Clone)]
pub struct UpdateReport {
    /// The release that was launched.
    pub release: ReleaseId,
    /// Whether it had to be installed first.
    pub action: InstallAction,
    /// Cleanup failure message, if stale releases could not all be removed.
    pub cleanup_warning: Option<String>,
}

impl UpdateReport {
    /// Process exit status for this run. Cleanup warnings do not affect it.
    pub fn exit_code(&self) -> u8 {
        EXIT_SUCCESS
    }
}

/// Map the outcome of a run to a process exit status.
pub fn exit_code(outcome: &Result<UpdateReport, UpdateError>) -> u8 {
    match outcome {
        Ok(report) => report.exit_code(),
        Err(e) => e.exit_code(),
    }
}
