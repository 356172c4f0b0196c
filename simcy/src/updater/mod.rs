//! Update-and-launch orchestration
//!
//! Sequences the locator and the store through the run state machine:
//!
//! ```text
//! CHECK_LATEST ─┬─ present ───────────────────────────────────────┐
//!               └─ missing ─ DOWNLOAD ─ EXTRACT ─ CLEANUP (warn) ─┴─ RUN
//! ```
//!
//! Discovery, download, extraction and launch failures end the run. Cleanup
//! failures are logged and reported but never stop the launch. Nothing is
//! retried; a transient failure simply fails the run.

mod types;

pub use types::{
    exit_code, InstallAction, Stage, UpdateError, UpdateReport, EXIT_FAILURE, EXIT_SUCCESS,
};

use tracing::{error, info, warn};

use crate::traits::{ReleaseSource, ReleaseStorage};

/// Drives one update-and-launch run.
pub struct Updater<'a, S: ?Sized, T: ?Sized> {
    source: &'a S,
    storage: &'a T,
}

impl<'a, S, T> Updater<'a, S, T>
where
    S: ReleaseSource + ?Sized,
    T: ReleaseStorage + ?Sized,
{
    /// Create an updater over a release source and a local store.
    pub fn new(source: &'a S, storage: &'a T) -> Self {
        Self { source, storage }
    }

    /// Make sure the newest release is installed, then launch it.
    pub fn run(&self) -> Result<UpdateReport, UpdateError> {
        let result = self.update_and_launch();
        if let Err(ref e) = result {
            error!(stage = %e.stage(), "{}", e);
        }
        result
    }

    fn update_and_launch(&self) -> Result<UpdateReport, UpdateError> {
        let root = self.storage.root();
        info!(path = %root.display(), "Storage directory");

        info!("Checking last release version");
        let release = self.source.last_release().map_err(UpdateError::Discovery)?;

        let mut cleanup_warning = None;
        let action = if self.storage.has_release(&release) {
            info!(release = %release, "Has last release");
            InstallAction::AlreadyPresent
        } else {
            info!(release = %release, "Downloading release");
            let archive = self
                .source
                .download_release(&release, root)
                .map_err(|source| UpdateError::Download {
                    release: release.clone(),
                    source,
                })?;

            info!(archive = %archive.display(), "Extracting");
            self.storage
                .extract_release(&archive)
                .map_err(|source| UpdateError::Extract {
                    release: release.clone(),
                    source,
                })?;

            if let Err(e) = self.storage.cleanup_releases(&release) {
                warn!(stage = %Stage::Cleanup, "Failed to cleanup, {}", e);
                cleanup_warning = Some(e.to_string());
            }

            InstallAction::Installed { archive }
        };

        info!(release = %release, "Running");
        self.storage
            .run(&release)
            .map_err(|source| UpdateError::Launch {
                release: release.clone(),
                source,
            })?;

        Ok(UpdateReport {
            release,
            action,
            cleanup_warning,
        })
    }
}
