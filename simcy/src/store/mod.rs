//! Local release store.
//!
//! The store root holds one subdirectory per extracted release, named after its
//! [`ReleaseId`]. Downloaded archives land in the root next to them and are
//! removed once extracted:
//!
//! ```text
//! <root>/
//!   simc-905-01-win64-937b901.7z          (transient, until extracted)
//!   simc-905-01-win64-937b901/
//!     simc-905-01-win64/
//!       SimulationCraft.exe
//! ```
//!
//! After cleanup at most one release directory remains. Files in the root are
//! never touched by cleanup.
//!
//! The store assumes it is the only process working on its root; concurrent
//! launchers sharing a root may race on extraction, cleanup and launch.

mod error;
mod extractor;
mod launcher;

pub use error::{ArchiveError, CleanupFailure, StoreError, StoreResult};
pub use extractor::{SevenZipArchive, SevenZipExtractor, DEFAULT_SEVEN_ZIP};
pub use launcher::CommandStarter;

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::release::ReleaseId;
use crate::traits::{ArchiveOpener, ProcessStarter, ReleaseStorage};

/// Create the store root (and parents) if missing.
///
/// On Unix the directory is created private to the current user.
pub fn prepare_root(path: &Path) -> StoreResult<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path).map_err(|source| StoreError::CreateRoot {
        path: path.to_path_buf(),
        source,
    })
}

fn discard_partial(target: &Path) {
    match fs::remove_dir_all(target) {
        Ok(()) => debug!(target = %target.display(), "Removed partial extraction"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!(
            target = %target.display(),
            error = %e,
            "Failed to remove partial extraction"
        ),
    }
}

/// On-disk store of extracted releases.
#[derive(Debug)]
pub struct ReleaseStore<O, P> {
    root: PathBuf,
    opener: O,
    starter: P,
    launch_args: Vec<String>,
}

impl<O: ArchiveOpener, P: ProcessStarter> ReleaseStore<O, P> {
    /// Create a store rooted at `root`.
    ///
    /// # Arguments
    ///
    /// * `root` - Directory holding the release subdirectories
    /// * `opener` - Archive capability used for extraction
    /// * `starter` - Process capability used to launch releases
    pub fn new(root: impl Into<PathBuf>, opener: O, starter: P) -> Self {
        Self {
            root: root.into(),
            opener,
            starter,
            launch_args: Vec::new(),
        }
    }

    /// Arguments passed to the executable on launch.
    pub fn with_launch_args(mut self, args: Vec<String>) -> Self {
        self.launch_args = args;
        self
    }

    /// Path of the executable that [`ReleaseStorage::run`] starts for `release`.
    pub fn executable_path(&self, release: &ReleaseId) -> StoreResult<PathBuf> {
        release
            .executable_path(&self.root)
            .ok_or_else(|| StoreError::InvalidLayout {
                release: release.to_string(),
            })
    }
}

impl<O: ArchiveOpener, P: ProcessStarter> ReleaseStorage for ReleaseStore<O, P> {
    fn root(&self) -> &Path {
        &self.root
    }

    fn has_release(&self, release: &ReleaseId) -> bool {
        // A root that cannot be read (e.g. first run) has no releases.
        let Ok(entries) = fs::read_dir(&self.root) else {
            return false;
        };
        let name = OsStr::new(release.as_str());
        entries.flatten().any(|entry| {
            entry.file_name().as_os_str() == name
                && entry.file_type().map(|t| t.is_dir()).unwrap_or(false)
        })
    }

    fn extract_release(&self, archive_path: &Path) -> StoreResult<()> {
        let target = archive_path.with_extension("");
        let target_existed = target.exists();

        let mut archive = self
            .opener
            .open(archive_path)
            .map_err(|source| StoreError::ArchiveOpen {
                path: archive_path.to_path_buf(),
                source,
            })?;

        debug!(
            archive = %archive_path.display(),
            target = %target.display(),
            "Extracting archive"
        );

        if let Err(source) = archive.extract_all(&target) {
            // The archive is kept on disk for diagnosis, but the handle is released.
            if let Err(e) = archive.close() {
                warn!(archive = %archive_path.display(), error = %e, "Failed to close archive");
            }
            // A partial tree would pass for an installed release on the next run.
            if !target_existed {
                discard_partial(&target);
            }
            return Err(StoreError::Extract {
                path: archive_path.to_path_buf(),
                target,
                source,
            });
        }

        if let Err(e) = archive.close() {
            warn!(archive = %archive_path.display(), error = %e, "Failed to close archive");
        }

        fs::remove_file(archive_path).map_err(|source| StoreError::RemoveArchive {
            path: archive_path.to_path_buf(),
            source,
        })
    }

    fn cleanup_releases(&self, keep: &ReleaseId) -> StoreResult<()> {
        self.remove_releases_except(keep, |path| fs::remove_dir_all(path))
    }

    fn run(&self, release: &ReleaseId) -> StoreResult<()> {
        let path = self.executable_path(release)?;
        debug!(path = %path.display(), args = ?self.launch_args, "Starting release");

        self.starter
            .start(&path, &self.launch_args)
            .map_err(|source| StoreError::Launch { path, source })
    }
}

impl<O, P> ReleaseStore<O, P> {
    fn remove_releases_except<R>(&self, keep: &ReleaseId, remove: R) -> StoreResult<()>
    where
        R: Fn(&Path) -> std::io::Result<()>,
    {
        let entries = fs::read_dir(&self.root).map_err(|source| StoreError::ReadRoot {
            path: self.root.clone(),
            source,
        })?;

        let keep_name = OsStr::new(keep.as_str());
        let mut failures = Vec::new();

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(source) => {
                    failures.push(CleanupFailure {
                        path: self.root.clone(),
                        source,
                    });
                    continue;
                }
            };

            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            if !is_dir || entry.file_name().as_os_str() == keep_name {
                continue;
            }

            let path = entry.path();
            match remove(&path) {
                Ok(()) => info!(path = %path.display(), "Removed stale release"),
                Err(source) => {
                    warn!(
                        path = %path.display(),
                        error = %source,
                        "Failed to remove stale release"
                    );
                    failures.push(CleanupFailure { path, source });
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Cleanup { failures })
        }
    }
}
