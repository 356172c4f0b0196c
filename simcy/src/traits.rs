//! Capability and component interfaces.
//!
//! The launcher depends on three external capabilities (HTTP fetch, archive
//! decoding, process start) and composes two components (locator and store).
//! Each is a narrow trait so the update pipeline can be exercised with mock
//! implementations:
//!
//! ```text
//! Updater
//!   ├── ReleaseSource   (ReleaseLocator)  ── HttpFetcher
//!   └── ReleaseStorage  (ReleaseStore)    ── ArchiveOpener / Archive
//!                                         └─ ProcessStarter
//! ```

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::locator::{FetchError, LocatorResult};
use crate::release::ReleaseId;
use crate::store::{ArchiveError, StoreResult};

/// HTTP GET capability.
///
/// The returned stream is owned by the caller; dropping it closes the
/// underlying connection.
pub trait HttpFetcher {
    /// Start a GET request and return the response body as a byte stream.
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError>;
}

impl<T: HttpFetcher + ?Sized> HttpFetcher for &T {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        (**self).get(url)
    }
}

/// Archive-decoding capability: maps an archive path to an open archive.
pub trait ArchiveOpener {
    /// Open the archive at `path`, rejecting files that are not archives.
    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError>;
}

/// An opened archive.
pub trait Archive {
    /// Extract every entry of the archive beneath `target`.
    fn extract_all(&mut self, target: &Path) -> Result<(), ArchiveError>;

    /// Release the archive handle.
    fn close(self: Box<Self>) -> Result<(), ArchiveError>;
}

/// Process-start capability: launches a program without waiting for it.
pub trait ProcessStarter {
    /// Start `program` with `args` as a detached child process.
    fn start(&self, program: &Path, args: &[String]) -> io::Result<()>;
}

/// Where releases come from.
pub trait ReleaseSource {
    /// Identifier of the newest published release.
    fn last_release(&self) -> LocatorResult<ReleaseId>;

    /// Download the archive of `release` into `dest_dir` and return its path.
    fn download_release(&self, release: &ReleaseId, dest_dir: &Path) -> LocatorResult<PathBuf>;
}

/// Where releases live locally.
pub trait ReleaseStorage {
    /// Root directory of the store.
    fn root(&self) -> &Path;

    /// Whether `release` is already extracted under the root.
    fn has_release(&self, release: &ReleaseId) -> bool;

    /// Extract the archive at `archive` next to it and delete the archive.
    fn extract_release(&self, archive: &Path) -> StoreResult<()>;

    /// Remove every release directory except `keep`.
    fn cleanup_releases(&self, keep: &ReleaseId) -> StoreResult<()>;

    /// Launch the executable of `release`.
    fn run(&self, release: &ReleaseId) -> StoreResult<()>;
}
