//! Release discovery and download.
//!
//! The locator resolves "what is the newest release" against the nightly
//! downloads listing page and fetches its archive:
//!
//! - `listing`: page parsing and newest-release selection
//! - `http`: the reqwest-backed [`HttpFetcher`]
//! - `error`: [`LocatorError`] and [`FetchError`]
//!
//! # Example
//!
//! ```ignore
//! use simcy::locator::{ReleaseLocator, ReqwestFetcher};
//!
//! let locator = ReleaseLocator::new(ReqwestFetcher::new()?, base_url);
//! let release = locator.last_release()?;
//! let archive = locator.download_release(&release, store_root)?;
//! ```

mod error;
mod http;
pub mod listing;

pub use error::{FetchError, LocatorError, LocatorResult};
pub use http::{ReqwestFetcher, CONNECT_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

use reqwest::Url;
use tracing::{debug, warn};

use crate::release::ReleaseId;
use crate::traits::{HttpFetcher, ReleaseSource};

/// Buffer size for reading/writing during downloads (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Finds and downloads releases published on a listing page.
#[derive(Debug)]
pub struct ReleaseLocator<F> {
    fetcher: F,
    base_url: Url,
}

impl<F: HttpFetcher> ReleaseLocator<F> {
    /// Create a locator for the listing page at `base_url`.
    pub fn new(fetcher: F, base_url: Url) -> Self {
        Self { fetcher, base_url }
    }

    /// The listing page URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// URL of the archive for `release`, relative to the listing page path.
    pub fn download_url(&self, release: &ReleaseId) -> LocatorResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments =
                url.path_segments_mut()
                    .map_err(|_| LocatorError::InvalidUrl {
                        url: self.base_url.to_string(),
                    })?;
            segments.pop_if_empty().push(&release.archive_filename());
        }
        Ok(url)
    }

    fn fetch_listing(&self) -> LocatorResult<String> {
        let url = self.base_url.as_str();
        let mut body = self.fetcher.get(url).map_err(|source| LocatorError::Fetch {
            url: url.to_string(),
            source,
        })?;

        let mut bytes = Vec::new();
        body.read_to_end(&mut bytes)
            .map_err(|source| LocatorError::Read {
                url: url.to_string(),
                source,
            })?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl<F: HttpFetcher> ReleaseSource for ReleaseLocator<F> {
    fn last_release(&self) -> LocatorResult<ReleaseId> {
        let html = self.fetch_listing()?;
        listing::find_last_release(&html).ok_or_else(|| LocatorError::NoReleaseFound {
            url: self.base_url.to_string(),
        })
    }

    fn download_release(&self, release: &ReleaseId, dest_dir: &Path) -> LocatorResult<PathBuf> {
        let url = self.download_url(release)?;
        let mut body = self
            .fetcher
            .get(url.as_str())
            .map_err(|source| LocatorError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let dest = dest_dir.join(release.archive_filename());
        let file = File::create(&dest).map_err(|source| LocatorError::Io {
            path: dest.clone(),
            source,
        })?;

        match stream_to_file(&mut body, file, url.as_str(), &dest) {
            Ok(bytes) => {
                debug!(release = %release, bytes, path = %dest.display(), "Release downloaded");
                Ok(dest)
            }
            Err(e) => {
                // Never leave a truncated archive behind.
                if let Err(remove_err) = fs::remove_file(&dest) {
                    warn!(
                        path = %dest.display(),
                        error = %remove_err,
                        "Failed to remove partial download"
                    );
                }
                Err(e)
            }
        }
    }
}

/// Copy the response body into `file`, returning the number of bytes written.
fn stream_to_file(body: &mut dyn Read, file: File, url: &str, dest: &Path) -> LocatorResult<u64> {
    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        let bytes_read = match body.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(source) => {
                return Err(LocatorError::Read {
                    url: url.to_string(),
                    source,
                })
            }
        };

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|source| LocatorError::Io {
                path: dest.to_path_buf(),
                source,
            })?;

        written += bytes_read as u64;
    }

    writer.flush().map_err(|source| LocatorError::Io {
        path: dest.to_path_buf(),
        source,
    })?;

    Ok(written)
}
