//! Error types for the release locator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for locator operations.
pub type LocatorResult<T> = Result<T, LocatorError>;

/// Network-layer failure reported by an [`HttpFetcher`](crate::traits::HttpFetcher).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The request could not be sent or the connection failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The HTTP client could not be constructed.
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

/// Errors that can occur while discovering or downloading releases.
#[derive(Debug, Error)]
pub enum LocatorError {
    /// Fetching a URL failed.
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchError,
    },

    /// Reading a response body failed mid-stream.
    #[error("failed to read response from {url}: {source}")]
    Read {
        url: String,
        #[source]
        source: io::Error,
    },

    /// The listing page contained no matching release.
    #[error("failed to find any release data on {url}")]
    NoReleaseFound { url: String },

    /// A download URL could not be built from the base URL.
    #[error("cannot build download URL from {url}")]
    InvalidUrl { url: String },

    /// Creating or writing the local archive file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_release_found_display() {
        let err = LocatorError::NoReleaseFound {
            url: "http://example.com/nightly/".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to find any release data on http://example.com/nightly/"
        );
    }

    #[test]
    fn test_fetch_error_chains_source() {
        use std::error::Error as _;

        let err = LocatorError::Fetch {
            url: "http://example.com/foo.7z".to_string(),
            source: FetchError::Status {
                url: "http://example.com/foo.7z".to_string(),
                status: 404,
            },
        };
        assert!(err.to_string().contains("HTTP 404"));
        assert!(err.source().is_some());
    }
}
