//! reqwest-backed HTTP fetch capability.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;

use super::error::FetchError;
use crate::traits::HttpFetcher;

/// Default timeout for HTTP requests in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300; // 5 minutes

/// Timeout for establishing a connection, in seconds.
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Blocking HTTP fetcher.
///
/// Responses with a non-success status are reported as errors so that an
/// error page is never mistaken for a listing or an archive.
///
/// The request timeout covers the whole exchange, including reading the
/// body, so it bounds the total download time of an archive. A zero timeout
/// removes that bound; connecting is always limited to
/// [`CONNECT_TIMEOUT_SECS`].
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout: Duration,
}

impl ReqwestFetcher {
    /// Create a fetcher with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a fetcher with a custom timeout. `Duration::ZERO` disables it.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let total = (!timeout.is_zero()).then_some(timeout);
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(total)
            .user_agent(concat!("simcy/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client, timeout })
    }

    /// The request timeout in use.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HttpFetcher for ReqwestFetcher {
    fn get(&self, url: &str) -> Result<Box<dyn Read + Send>, FetchError> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() && !self.timeout.is_zero() {
                FetchError::Request(format!("timed out after {}s", self.timeout.as_secs()))
            } else {
                FetchError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_default_timeout() {
        let fetcher = ReqwestFetcher::new().unwrap();
        assert_eq!(fetcher.timeout().as_secs(), DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_fetcher_with_timeout() {
        let fetcher = ReqwestFetcher::with_timeout(Duration::from_secs(60)).unwrap();
        assert_eq!(fetcher.timeout().as_secs(), 60);
    }

    #[test]
    fn test_fetcher_without_total_timeout() {
        let fetcher = ReqwestFetcher::with_timeout(Duration::ZERO).unwrap();
        assert!(fetcher.timeout().is_zero());
    }
}
