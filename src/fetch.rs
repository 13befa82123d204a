//! Image fetch collaborator.
//!
//! The rendering core talks to the network only through the [`ImageFetcher`]
//! trait; the avatar processor treats every failure from it as recoverable.
//! Retries are the fetcher's concern, not the core's; the HTTP
//! implementation here performs a single bounded attempt.

use std::time::Duration;

use crate::error::{Error, Result};

/// Byte-source abstraction for avatar images.
pub trait ImageFetcher: Send + Sync {
    /// Fetch raw image bytes from `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP fetcher over a blocking reqwest client with a caller-supplied
/// timeout.
pub struct HttpImageFetcher {
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl HttpImageFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("persona-lens/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, timeout_secs })
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout_secs,
                }
            } else {
                Error::fetch_failed(url, e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|e| Error::fetch_failed(url, e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_invalid_url_is_degraded_error() {
        let fetcher = HttpImageFetcher::new(1).unwrap();
        let err = fetcher.fetch("not a url").unwrap_err();
        assert!(err.is_degraded());
    }

    #[test]
    fn test_fetch_unreachable_host() {
        let fetcher = HttpImageFetcher::new(1).unwrap();
        // reserved TLD, guaranteed not to resolve
        let err = fetcher.fetch("http://avatar.invalid/a.png").unwrap_err();
        assert!(err.is_degraded());
        assert!(!err.is_fatal());
    }
}
