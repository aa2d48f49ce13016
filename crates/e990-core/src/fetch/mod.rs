//! Conditional HTTP fetch of one archive part.
//!
//! The transport is behind the [`Fetcher`] trait so the harvest loop can run
//! against a fake remote in tests. [`CurlFetcher`] is the libcurl implementation.

mod curl_fetcher;
mod http_date;

pub use curl_fetcher::CurlFetcher;
pub use http_date::format_http_date;

use std::path::{Path, PathBuf};

use crate::classify::ResponseMeta;

/// One conditional GET.
#[derive(Debug, Clone)]
pub struct FetchRequest<'a> {
    pub url: &'a str,
    /// Where a fresh body is written (the `.part` file next to the final path).
    pub temp_path: &'a Path,
    /// Local copy's modification time; sent as `If-Modified-Since` when present.
    pub if_modified_since: Option<i64>,
}

/// Successful outcome of a conditional fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Body written to `path` (the request's temp path).
    Fetched {
        path: PathBuf,
        bytes: u64,
        meta: ResponseMeta,
    },
    /// Server answered 304; the local copy is current and nothing was written.
    NotModified { meta: ResponseMeta },
}

/// Failed fetch, kept typed so it can be classified for retry.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, DNS, etc.).
    #[error("{0}")]
    Transport(#[from] curl::Error),
    /// Final HTTP status was neither 2xx nor 304.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the body failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
}

impl FetchError {
    /// 404/410: the part does not exist, which ends the year's series.
    pub fn is_missing(&self) -> bool {
        matches!(self, FetchError::Http(404) | FetchError::Http(410))
    }
}

/// Performs one conditional GET.
pub trait Fetcher {
    fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchOutcome, FetchError>;
}

impl<T: Fetcher + ?Sized> Fetcher for &T {
    fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchOutcome, FetchError> {
        (**self).fetch(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_statuses() {
        assert!(FetchError::Http(404).is_missing());
        assert!(FetchError::Http(410).is_missing());
        assert!(!FetchError::Http(503).is_missing());
        assert!(!FetchError::Http(403).is_missing());
    }

    #[test]
    fn error_display() {
        assert_eq!(FetchError::Http(503).to_string(), "HTTP 503");
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(FetchError::Storage(io).to_string(), "storage: disk full");
    }
}
