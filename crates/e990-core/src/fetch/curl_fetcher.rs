//! libcurl-backed conditional GET.
//!
//! Writes the body to the request's temp path, sends `If-Modified-Since` when a
//! local copy exists, and stamps the temp file with the server's
//! `Last-Modified` so the next run can ask the same question.

use std::fs::File;
use std::io::Write;
use std::time::Duration;

use super::{FetchError, FetchOutcome, FetchRequest, Fetcher};
use crate::classify::ResponseMeta;
use crate::storage;

/// Blocking fetcher using one curl easy handle per request.
/// Runs in the current thread; call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct CurlFetcher {
    pub user_agent: String,
    pub connect_timeout: Duration,
    /// Hard wall-clock limit for one transfer.
    pub timeout: Duration,
    /// Abort when throughput stays below `low_speed_limit` bytes/s for `low_speed_time`.
    pub low_speed_limit: u32,
    pub low_speed_time: Duration,
}

impl Default for CurlFetcher {
    fn default() -> Self {
        Self {
            user_agent: format!("e990/{}", env!("CARGO_PKG_VERSION")),
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(3600),
            low_speed_limit: 1024,
            low_speed_time: Duration::from_secs(60),
        }
    }
}

impl Fetcher for CurlFetcher {
    fn fetch(&self, req: &FetchRequest<'_>) -> Result<FetchOutcome, FetchError> {
        let result = self.perform(req);
        match &result {
            Ok(FetchOutcome::Fetched { .. }) => {}
            _ => {
                if let Err(e) = storage::discard(req.temp_path) {
                    tracing::warn!("could not remove {}: {:#}", req.temp_path.display(), e);
                }
            }
        }
        result
    }
}

impl CurlFetcher {
    fn perform(&self, req: &FetchRequest<'_>) -> Result<FetchOutcome, FetchError> {
        let mut file = File::create(req.temp_path)?;
        let mut bytes: u64 = 0;
        let mut write_error: Option<std::io::Error> = None;

        let mut easy = curl::easy::Easy::new();
        easy.url(req.url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.useragent(&self.user_agent)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.low_speed_limit(self.low_speed_limit)?;
        easy.low_speed_time(self.low_speed_time)?;
        easy.timeout(self.timeout)?;
        easy.fetch_filetime(true)?;

        if let Some(date) = req.if_modified_since.and_then(super::format_http_date) {
            let mut list = curl::easy::List::new();
            list.append(&format!("If-Modified-Since: {}", date))?;
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| match file.write_all(data) {
                Ok(()) => {
                    bytes += data.len() as u64;
                    Ok(data.len())
                }
                Err(e) => {
                    write_error = Some(e);
                    Ok(0) // abort transfer
                }
            })?;
            if let Err(e) = transfer.perform() {
                drop(transfer);
                if e.is_write_error() {
                    if let Some(io_err) = write_error.take() {
                        return Err(FetchError::Storage(io_err));
                    }
                }
                return Err(FetchError::Transport(e));
            }
        }

        let status = easy.response_code()?;
        let meta = ResponseMeta {
            status,
            content_type: easy.content_type()?.map(str::to_string),
            last_modified: easy.filetime()?,
        };

        if status == 304 {
            tracing::debug!(url = req.url, "not modified");
            return Ok(FetchOutcome::NotModified { meta });
        }
        if !(200..300).contains(&status) {
            return Err(FetchError::Http(status));
        }

        file.flush()?;
        drop(file);
        if let Some(secs) = meta.last_modified {
            storage::set_modified_unix(req.temp_path, secs)?;
        }

        tracing::debug!(url = req.url, bytes, status, "fetched");
        Ok(FetchOutcome::Fetched {
            path: req.temp_path.to_path_buf(),
            bytes,
            meta,
        })
    }
}
