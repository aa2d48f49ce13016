use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of an error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Any other error (not retried).
    Other,
}

impl ErrorKind {
    pub fn is_transient(self) -> bool {
        !matches!(self, ErrorKind::Other)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with caps.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = anyhow::Error;

    /// Rejects a base delay that is negative, NaN or too large for a `Duration`.
    fn try_from(r: &RetryConfig) -> Result<Self> {
        let base_delay = Duration::try_from_secs_f64(r.base_delay_secs).map_err(|e| {
            anyhow!("invalid retry.base_delay_secs {}: {}", r.base_delay_secs, e)
        })?;
        Ok(Self {
            max_attempts: r.max_attempts.max(1),
            base_delay,
            max_delay: Duration::from_secs(r.max_delay_secs),
        })
    }
}

impl RetryPolicy {
    /// Single attempt, no backoff.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts || !kind.is_transient() {
            return RetryDecision::NoRetry;
        }
        // base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        let delay = self.base_delay.saturating_mul(exp).min(self.max_delay);
        RetryDecision::RetryAfter(delay)
    }
}

/// What the harvest does with a year whose fetch keeps failing after retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Stop the whole run.
    #[default]
    AbortRun,
    /// Record the failure and continue with the next year.
    SkipYear,
}
