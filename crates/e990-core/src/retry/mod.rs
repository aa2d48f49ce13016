//! Retry and backoff policy.
//!
//! Classifies fetch failures (timeouts, throttling, connection failures) and
//! makes exponential backoff decisions, plus the policy for what a year does
//! once retries are exhausted.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, FailurePolicy, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
