//! Row types returned by the catalog.

use crate::harvest::PartOutcome;

/// Per-year view used by the CLI `status` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSummary {
    pub year: i32,
    /// Retained parts recorded for the year.
    pub parts: i64,
    pub bytes: i64,
    /// First end-of-series part seen on the last complete pass.
    pub threshold: Option<i64>,
    /// Failure message from the last pass, if it did not complete.
    pub last_error: Option<String>,
    pub checked_at: i64,
}

/// One retained part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartRecord {
    pub year: i32,
    pub part: i64,
    pub file_name: String,
    pub url: String,
    pub bytes: i64,
    pub remote_modified: Option<i64>,
    pub outcome: PartOutcome,
    pub checked_at: i64,
}
