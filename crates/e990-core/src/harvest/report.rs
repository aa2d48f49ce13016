//! Results of a harvest, per part, per year and per run.

use std::path::PathBuf;

use crate::part::ArchivePart;

/// How a retained part got to be current.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartOutcome {
    /// A fresh body was downloaded.
    Downloaded,
    /// The server answered 304 for the existing local copy.
    Unchanged,
}

impl PartOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            PartOutcome::Downloaded => "downloaded",
            PartOutcome::Unchanged => "unchanged",
        }
    }

    /// Inverse of [`as_str`](Self::as_str); `None` for anything else.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "downloaded" => Some(PartOutcome::Downloaded),
            "unchanged" => Some(PartOutcome::Unchanged),
            _ => None,
        }
    }
}

/// An archive kept on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedPart {
    pub part: ArchivePart,
    pub url: String,
    pub path: PathBuf,
    pub bytes: u64,
    /// Server `Last-Modified` as Unix seconds, when known.
    pub remote_modified: Option<i64>,
    pub outcome: PartOutcome,
}

/// Result of walking one year's part series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearReport {
    pub year: i32,
    /// Retained parts in ascending part order.
    pub retained: Vec<RetainedPart>,
    /// First part classified as end of series. `None` when the year failed.
    pub threshold: Option<u32>,
    /// Why the year could not be completed.
    pub failure: Option<String>,
}

impl YearReport {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            retained: Vec::new(),
            threshold: None,
            failure: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.threshold.is_some() && self.failure.is_none()
    }

    pub fn downloaded(&self) -> usize {
        self.retained
            .iter()
            .filter(|p| p.outcome == PartOutcome::Downloaded)
            .count()
    }

    pub fn total_bytes(&self) -> u64 {
        self.retained.iter().map(|p| p.bytes).sum()
    }
}

/// Result of a whole run, years in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub years: Vec<YearReport>,
    /// True when a failure stopped the run before the last year.
    pub aborted: bool,
}

impl RunReport {
    pub fn failed_years(&self) -> Vec<i32> {
        self.years
            .iter()
            .filter(|y| y.failure.is_some())
            .map(|y| y.year)
            .collect()
    }

    pub fn retained_count(&self) -> usize {
        self.years.iter().map(|y| y.retained.len()).sum()
    }
}

/// Progress sent while a harvest runs.
#[derive(Debug, Clone)]
pub enum HarvestEvent {
    /// A part was kept (downloaded or confirmed current).
    Part(RetainedPart),
    /// A year finished, successfully or not.
    Year(YearReport),
}
