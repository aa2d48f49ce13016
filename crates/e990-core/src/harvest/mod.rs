//! The archive fetcher: walk every year's numbered parts until the server
//! answers with its end-of-series HTML page.
//!
//! Strictly sequential. `fetch_year` owns the part loop for one year;
//! `fetch_all` drives the year range and applies the failure policy. Both
//! are blocking (curl), so async callers run them under `spawn_blocking` and
//! receive progress over an mpsc channel.

mod report;
mod run;
mod year;

pub use report::{HarvestEvent, PartOutcome, RetainedPart, RunReport, YearReport};
pub use run::fetch_all;
pub use year::fetch_year;

use anyhow::Result;
use std::path::PathBuf;

use crate::config::E990Config;
use crate::part::UrlTemplate;
use crate::retry::{FailurePolicy, RetryPolicy};
use crate::years::YearRange;

/// Sender side of the progress channel.
pub type EventSender = tokio::sync::mpsc::Sender<HarvestEvent>;

/// Everything a harvest run needs besides the fetcher and classifier:
/// the year range (clock), the URL template and the destination directory.
#[derive(Debug, Clone)]
pub struct HarvestPlan {
    pub years: YearRange,
    pub template: UrlTemplate,
    pub dest_dir: PathBuf,
    pub retry: RetryPolicy,
    pub on_failure: FailurePolicy,
    pub max_parts_per_year: u32,
}

impl HarvestPlan {
    /// Builds a plan from config, ending the year range at `through_year`.
    pub fn from_config(cfg: &E990Config, through_year: i32) -> Result<Self> {
        Ok(Self {
            years: YearRange::new(cfg.start_year, through_year),
            template: UrlTemplate::parse(&cfg.url_template)?,
            dest_dir: cfg.dest_dir.clone(),
            retry: cfg
                .retry
                .as_ref()
                .map(RetryPolicy::try_from)
                .transpose()?
                .unwrap_or_default(),
            on_failure: cfg.on_failure,
            max_parts_per_year: cfg.max_parts_per_year.max(1),
        })
    }
}

fn emit(events: Option<&EventSender>, event: HarvestEvent) {
    if let Some(tx) = events {
        // Receiver gone only means nobody is listening any more.
        let _ = tx.blocking_send(event);
    }
}
