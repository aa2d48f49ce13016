//! Part loop for a single year.

use anyhow::{Context, Result};
use std::path::Path;

use super::{emit, EventSender, HarvestEvent, HarvestPlan, PartOutcome, RetainedPart, YearReport};
use crate::classify::{Classification, ResponseClassifier};
use crate::fetch::{FetchError, FetchOutcome, FetchRequest, Fetcher};
use crate::part::ArchivePart;
use crate::retry::run_with_retry;
use crate::storage;

/// What one part turned out to be.
enum Step {
    Retained(RetainedPart),
    EndOfSeries,
}

/// Fetches parts 1, 2, 3, ... of `year` until the first end-of-series response.
///
/// Every part below the threshold is left on disk; the artifact at the
/// threshold is deleted. A part that keeps failing after retries ends the
/// year with `failure` set and no threshold. Storage errors abort with `Err`.
pub fn fetch_year<F, C>(
    plan: &HarvestPlan,
    fetcher: &F,
    classifier: &C,
    year: i32,
    events: Option<&EventSender>,
) -> Result<YearReport>
where
    F: Fetcher + ?Sized,
    C: ResponseClassifier + ?Sized,
{
    storage::ensure_dir(&plan.dest_dir)?;

    let mut report = YearReport::new(year);
    let mut part = ArchivePart::first(year);
    loop {
        if part.part > plan.max_parts_per_year {
            let msg = format!(
                "no end-of-series response within {} parts",
                plan.max_parts_per_year
            );
            tracing::warn!(year, "{}", msg);
            report.failure = Some(msg);
            break;
        }

        let url = plan.template.url(part);
        let final_path = plan.dest_dir.join(plan.template.file_name(part));
        let temp_path = storage::temp_path(&final_path);
        let req = FetchRequest {
            url: &url,
            temp_path: &temp_path,
            if_modified_since: storage::modified_unix(&final_path)?,
        };

        let outcome = run_with_retry(&plan.retry, || fetcher.fetch(&req));
        let step = match outcome {
            Ok(outcome) => settle(part, &url, &final_path, outcome, classifier)?,
            Err(e) if e.is_missing() => {
                tracing::debug!(year, part = part.part, "{} answered {}", url, e);
                storage::discard(&temp_path)?;
                storage::discard(&final_path)?;
                Step::EndOfSeries
            }
            Err(FetchError::Storage(e)) => {
                return Err(e).with_context(|| format!("writing {}", temp_path.display()));
            }
            Err(e) => {
                storage::discard(&temp_path)?;
                tracing::warn!(year, part = part.part, "giving up on {}: {}", url, e);
                report.failure = Some(format!("{}: {}", url, e));
                break;
            }
        };

        match step {
            Step::Retained(retained) => {
                tracing::info!(
                    year,
                    part = part.part,
                    bytes = retained.bytes,
                    outcome = retained.outcome.as_str(),
                    "retained {}",
                    retained.path.display()
                );
                emit(events, HarvestEvent::Part(retained.clone()));
                report.retained.push(retained);
            }
            Step::EndOfSeries => {
                tracing::info!(year, threshold = part.part, "series complete");
                report.threshold = Some(part.part);
                break;
            }
        }
        part = part.next();
    }
    Ok(report)
}

/// Classifies what the fetch left on disk and keeps or deletes it.
fn settle<C>(
    part: ArchivePart,
    url: &str,
    final_path: &Path,
    outcome: FetchOutcome,
    classifier: &C,
) -> Result<Step>
where
    C: ResponseClassifier + ?Sized,
{
    match outcome {
        FetchOutcome::Fetched { path, bytes, meta } => {
            let leading = storage::sniff(&path)?;
            match classifier.classify(&meta, &leading) {
                Classification::Archive => {
                    storage::finalize(&path, final_path)?;
                    Ok(Step::Retained(RetainedPart {
                        part,
                        url: url.to_string(),
                        path: final_path.to_path_buf(),
                        bytes,
                        remote_modified: meta.last_modified,
                        outcome: PartOutcome::Downloaded,
                    }))
                }
                Classification::EndOfSeries => {
                    storage::discard(&path)?;
                    if final_path.exists() {
                        tracing::warn!(
                            "{} now serves a page instead of an archive; removing {}",
                            url,
                            final_path.display()
                        );
                        storage::discard(final_path)?;
                    }
                    Ok(Step::EndOfSeries)
                }
            }
        }
        FetchOutcome::NotModified { meta } => {
            let leading = storage::sniff(final_path)?;
            match classifier.classify(&meta, &leading) {
                Classification::Archive => Ok(Step::Retained(RetainedPart {
                    part,
                    url: url.to_string(),
                    path: final_path.to_path_buf(),
                    bytes: storage::file_len(final_path)?,
                    remote_modified: meta.last_modified.or(storage::modified_unix(final_path)?),
                    outcome: PartOutcome::Unchanged,
                })),
                Classification::EndOfSeries => {
                    storage::discard(final_path)?;
                    Ok(Step::EndOfSeries)
                }
            }
        }
    }
}
