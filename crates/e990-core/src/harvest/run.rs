//! Year-range driver.

use anyhow::Result;

use super::{emit, fetch_year, EventSender, HarvestEvent, HarvestPlan, RunReport};
use crate::classify::ResponseClassifier;
use crate::fetch::Fetcher;
use crate::retry::FailurePolicy;

/// Runs `fetch_year` for every year of the plan, ascending, one at a time.
///
/// A failed year is recorded in the report. Under `FailurePolicy::AbortRun`
/// the run stops there; under `SkipYear` it moves on to the next year.
pub fn fetch_all<F, C>(
    plan: &HarvestPlan,
    fetcher: &F,
    classifier: &C,
    events: Option<&EventSender>,
) -> Result<RunReport>
where
    F: Fetcher + ?Sized,
    C: ResponseClassifier + ?Sized,
{
    let mut run = RunReport::default();
    if plan.years.is_empty() {
        tracing::warn!(
            start = plan.years.start,
            end = plan.years.end,
            "empty year range; nothing to fetch"
        );
        return Ok(run);
    }

    tracing::info!(
        start = plan.years.start,
        end = plan.years.end,
        dest = %plan.dest_dir.display(),
        "harvest starting"
    );
    for year in plan.years {
        let report = fetch_year(plan, fetcher, classifier, year, events)?;
        emit(events, HarvestEvent::Year(report.clone()));
        let failed = report.failure.is_some();
        run.years.push(report);
        if failed && plan.on_failure == FailurePolicy::AbortRun {
            tracing::warn!(year, "aborting run after failed year");
            run.aborted = year < plan.years.end;
            break;
        }
    }
    tracing::info!(
        years = run.years.len(),
        retained = run.retained_count(),
        failed = run.failed_years().len(),
        "harvest finished"
    );
    Ok(run)
}
