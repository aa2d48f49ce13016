//! `e990 fetch` – download every available part for each year.

use anyhow::{Context, Result};
use e990_core::catalog::Catalog;
use e990_core::classify::MarkerClassifier;
use e990_core::config::E990Config;
use e990_core::fetch::CurlFetcher;
use e990_core::harvest::{self, HarvestEvent, HarvestPlan, PartOutcome, YearReport};
use e990_core::years;

use crate::cli::RangeArgs;

pub async fn run_fetch(cfg: E990Config, range: &RangeArgs) -> Result<()> {
    let through = range.through_year.unwrap_or_else(years::current_year);
    let plan = HarvestPlan::from_config(&cfg, through)?;
    tracing::info!(
        template = %plan.template,
        dest = %plan.dest_dir.display(),
        "fetching {}..={}",
        plan.years.start,
        plan.years.end
    );

    let catalog = match Catalog::open_default().await {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::warn!("catalog unavailable, continuing without it: {:#}", e);
            None
        }
    };

    let classifier = MarkerClassifier::new(&cfg.end_marker);
    let (tx, mut rx) = tokio::sync::mpsc::channel::<HarvestEvent>(32);
    let worker = tokio::task::spawn_blocking(move || {
        harvest::fetch_all(&plan, &CurlFetcher::default(), &classifier, Some(&tx))
    });

    while let Some(event) = rx.recv().await {
        match event {
            HarvestEvent::Part(part) => {
                match part.outcome {
                    PartOutcome::Downloaded => println!("Updating/Downloading {}", part.url),
                    PartOutcome::Unchanged => println!("Up to date {}", part.url),
                }
                if let Some(db) = &catalog {
                    if db.record_part(&part).await.is_err() {
                        tracing::warn!(url = %part.url, "catalog update failed");
                    }
                }
            }
            HarvestEvent::Year(report) => {
                print_year(&report);
                if let Some(db) = &catalog {
                    if db.record_year(&report).await.is_err() {
                        tracing::warn!(year = report.year, "catalog update failed");
                    }
                }
            }
        }
    }

    let run = worker.await.context("fetch worker panicked")??;
    let failed = run.failed_years();
    if !failed.is_empty() {
        let years: Vec<String> = failed.iter().map(|y| y.to_string()).collect();
        anyhow::bail!(
            "{} year(s) incomplete: {}{}",
            failed.len(),
            years.join(", "),
            if run.aborted { " (run aborted)" } else { "" }
        );
    }
    if run.years.is_empty() {
        println!("No years to fetch.");
    }
    Ok(())
}

fn print_year(report: &YearReport) {
    let mib = report.total_bytes() as f64 / 1_048_576.0;
    match (&report.failure, report.threshold) {
        (Some(err), _) => println!(
            "{}: failed after {} part(s): {}",
            report.year,
            report.retained.len(),
            err
        ),
        (None, Some(_)) => println!(
            "{}: {} part(s), {} new, {:.1} MiB",
            report.year,
            report.retained.len(),
            report.downloaded(),
            mib
        ),
        (None, None) => println!("{}: incomplete", report.year),
    }
}
