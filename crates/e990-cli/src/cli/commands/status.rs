//! `e990 status` – what the catalog holds, per year.

use anyhow::Result;
use e990_core::catalog::Catalog;

fn format_time(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

pub async fn run_status(year: Option<i32>) -> Result<()> {
    let catalog = Catalog::open_default().await?;

    if let Some(year) = year {
        let parts = catalog.parts_for_year(year).await?;
        if parts.is_empty() {
            println!("No parts recorded for {}.", year);
            return Ok(());
        }
        println!("{:<6} {:<12} {:<12} {}", "PART", "SIZE", "OUTCOME", "FILE");
        for p in parts {
            println!(
                "{:<6} {:<12} {:<12} {}",
                p.part,
                p.bytes,
                p.outcome.as_str(),
                p.file_name
            );
        }
        return Ok(());
    }

    let years = catalog.list_years().await?;
    if years.is_empty() {
        println!("Nothing fetched yet.");
        return Ok(());
    }
    println!(
        "{:<6} {:<6} {:<10} {:<10} {:<17} {}",
        "YEAR", "PARTS", "MIB", "THRESHOLD", "CHECKED", "ERROR"
    );
    for y in years {
        let threshold = y
            .threshold
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<6} {:<10.1} {:<10} {:<17} {}",
            y.year,
            y.parts,
            y.bytes as f64 / 1_048_576.0,
            threshold,
            format_time(y.checked_at),
            y.last_error.as_deref().unwrap_or("")
        );
    }
    Ok(())
}
