//! Catalog writes (per part, per year) and reads for `status`.

use anyhow::{anyhow, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, Transaction};

use super::db::Catalog;
use super::types::{PartRecord, YearSummary};
use crate::harvest::{PartOutcome, RetainedPart, YearReport};
use crate::storage::unix_now;

const UPSERT_PART: &str = r#"
    INSERT INTO parts (year, part, file_name, url, bytes, remote_modified, outcome, checked_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    ON CONFLICT(year, part) DO UPDATE SET
        file_name = excluded.file_name,
        url = excluded.url,
        bytes = excluded.bytes,
        remote_modified = excluded.remote_modified,
        outcome = excluded.outcome,
        checked_at = excluded.checked_at
"#;

fn file_name_of(p: &RetainedPart) -> String {
    p.path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn upsert_part(tx: &mut Transaction<'_, Sqlite>, p: &RetainedPart, now: i64) -> Result<()> {
    sqlx::query(UPSERT_PART)
        .bind(p.part.year as i64)
        .bind(p.part.part as i64)
        .bind(file_name_of(p))
        .bind(&p.url)
        .bind(p.bytes as i64)
        .bind(p.remote_modified)
        .bind(p.outcome.as_str())
        .bind(now)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

impl Catalog {
    /// Record a single retained part as soon as it lands.
    pub async fn record_part(&self, p: &RetainedPart) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        upsert_part(&mut tx, p, unix_now()).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Record the outcome of a whole year.
    ///
    /// Retained parts are upserted. A complete year also drops rows at or past
    /// its threshold (parts withdrawn upstream) and stores the threshold; a
    /// failed year keeps its previous threshold and records the error.
    pub async fn record_year(&self, report: &YearReport) -> Result<()> {
        let now = unix_now();
        let year = report.year as i64;
        let mut tx = self.pool.begin().await?;
        for p in &report.retained {
            upsert_part(&mut tx, p, now).await?;
        }

        match (report.threshold, &report.failure) {
            (Some(threshold), None) => {
                sqlx::query("DELETE FROM parts WHERE year = ?1 AND part >= ?2")
                    .bind(year)
                    .bind(threshold as i64)
                    .execute(&mut *tx)
                    .await?;
                sqlx::query(
                    r#"
                    INSERT INTO years (year, threshold, last_error, checked_at)
                    VALUES (?1, ?2, NULL, ?3)
                    ON CONFLICT(year) DO UPDATE SET
                        threshold = excluded.threshold,
                        last_error = NULL,
                        checked_at = excluded.checked_at
                    "#,
                )
                .bind(year)
                .bind(threshold as i64)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
            (_, failure) => {
                let msg = failure.clone().unwrap_or_else(|| "incomplete".to_string());
                sqlx::query(
                    r#"
                    INSERT INTO years (year, threshold, last_error, checked_at)
                    VALUES (?1, NULL, ?2, ?3)
                    ON CONFLICT(year) DO UPDATE SET
                        last_error = excluded.last_error,
                        checked_at = excluded.checked_at
                    "#,
                )
                .bind(year)
                .bind(msg)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    /// All recorded years, ascending, with part counts and byte totals.
    pub async fn list_years(&self) -> Result<Vec<YearSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT y.year AS year, y.threshold AS threshold, y.last_error AS last_error,
                   y.checked_at AS checked_at,
                   COUNT(p.part) AS parts, COALESCE(SUM(p.bytes), 0) AS bytes
            FROM years y
            LEFT JOIN parts p ON p.year = y.year
            GROUP BY y.year
            ORDER BY y.year ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let year: i64 = row.get("year");
            out.push(YearSummary {
                year: year as i32,
                parts: row.get("parts"),
                bytes: row.get("bytes"),
                threshold: row.get("threshold"),
                last_error: row.get("last_error"),
                checked_at: row.get("checked_at"),
            });
        }
        Ok(out)
    }

    /// Retained parts of one year in part order.
    pub async fn parts_for_year(&self, year: i32) -> Result<Vec<PartRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT year, part, file_name, url, bytes, remote_modified, outcome, checked_at
            FROM parts
            WHERE year = ?1
            ORDER BY part ASC
            "#,
        )
        .bind(year as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(part_from_row).collect()
    }
}

fn part_from_row(row: &SqliteRow) -> Result<PartRecord> {
    let year: i64 = row.get("year");
    let part: i64 = row.get("part");
    let outcome: String = row.get("outcome");
    let outcome = PartOutcome::parse(&outcome)
        .ok_or_else(|| anyhow!("catalog row {} part {}: unknown outcome {:?}", year, part, outcome))?;
    Ok(PartRecord {
        year: year as i32,
        part,
        file_name: row.get("file_name"),
        url: row.get("url"),
        bytes: row.get("bytes"),
        remote_modified: row.get("remote_modified"),
        outcome,
        checked_at: row.get("checked_at"),
    })
}
