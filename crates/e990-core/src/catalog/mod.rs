//! Persistent catalog of retained archive parts (SQLite via sqlx).
//!
//! Mirrors what the harvest left on disk: one row per retained part and one
//! row per year with its end-of-series threshold, so `e990 status` can report
//! without touching the network.

mod db;
mod records;
mod types;

pub use db::Catalog;
pub use types::{PartRecord, YearSummary};
