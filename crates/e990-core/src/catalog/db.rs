//! SQLite-backed catalog: connection and migrations. Record I/O lives in `records`.

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Percent-encode a path for use in a sqlite:// URI so spaces and special chars don't break parsing.
fn path_to_sqlite_uri(path: &Path) -> String {
    let s = path.to_string_lossy();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            ' ' => out.push_str("%20"),
            '#' => out.push_str("%23"),
            '?' => out.push_str("%3F"),
            '&' => out.push_str("%26"),
            c => out.push(c),
        }
    }
    format!("sqlite://{}", out)
}

/// Handle to the catalog database.
///
/// The default file is `~/.local/state/e990/catalog.db`.
#[derive(Clone)]
pub struct Catalog {
    pub(crate) pool: Pool<Sqlite>,
}

impl Catalog {
    /// Open (or create) the default catalog and run migrations.
    pub async fn open_default() -> Result<Self> {
        let xdg_dirs = xdg::BaseDirectories::with_prefix("e990")?;
        let db_path = xdg_dirs.place_state_file("catalog.db")?;
        Self::open_at(&db_path).await
    }

    /// Open (or create) the catalog at a specific path. Creates parent dirs if needed.
    pub async fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let uri = path_to_sqlite_uri(path) + "?mode=rwc";
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect(&uri)
            .await?;
        let db = Catalog { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS parts (
                year INTEGER NOT NULL,
                part INTEGER NOT NULL,
                file_name TEXT NOT NULL,
                url TEXT NOT NULL,
                bytes INTEGER NOT NULL,
                remote_modified INTEGER,
                outcome TEXT NOT NULL,
                checked_at INTEGER NOT NULL,
                PRIMARY KEY (year, part)
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS years (
                year INTEGER PRIMARY KEY,
                threshold INTEGER,
                last_error TEXT,
                checked_at INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
/// Open an in-memory catalog for tests (no disk I/O).
pub(crate) async fn open_memory() -> Result<Catalog> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;
    let db = Catalog { pool };
    db.migrate().await?;
    Ok(db)
}
