use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::classify::DEFAULT_END_MARKER;
use crate::part::DEFAULT_URL_TEMPLATE;
use crate::retry::FailurePolicy;
use crate::years::FIRST_RELEASE_YEAR;

/// Default destination, relative to the working directory.
pub const DEFAULT_DEST_DIR: &str = "990data/raw";

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per part (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
        }
    }
}

/// Global configuration loaded from `~/.config/e990/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct E990Config {
    /// First year requested.
    pub start_year: i32,
    /// Remote URL with `{year}` and `{part}` placeholders.
    pub url_template: String,
    /// Directory receiving the archives.
    pub dest_dir: PathBuf,
    /// Substring that marks a fetched body as the end-of-series HTML page.
    pub end_marker: String,
    /// Upper bound on parts tried per year before the year is reported as failed.
    pub max_parts_per_year: u32,
    /// What to do once a part keeps failing after retries.
    #[serde(default)]
    pub on_failure: FailurePolicy,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

impl Default for E990Config {
    fn default() -> Self {
        Self {
            start_year: FIRST_RELEASE_YEAR,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            dest_dir: PathBuf::from(DEFAULT_DEST_DIR),
            end_marker: DEFAULT_END_MARKER.to_string(),
            max_parts_per_year: 200,
            on_failure: FailurePolicy::AbortRun,
            retry: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("e990")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<E990Config> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = E990Config::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: E990Config =
        toml::from_str(&data).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}
