//! CLI for the e990 archive fetcher.

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use e990_core::config::{self, E990Config};
use e990_core::retry::FailurePolicy;
use e990_core::years::{self, YearRange};
use std::path::PathBuf;

use commands::{run_completions, run_fetch, run_man, run_status, run_years};

/// Top-level CLI. Without a subcommand, `fetch` runs with the top-level flags.
#[derive(Debug, Parser)]
#[command(name = "e990", version, args_conflicts_with_subcommands = true)]
#[command(about = "Fetch the IRS Form 990 e-file XML bulk archives", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub fetch: FetchArgs,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

impl Cli {
    /// The subcommand to run; a bare `e990` is `fetch` with the top-level flags.
    pub fn into_command(self) -> CliCommand {
        self.command.unwrap_or(CliCommand::Fetch(self.fetch))
    }
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download every available archive part for each year (default).
    Fetch(FetchArgs),

    /// Show what has been retained, per year.
    Status {
        /// List the retained parts of this year.
        #[arg(long, value_name = "YEAR")]
        year: Option<i32>,
    },

    /// Print the years a fetch would cover.
    Years(RangeArgs),

    /// Print a shell completion script.
    Completions {
        /// Target shell.
        shell: clap_complete::Shell,
    },

    /// Print the man page (roff).
    Man,
}

/// Year range overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct RangeArgs {
    /// First year to fetch (default from config, 2015).
    #[arg(long, env = "E990_START_YEAR", value_name = "YEAR")]
    pub start_year: Option<i32>,

    /// Last year to fetch (default: current year).
    #[arg(long, env = "E990_THROUGH_YEAR", value_name = "YEAR")]
    pub through_year: Option<i32>,
}

impl RangeArgs {
    pub fn resolve(&self, cfg: &E990Config) -> YearRange {
        YearRange::new(
            self.start_year.unwrap_or(cfg.start_year),
            self.through_year.unwrap_or_else(years::current_year),
        )
    }
}

/// Overrides for a fetch run; anything unset comes from config.toml.
#[derive(Debug, Clone, Default, Args)]
pub struct FetchArgs {
    /// Directory receiving the archives.
    #[arg(long, env = "E990_DEST", value_name = "DIR")]
    pub dest: Option<PathBuf>,

    /// Remote URL with {year} and {part} placeholders.
    #[arg(long, env = "E990_URL_TEMPLATE", value_name = "TEMPLATE")]
    pub url_template: Option<String>,

    /// Keep going with later years when a year fails.
    #[arg(long)]
    pub skip_failed_years: bool,

    #[command(flatten)]
    pub range: RangeArgs,
}

impl FetchArgs {
    /// Config with these overrides applied.
    pub fn apply(&self, mut cfg: E990Config) -> E990Config {
        if let Some(dest) = &self.dest {
            cfg.dest_dir = dest.clone();
        }
        if let Some(template) = &self.url_template {
            cfg.url_template = template.clone();
        }
        if let Some(start) = self.range.start_year {
            cfg.start_year = start;
        }
        if self.skip_failed_years {
            cfg.on_failure = FailurePolicy::SkipYear;
        }
        cfg
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.into_command() {
            CliCommand::Fetch(args) => {
                let cfg = config::load_or_init()?;
                tracing::debug!("loaded config: {:?}", cfg);
                run_fetch(args.apply(cfg), &args.range).await?;
            }
            CliCommand::Status { year } => run_status(year).await?,
            CliCommand::Years(range) => {
                let cfg = config::load_or_init()?;
                run_years(range.resolve(&cfg));
            }
            CliCommand::Completions { shell } => run_completions(shell),
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
