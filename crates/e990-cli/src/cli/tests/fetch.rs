//! Tests for the fetch subcommand and its overrides.

use super::{env_lock, parse, parse_unlocked};
use crate::cli::{Cli, CliCommand, FetchArgs, RangeArgs};
use clap::Parser;
use e990_core::config::E990Config;
use e990_core::retry::FailurePolicy;
use std::path::{Path, PathBuf};

const ENV_VARS: [&str; 4] = [
    "E990_DEST",
    "E990_START_YEAR",
    "E990_THROUGH_YEAR",
    "E990_URL_TEMPLATE",
];

fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}

#[test]
fn no_subcommand_means_fetch() {
    let _guard = env_lock();
    clear_env();
    match parse_unlocked(&["e990"]) {
        CliCommand::Fetch(args) => {
            assert!(args.dest.is_none());
            assert!(args.range.through_year.is_none());
            assert!(!args.skip_failed_years);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn bare_invocation_honours_env_overrides() {
    let _guard = env_lock();
    clear_env();
    std::env::set_var("E990_DEST", "/srv/990/env");
    std::env::set_var("E990_START_YEAR", "2017");
    std::env::set_var("E990_THROUGH_YEAR", "2018");
    std::env::set_var("E990_URL_TEMPLATE", "http://mirror.local/{year}/{part}.zip");

    let bare = parse_unlocked(&["e990"]);
    let explicit = parse_unlocked(&["e990", "fetch"]);
    clear_env();

    for cmd in [bare, explicit] {
        match cmd {
            CliCommand::Fetch(args) => {
                assert_eq!(args.dest.as_deref(), Some(Path::new("/srv/990/env")));
                assert_eq!(args.range.start_year, Some(2017));
                assert_eq!(args.range.through_year, Some(2018));
                assert_eq!(
                    args.url_template.as_deref(),
                    Some("http://mirror.local/{year}/{part}.zip")
                );
            }
            _ => panic!("expected Fetch"),
        }
    }
}

#[test]
fn bare_invocation_takes_fetch_flags() {
    match parse(&["e990", "--dest", "/data", "--skip-failed-years", "--through-year", "2016"]) {
        CliCommand::Fetch(args) => {
            assert_eq!(args.dest.as_deref(), Some(Path::new("/data")));
            assert_eq!(args.range.through_year, Some(2016));
            assert!(args.skip_failed_years);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn top_level_flags_conflict_with_subcommands() {
    let _guard = env_lock();
    assert!(Cli::try_parse_from(["e990", "--dest", "/data", "status"]).is_err());
}

#[test]
fn cli_parse_fetch_overrides() {
    match parse(&[
        "e990",
        "fetch",
        "--dest",
        "/srv/990/raw",
        "--start-year",
        "2018",
        "--through-year",
        "2020",
        "--url-template",
        "http://mirror.local/{year}/{part}.zip",
        "--skip-failed-years",
    ]) {
        CliCommand::Fetch(args) => {
            assert_eq!(args.dest.as_deref(), Some(Path::new("/srv/990/raw")));
            assert_eq!(args.range.start_year, Some(2018));
            assert_eq!(args.range.through_year, Some(2020));
            assert_eq!(
                args.url_template.as_deref(),
                Some("http://mirror.local/{year}/{part}.zip")
            );
            assert!(args.skip_failed_years);
        }
        _ => panic!("expected Fetch"),
    }
}

#[test]
fn apply_overrides_config() {
    let args = FetchArgs {
        dest: Some(PathBuf::from("/data")),
        url_template: Some("http://mirror.local/{year}/{part}.zip".to_string()),
        skip_failed_years: true,
        range: RangeArgs {
            start_year: Some(2020),
            through_year: Some(2021),
        },
    };
    let cfg = args.apply(E990Config::default());
    assert_eq!(cfg.dest_dir, PathBuf::from("/data"));
    assert_eq!(cfg.url_template, "http://mirror.local/{year}/{part}.zip");
    assert_eq!(cfg.start_year, 2020);
    assert_eq!(cfg.on_failure, FailurePolicy::SkipYear);
}

#[test]
fn apply_without_overrides_keeps_config() {
    let cfg = FetchArgs::default().apply(E990Config::default());
    let default = E990Config::default();
    assert_eq!(cfg.dest_dir, default.dest_dir);
    assert_eq!(cfg.url_template, default.url_template);
    assert_eq!(cfg.start_year, default.start_year);
    assert_eq!(cfg.on_failure, FailurePolicy::AbortRun);
}

#[test]
fn range_resolves_against_config() {
    let range = RangeArgs {
        start_year: None,
        through_year: Some(2017),
    };
    let years = range.resolve(&E990Config::default());
    assert_eq!(years.iter().collect::<Vec<_>>(), vec![2015, 2016, 2017]);
}
