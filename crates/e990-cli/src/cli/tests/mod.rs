//! CLI parse tests.

use super::{Cli, CliCommand};
use clap::Parser;
use std::sync::{Mutex, MutexGuard};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Held while a test reads or sets `E990_*` variables.
pub(super) fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
}

/// Parse with the env lock already held by the caller.
pub(super) fn parse_unlocked(args: &[&str]) -> CliCommand {
    let cli = Cli::try_parse_from(args).unwrap();
    cli.into_command()
}

pub(super) fn parse(args: &[&str]) -> CliCommand {
    let _guard = env_lock();
    parse_unlocked(args)
}

mod fetch;
