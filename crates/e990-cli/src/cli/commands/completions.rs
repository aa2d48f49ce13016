//! `e990 completions` and `e990 man`.

use anyhow::Result;
use clap::CommandFactory;

use crate::cli::Cli;

pub fn run_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "e990", &mut std::io::stdout());
}

pub fn run_man() -> Result<()> {
    let man = clap_mangen::Man::new(Cli::command());
    man.render(&mut std::io::stdout())?;
    Ok(())
}
