use anyhow::Result;
use clap::Parser;

use local_overrides::cli::Cli;
use local_overrides::commands;

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    commands::dispatch(Cli::parse())
}
