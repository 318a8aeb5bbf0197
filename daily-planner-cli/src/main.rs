//! daily-planner CLI tool

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use daily_planner_cli_lib::cli::Cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    cli.init_logging();

    let config = cli.load_config()?;
    let ok = cli.command.execute(config).await?;

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
