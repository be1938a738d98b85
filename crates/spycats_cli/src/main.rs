//! `spycats` command-line front end.
//!
//! # Responsibility
//! - Resolve configuration, start logging, and dispatch one command.
//! - Map domain failures onto stable error codes and exit statuses.
//!
//! Exit status: 0 on success, 3 when the breed list is not loaded (retry
//! later), 2 for other domain rule failures, 1 for everything else.

mod breed_source;
mod commands;
mod config;

use clap::Parser;
use commands::Command;
use config::{CliConfig, ConfigArgs};
use log::info;
use spycats_core::{init_logging, CatServiceError, MissionServiceError};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "spycats")]
#[command(about = "Spy Cat Agency: cats, missions and targets backed by SQLite")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Command,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (code, status) = classify(&err);
            eprintln!("error[{code}]: {err:#}");
            ExitCode::from(status)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::resolve(cli.config)?;
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, &log_dir.to_string_lossy()).map_err(anyhow::Error::msg)?;
    }
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );

    cli.command.run(&config)
}

fn classify(err: &anyhow::Error) -> (&'static str, u8) {
    if let Some(err) = err.downcast_ref::<CatServiceError>() {
        return (err.code(), domain_status(err.code(), err.is_retryable()));
    }
    if let Some(err) = err.downcast_ref::<MissionServiceError>() {
        return (err.code(), domain_status(err.code(), false));
    }
    ("internal", 1)
}

fn domain_status(code: &str, retryable: bool) -> u8 {
    if retryable {
        return 3;
    }
    match code {
        "storage_error" | "inconsistent_state" => 1,
        _ => 2,
    }
}
