mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use arcadedb_config::Config;
use clap::Parser;
use exn::ResultExt;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.default_filter());
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(retryable = e.is_retryable(), "{e:?}");
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Configuration loaded");
    match cli.command() {
        Command::Build { offline } => commands::build(&config, offline),
        Command::Snapshot { source, output, metadata } => {
            commands::snapshot(&config, &source, &output, metadata.as_deref())
        },
        Command::Missing { catalog, mirror, skip_list } => {
            commands::missing(&catalog, &mirror, skip_list.as_deref())
        },
    }
}

/// Line-oriented logging on standard output, filtered by `RUST_LOG` when set.
fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stdout).with_target(false).init();
}
