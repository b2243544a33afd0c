//! # tic CLI entry point
//!
//! Reads configuration from the environment, installs logging, parses the
//! command line and dispatches to the subcommand handlers in `tic_cli`.

use std::process::ExitCode;

use clap::Parser;

use tic_cli::config::CliConfig;
use tic_cli::{init_tracing, run, Cli};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // The subscriber is configured from this, so report directly.
            eprintln!("error: {e}");
            return ExitCode::from(2);
        }
    };
    init_tracing(&config, cli.verbose);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "tic starting");

    let mut stdout = std::io::stdout().lock();
    match run(cli, config, &mut stdout) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
