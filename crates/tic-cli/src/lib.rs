//! # tic-cli — Command-Line Interface for Institution Compliance
//!
//! Provides the `tic` binary. Every command loads a dataset file into a
//! [`Registry`], runs services against it and prints either JSON or a
//! human summary.
//!
//! ## Subcommands
//!
//! - `tic status-check`: Compliance verdicts per institution.
//! - `tic expiry-check`: Qualification expiry classification and renewal reminders.
//! - `tic inspections`: Facilities due for inspection; batch scheduling.
//! - `tic changes`: Pending change records; approve and reject.
//!
//! ```bash
//! tic --dataset institutions.yaml status-check --status operating
//! tic --dataset institutions.yaml expiry-check --days 14 --as-of 2026-06-30
//! tic --dataset institutions.yaml inspections --schedule-from 2026-07-01 --interval-days 7 --write
//! tic --dataset institutions.yaml changes approve <id> <id> --approver auditor --write
//! ```
//!
//! Commands that modify the registry only write the dataset back when
//! `--write` is given.

pub mod changes;
pub mod config;
pub mod dataset;
pub mod expiry;
pub mod inspections;
pub mod output;
pub mod status;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tic_core::{Clock, FixedClock, SystemClock, Timestamp};
use tic_registry::Registry;

use crate::changes::{run_changes, ChangesArgs};
use crate::config::{CliConfig, LogFormat};
use crate::dataset::Dataset;
use crate::expiry::{run_expiry_check, ExpiryCheckArgs};
use crate::inspections::{run_inspections, InspectionsArgs};
use crate::status::{run_status_check, StatusCheckArgs};

/// Training-institution compliance checks over a dataset file.
#[derive(Parser, Debug)]
#[command(name = "tic", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Dataset file (.json, .yaml or .yml). Falls back to TIC_DATASET.
    #[arg(long, global = true)]
    pub dataset: Option<PathBuf>,

    /// Evaluate as of this date or RFC 3339 timestamp instead of now.
    #[arg(long, global = true, value_parser = parse_as_of)]
    pub as_of: Option<Timestamp>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check institutions against the compliance rules.
    StatusCheck(StatusCheckArgs),

    /// Classify qualifications by how close they are to expiry.
    ExpiryCheck(ExpiryCheckArgs),

    /// List facilities due for inspection and optionally schedule them.
    Inspections(InspectionsArgs),

    /// Review, approve and reject change records.
    Changes(ChangesArgs),
}

fn parse_as_of(s: &str) -> Result<Timestamp, String> {
    Timestamp::parse_date_or_timestamp(s).map_err(|e| e.to_string())
}

/// A loaded dataset and the registry built from it.
pub struct Session {
    pub registry: Registry,
    pub config: CliConfig,
    path: PathBuf,
}

impl Session {
    /// Load `path` into a registry. `as_of` freezes the registry clock.
    pub fn open(path: &Path, config: CliConfig, as_of: Option<Timestamp>) -> Result<Self> {
        let clock: Arc<dyn Clock> = match as_of {
            Some(now) => Arc::new(FixedClock::new(now)),
            None => Arc::new(SystemClock),
        };
        let dataset = dataset::load(path)?;
        let registry = Registry::from_institutions(dataset.institutions, clock)
            .with_context(|| format!("dataset {} is inconsistent", path.display()))?;
        Ok(Self {
            registry,
            config,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the registry back to the dataset file it was loaded from.
    pub fn persist(&self) -> Result<()> {
        dataset::save(
            &self.path,
            &Dataset {
                institutions: self.registry.snapshot(),
            },
        )
    }
}

/// Run a parsed command line, printing results to `out`.
pub fn run(cli: Cli, config: CliConfig, out: &mut dyn Write) -> Result<u8> {
    let path = cli
        .dataset
        .or_else(|| config.dataset.clone())
        .context("no dataset given: pass --dataset or set TIC_DATASET")?;
    let session = Session::open(&path, config, cli.as_of)?;
    tracing::debug!(
        dataset = %session.path().display(),
        institutions = session.registry.len(),
        now = %session.registry.now(),
        "session opened"
    );

    match &cli.command {
        Commands::StatusCheck(args) => run_status_check(args, &session, out),
        Commands::ExpiryCheck(args) => run_expiry_check(args, &session, out),
        Commands::Inspections(args) => run_inspections(args, &session, out),
        Commands::Changes(args) => run_changes(args, &session, out),
    }
}

/// Install the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_tracing(config: &CliConfig, verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match config.log_format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}
