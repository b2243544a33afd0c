//! # Changes Subcommand
//!
//! Review and decide change records.
//!
//! ## Subcommands
//!
//! - `pending`: Records awaiting a decision, oldest first.
//! - `history`: Every record of one institution, newest first.
//! - `stats`: Totals, approval rate, per-type and per-operator counts.
//! - `approve`: Approve records by id.
//! - `reject`: Reject records by id with an optional reason.
//!
//! Decisions are per record: one failed id does not stop the others and
//! does not fail the process.

use std::io::Write;

use anyhow::{ensure, Result};
use clap::{Args, Subcommand};

use tic_core::{ChangeRecordId, InstitutionId};
use tic_registry::tally;
use tic_state::ChangeRecord;

use crate::inspections::write_batch;
use crate::output::{write_json, OutputFormat};
use crate::Session;

/// Arguments for the `tic changes` subcommand.
#[derive(Args, Debug)]
pub struct ChangesArgs {
    #[command(subcommand)]
    pub command: ChangesCommand,

    /// Write the updated dataset back to its file.
    #[arg(long, global = true)]
    pub write: bool,

    #[arg(long, value_enum, global = true, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug)]
pub enum ChangesCommand {
    /// List records awaiting a decision.
    Pending {
        #[arg(long)]
        institution_id: Option<InstitutionId>,
    },

    /// Show the change history of one institution.
    History {
        #[arg(long)]
        institution_id: InstitutionId,
    },

    /// Change-record statistics.
    Stats {
        #[arg(long)]
        institution_id: Option<InstitutionId>,
    },

    /// Approve pending records (PENDING → APPROVED).
    Approve {
        #[arg(required = true)]
        ids: Vec<ChangeRecordId>,
        /// Who is approving.
        #[arg(long)]
        approver: String,
    },

    /// Reject pending records (PENDING → REJECTED).
    Reject {
        #[arg(required = true)]
        ids: Vec<ChangeRecordId>,
        /// Who is rejecting.
        #[arg(long)]
        approver: String,
        /// Note stored with the rejection.
        #[arg(long)]
        reason: Option<String>,
    },
}

pub fn run_changes(args: &ChangesArgs, session: &Session, out: &mut dyn Write) -> Result<u8> {
    let registry = &session.registry;
    match &args.command {
        ChangesCommand::Pending { institution_id } => {
            let records = registry.pending_changes(institution_id.as_ref());
            list_records(args.format, &records, out)
        }
        ChangesCommand::History { institution_id } => {
            let records = registry.change_history(institution_id)?;
            list_records(args.format, &records, out)
        }
        ChangesCommand::Stats { institution_id } => {
            let stats = registry.change_statistics(institution_id.as_ref())?;
            match args.format {
                OutputFormat::Json => write_json(out, &stats)?,
                OutputFormat::Summary => {
                    writeln!(
                        out,
                        "total: {}, pending: {}, approved: {}, rejected: {}, approval rate: {}%",
                        stats.total, stats.pending, stats.approved, stats.rejected, stats.approval_rate
                    )?;
                    for (change_type, count) in &stats.by_type {
                        writeln!(out, "  {change_type}: {count}")?;
                    }
                    for (operator, count) in &stats.by_operator {
                        writeln!(out, "  by {operator}: {count}")?;
                    }
                }
            }
            Ok(0)
        }
        ChangesCommand::Approve { ids, approver } => {
            ensure!(!approver.trim().is_empty(), "--approver must not be blank");
            let results = registry.batch_approve(ids, approver);
            decide_output(args, session, &results, out)
        }
        ChangesCommand::Reject { ids, approver, reason } => {
            ensure!(!approver.trim().is_empty(), "--approver must not be blank");
            let results = registry.batch_reject(ids, approver, reason.as_deref());
            decide_output(args, session, &results, out)
        }
    }
}

fn decide_output(
    args: &ChangesArgs,
    session: &Session,
    results: &[tic_registry::BatchItemResult<ChangeRecordId>],
    out: &mut dyn Write,
) -> Result<u8> {
    match args.format {
        OutputFormat::Json => write_json(out, results)?,
        OutputFormat::Summary => write_batch(out, results)?,
    }
    let (succeeded, _) = tally(results);
    if args.write && succeeded > 0 {
        session.persist()?;
    }
    Ok(0)
}

fn list_records(format: OutputFormat, records: &[ChangeRecord], out: &mut dyn Write) -> Result<u8> {
    match format {
        OutputFormat::Json => write_json(out, records)?,
        OutputFormat::Summary => {
            for r in records {
                writeln!(
                    out,
                    "{}  {:<8}  {}  {} by {}: {}",
                    r.changed_at,
                    r.status(),
                    r.id,
                    r.change_type,
                    r.operator,
                    r.reason
                )?;
            }
            writeln!(out, "{} record(s)", records.len())?;
        }
    }
    Ok(0)
}
