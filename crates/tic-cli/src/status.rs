//! # Status-Check Subcommand
//!
//! Runs the compliance aggregator over one institution, every institution
//! in a status, or the whole dataset.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use tic_core::InstitutionId;
use tic_rules::ComplianceVerdict;
use tic_state::InstitutionStatus;

use crate::output::{write_json, OutputFormat};
use crate::Session;

/// Arguments for the `tic status-check` subcommand.
#[derive(Args, Debug)]
pub struct StatusCheckArgs {
    /// Only check institutions in this status (e.g. "operating").
    #[arg(long, conflicts_with = "institution_id")]
    pub status: Option<InstitutionStatus>,

    /// Check a single institution.
    #[arg(long)]
    pub institution_id: Option<InstitutionId>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,

    /// Issues listed per institution in the summary.
    #[arg(long, default_value_t = 3)]
    pub max_issues: usize,
}

pub fn run_status_check(args: &StatusCheckArgs, session: &Session, out: &mut dyn Write) -> Result<u8> {
    let verdicts = match &args.institution_id {
        Some(id) => vec![session.registry.check_compliance(id)?],
        None => session.registry.check_all_compliance(args.status),
    };

    let failing = verdicts.iter().filter(|v| !v.is_compliant()).count();
    tracing::info!(checked = verdicts.len(), failing, "compliance check complete");

    match args.format {
        OutputFormat::Json => write_json(out, &verdicts)?,
        OutputFormat::Summary => write_summary(out, &verdicts, args.max_issues)?,
    }
    Ok(0)
}

fn write_summary(out: &mut dyn Write, verdicts: &[ComplianceVerdict], max_issues: usize) -> Result<()> {
    for verdict in verdicts {
        if verdict.is_compliant() {
            writeln!(out, "OK    {} ({})", verdict.institution_name, verdict.institution_id)?;
            continue;
        }
        writeln!(
            out,
            "FAIL  {} ({}): {} issue(s)",
            verdict.institution_name,
            verdict.institution_id,
            verdict.issues.len()
        )?;
        for issue in verdict.primary_issues(max_issues) {
            writeln!(out, "        - {issue}")?;
        }
        let hidden = verdict.issues.len().saturating_sub(max_issues);
        if hidden > 0 {
            writeln!(out, "        ... and {hidden} more")?;
        }
    }
    let compliant = verdicts.iter().filter(|v| v.is_compliant()).count();
    writeln!(out, "{compliant}/{} institution(s) compliant", verdicts.len())?;
    Ok(())
}
