//! # Expiry-Check Subcommand
//!
//! Classifies every qualification as expired, expiring soon, warning or
//! normal. With `--reminders`, prints the renewal reminder list instead.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use tic_core::InstitutionId;
use tic_registry::RenewalReminder;
use tic_rules::{ExpiryAssessment, ExpiryStatus, ExpiryThresholds};

use crate::output::{write_json, OutputFormat};
use crate::Session;

/// Arguments for the `tic expiry-check` subcommand.
#[derive(Args, Debug)]
pub struct ExpiryCheckArgs {
    /// Expiring-soon window in days. Overrides TIC_EXPIRY_WINDOW_DAYS.
    #[arg(long)]
    pub days: Option<i64>,

    /// Warning window in days. Overrides TIC_WARNING_WINDOW_DAYS.
    #[arg(long)]
    pub warning_days: Option<i64>,

    /// Only check a single institution.
    #[arg(long)]
    pub institution_id: Option<InstitutionId>,

    /// Include qualifications classified as normal.
    #[arg(long)]
    pub all: bool,

    /// Print renewal reminders for valid qualifications ending within the
    /// warning window.
    #[arg(long)]
    pub reminders: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

/// Assessments of one institution's qualifications.
#[derive(Debug, Serialize)]
pub struct InstitutionExpiry {
    pub institution_id: InstitutionId,
    pub institution_name: String,
    pub qualifications: Vec<ExpiryAssessment>,
}

pub fn run_expiry_check(args: &ExpiryCheckArgs, session: &Session, out: &mut dyn Write) -> Result<u8> {
    let thresholds = resolve_thresholds(args, session)?;

    if args.reminders {
        let reminders = session.registry.renewal_reminders(thresholds.warning_days());
        tracing::info!(count = reminders.len(), "renewal reminders collected");
        match args.format {
            OutputFormat::Json => write_json(out, &reminders)?,
            OutputFormat::Summary => write_reminders(out, &reminders)?,
        }
        return Ok(0);
    }

    let institutions = match &args.institution_id {
        Some(id) => vec![session.registry.get_institution(id)?],
        None => session.registry.list_institutions(),
    };
    let mut report = Vec::with_capacity(institutions.len());
    for inst in institutions {
        let qualifications: Vec<ExpiryAssessment> = session
            .registry
            .check_expiry(&inst.id, &thresholds)?
            .into_iter()
            .filter(|a| args.all || a.expiry_status.is_actionable())
            .collect();
        report.push(InstitutionExpiry {
            institution_id: inst.id,
            institution_name: inst.name,
            qualifications,
        });
    }

    match args.format {
        OutputFormat::Json => write_json(out, &report)?,
        OutputFormat::Summary => write_summary(out, &report)?,
    }
    Ok(0)
}

/// Command-line windows over configured ones. A `--days` beyond the
/// configured warning window widens the warning window to match.
fn resolve_thresholds(args: &ExpiryCheckArgs, session: &Session) -> Result<ExpiryThresholds> {
    let soon = args.days.unwrap_or(session.config.expiry_window_days);
    let warning = args
        .warning_days
        .unwrap_or_else(|| session.config.warning_window_days.max(soon));
    ExpiryThresholds::new(soon, warning).context("invalid expiry windows")
}

fn write_summary(out: &mut dyn Write, report: &[InstitutionExpiry]) -> Result<()> {
    let mut counts = [0usize; 4];
    for inst in report.iter().filter(|i| !i.qualifications.is_empty()) {
        writeln!(out, "{} ({})", inst.institution_name, inst.institution_id)?;
        for a in &inst.qualifications {
            counts[status_slot(a.expiry_status)] += 1;
            writeln!(
                out,
                "  {:<13} {}  {:>4}d  {} [{}]",
                a.expiry_status.as_str(),
                a.valid_to.date(),
                a.remaining_days,
                a.qualification_name,
                a.certificate_number
            )?;
        }
    }
    writeln!(
        out,
        "expired: {}, expiring-soon: {}, warning: {}, normal: {}",
        counts[0], counts[1], counts[2], counts[3]
    )?;
    Ok(())
}

fn status_slot(status: ExpiryStatus) -> usize {
    match status {
        ExpiryStatus::Expired => 0,
        ExpiryStatus::ExpiringSoon => 1,
        ExpiryStatus::Warning => 2,
        ExpiryStatus::Normal => 3,
    }
}

fn write_reminders(out: &mut dyn Write, reminders: &[RenewalReminder]) -> Result<()> {
    for r in reminders {
        writeln!(
            out,
            "{}  {:>4}d  {} [{}]  {}: {} <{}>",
            r.valid_to.date(),
            r.remaining_days,
            r.qualification_name,
            r.certificate_number,
            r.institution_name,
            r.contact_person,
            r.contact_email
        )?;
    }
    writeln!(out, "{} qualification(s) due for renewal", reminders.len())?;
    Ok(())
}
