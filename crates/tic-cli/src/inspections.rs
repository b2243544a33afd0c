//! # Inspections Subcommand
//!
//! Lists facilities due for inspection (never scheduled first, then by
//! date). With `--schedule-from`, assigns each due facility an inspection
//! date, one interval apart.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;

use tic_core::{FacilityId, InstitutionId};
use tic_registry::{tally, BatchItemResult, DEFAULT_INSPECTION_INTERVAL_DAYS};
use tic_state::Facility;

use crate::output::{write_json, OutputFormat};
use crate::Session;

/// Arguments for the `tic inspections` subcommand.
#[derive(Args, Debug)]
pub struct InspectionsArgs {
    /// Only consider facilities of this institution.
    #[arg(long)]
    pub institution_id: Option<InstitutionId>,

    /// Schedule every due facility, the first on this date (YYYY-MM-DD).
    #[arg(long)]
    pub schedule_from: Option<NaiveDate>,

    /// Days between consecutive scheduled inspections.
    #[arg(long, default_value_t = DEFAULT_INSPECTION_INTERVAL_DAYS, requires = "schedule_from")]
    pub interval_days: u64,

    /// Write the updated dataset back to its file.
    #[arg(long)]
    pub write: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize)]
struct DueFacility<'a> {
    facility_id: FacilityId,
    institution_id: InstitutionId,
    facility_name: &'a str,
    facility_type: &'a str,
    next_inspection: Option<NaiveDate>,
}

pub fn run_inspections(args: &InspectionsArgs, session: &Session, out: &mut dyn Write) -> Result<u8> {
    let due = session
        .registry
        .facilities_needing_inspection(args.institution_id.as_ref());

    let Some(start) = args.schedule_from else {
        if args.write {
            tracing::warn!("--write has no effect without --schedule-from");
        }
        return list_due(args.format, &due, out);
    };

    let ids: Vec<FacilityId> = due.iter().map(|f| f.id).collect();
    let results = session
        .registry
        .batch_schedule_inspections(&ids, start, args.interval_days);
    let (succeeded, failed) = tally(&results);
    tracing::info!(succeeded, failed, %start, interval_days = args.interval_days, "inspections scheduled");

    match args.format {
        OutputFormat::Json => write_json(out, &results)?,
        OutputFormat::Summary => write_batch(out, &results)?,
    }
    if args.write && succeeded > 0 {
        session.persist()?;
    }
    Ok(0)
}

fn list_due(format: OutputFormat, due: &[Facility], out: &mut dyn Write) -> Result<u8> {
    match format {
        OutputFormat::Json => {
            let rows: Vec<DueFacility<'_>> = due
                .iter()
                .map(|f| DueFacility {
                    facility_id: f.id,
                    institution_id: f.institution_id,
                    facility_name: &f.facility_name,
                    facility_type: f.facility_type.as_str(),
                    next_inspection: f.next_inspection,
                })
                .collect();
            write_json(out, &rows)?;
        }
        OutputFormat::Summary => {
            for f in due {
                let next = f
                    .next_inspection
                    .map_or_else(|| "unscheduled".to_string(), |d| d.to_string());
                writeln!(out, "{next:<11}  {} [{}] ({})", f.facility_name, f.facility_type, f.id)?;
            }
            writeln!(out, "{} facility(ies) due for inspection", due.len())?;
        }
    }
    Ok(0)
}

/// Per-item batch results, shared with the `changes` subcommand.
pub(crate) fn write_batch<K: std::fmt::Display>(
    out: &mut dyn Write,
    results: &[BatchItemResult<K>],
) -> Result<()> {
    for r in results {
        match (&r.detail, &r.error) {
            (_, Some(error)) => writeln!(out, "FAIL  {}: {error}", r.id)?,
            (Some(detail), None) => writeln!(out, "OK    {}: {detail}", r.id)?,
            (None, None) => writeln!(out, "OK    {}", r.id)?,
        }
    }
    let (succeeded, failed) = tally(results);
    writeln!(out, "{succeeded} succeeded, {failed} failed")?;
    Ok(())
}
