//! # Statistics
//!
//! Aggregate counts over institutions and their children. Each summary is
//! computed from a set of borrowed records so the registry can build it
//! under a single read guard.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tic_core::{FacilityType, Timestamp};
use tic_rules::round2;
use tic_state::{
    ApprovalStatus, ChangeRecord, Facility, FacilityStatus, Institution, InstitutionStatus,
    Qualification, QualificationStatus,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionStatistics {
    pub total: usize,
    pub by_status: BTreeMap<InstitutionStatus, usize>,
    pub by_type: BTreeMap<String, usize>,
}

impl InstitutionStatistics {
    pub fn collect<'a>(institutions: impl IntoIterator<Item = &'a Institution>) -> Self {
        let mut stats = Self::default();
        for inst in institutions {
            stats.total += 1;
            *stats.by_status.entry(inst.status).or_default() += 1;
            *stats.by_type.entry(inst.institution_type.clone()).or_default() += 1;
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationStatistics {
    pub total: usize,
    /// Valid at the evaluation instant (status and window).
    pub valid: usize,
    /// Valid and ending within the expiring-soon window.
    pub expiring_soon: usize,
    pub by_status: BTreeMap<QualificationStatus, usize>,
    pub by_type: BTreeMap<String, usize>,
}

impl QualificationStatistics {
    pub fn collect<'a>(
        qualifications: impl IntoIterator<Item = &'a Qualification>,
        now: Timestamp,
        expiring_soon_days: i64,
    ) -> Self {
        let mut stats = Self::default();
        for q in qualifications {
            stats.total += 1;
            if q.is_valid(now) {
                stats.valid += 1;
            }
            if q.is_expiring_soon(now, expiring_soon_days) {
                stats.expiring_soon += 1;
            }
            *stats.by_status.entry(q.status()).or_default() += 1;
            *stats.by_type.entry(q.qualification_type.clone()).or_default() += 1;
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacilityStatistics {
    pub total: usize,
    pub total_area: f64,
    pub total_capacity: u64,
    pub average_area: f64,
    pub average_capacity: f64,
    pub needing_inspection: usize,
    pub by_type: BTreeMap<FacilityType, usize>,
    pub by_status: BTreeMap<FacilityStatus, usize>,
}

impl FacilityStatistics {
    pub fn collect<'a>(facilities: impl IntoIterator<Item = &'a Facility>, now: Timestamp) -> Self {
        let mut stats = Self::default();
        for f in facilities {
            stats.total += 1;
            stats.total_area += f.area;
            stats.total_capacity += u64::from(f.capacity);
            if f.needs_inspection(now) {
                stats.needing_inspection += 1;
            }
            *stats.by_type.entry(f.facility_type).or_default() += 1;
            *stats.by_status.entry(f.status).or_default() += 1;
        }
        if stats.total > 0 {
            let n = stats.total as f64;
            stats.average_area = round2(stats.total_area / n);
            stats.average_capacity = round2(stats.total_capacity as f64 / n);
        }
        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatistics {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
    /// Approved as a percentage of all records, two decimals; 0 when empty.
    pub approval_rate: f64,
    pub by_type: BTreeMap<String, usize>,
    pub by_operator: BTreeMap<String, usize>,
    /// Keyed by `YYYY-MM` of `changed_at`.
    pub by_month: BTreeMap<String, usize>,
}

impl ChangeStatistics {
    pub fn collect<'a>(records: impl IntoIterator<Item = &'a ChangeRecord>) -> Self {
        let mut stats = Self::default();
        for r in records {
            stats.total += 1;
            match r.status() {
                ApprovalStatus::Pending => stats.pending += 1,
                ApprovalStatus::Approved => stats.approved += 1,
                ApprovalStatus::Rejected => stats.rejected += 1,
            }
            *stats.by_type.entry(r.change_type.clone()).or_default() += 1;
            *stats.by_operator.entry(r.operator.clone()).or_default() += 1;
            let month = r.changed_at.as_datetime().format("%Y-%m").to_string();
            *stats.by_month.entry(month).or_default() += 1;
        }
        if stats.total > 0 {
            stats.approval_rate = round2(stats.approved as f64 / stats.total as f64 * 100.0);
        }
        stats
    }
}
