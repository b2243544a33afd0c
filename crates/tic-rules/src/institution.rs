//! # Institution-Level Aggregation
//!
//! Combines master-data checks, the qualification check and every
//! facility's rule outcome into one verdict. Evaluation never stops at
//! the first failure: the verdict lists every issue, in this order:
//!
//! 1. basic data (name, legal representative, contact phone, operating status)
//! 2. `missing a valid training qualification` when none is valid at `now`
//! 3. `missing facility information` when there are no facilities,
//!    otherwise each facility's issues in facility-id order
//!
//! Facility adequacy (total area and required facility types) is a
//! separate report and does not feed the verdict.

use serde::{Deserialize, Serialize};

use tic_core::{FacilityType, InstitutionId, Timestamp};
use tic_state::{Institution, InstitutionStatus};

use crate::facility::{evaluate_facility, FacilityEvaluation};
use crate::issue::ComplianceIssue;

/// Minimum combined facility area in m².
pub const MINIMUM_TOTAL_AREA: f64 = 200.0;

/// Master-data checks on the institution record itself.
pub fn check_basic_data(institution: &Institution) -> Vec<ComplianceIssue> {
    let mut issues = Vec::new();
    if institution.name.trim().is_empty() {
        issues.push(ComplianceIssue::MissingName);
    }
    if institution.legal_representative.trim().is_empty() {
        issues.push(ComplianceIssue::MissingLegalRepresentative);
    }
    if institution.contact.phone.trim().is_empty() {
        issues.push(ComplianceIssue::MissingContactPhone);
    }
    if institution.status != InstitutionStatus::Operating {
        issues.push(ComplianceIssue::NotOperating {
            status: institution.status,
        });
    }
    issues
}

/// Run every institution-level rule at `now`.
pub fn check_institution_compliance(institution: &Institution, now: Timestamp) -> ComplianceVerdict {
    let mut issues = check_basic_data(institution);

    if !institution.has_valid_qualification(now) {
        issues.push(ComplianceIssue::MissingValidQualification);
    }

    let mut facilities = institution.facilities().peekable();
    if facilities.peek().is_none() {
        issues.push(ComplianceIssue::MissingFacilities);
    } else {
        issues.extend(facilities.flat_map(evaluate_facility));
    }

    ComplianceVerdict::new(institution, now, issues)
}

/// The outcome of [`check_institution_compliance`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceVerdict {
    pub institution_id: InstitutionId,
    pub institution_name: String,
    pub checked_at: Timestamp,
    pub compliant: bool,
    pub issues: Vec<ComplianceIssue>,
}

impl ComplianceVerdict {
    fn new(institution: &Institution, checked_at: Timestamp, issues: Vec<ComplianceIssue>) -> Self {
        Self {
            institution_id: institution.id,
            institution_name: institution.name.clone(),
            checked_at,
            compliant: issues.is_empty(),
            issues,
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.compliant
    }

    /// The first `n` issues, for summaries that truncate.
    pub fn primary_issues(&self, n: usize) -> &[ComplianceIssue] {
        &self.issues[..n.min(self.issues.len())]
    }

    /// Issue messages in order.
    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(ToString::to_string).collect()
    }
}

// ─── Facility adequacy ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityCounts {
    pub classroom: usize,
    pub training_area: usize,
    pub total: usize,
}

/// Per-facility outcomes plus the institution-wide adequacy rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityAdequacyReport {
    pub institution_id: InstitutionId,
    pub facilities: Vec<FacilityEvaluation>,
    pub overall_compliant: bool,
    pub overall_issues: Vec<ComplianceIssue>,
    pub total_area: f64,
    pub counts: FacilityCounts,
}

/// Total area of at least [`MINIMUM_TOTAL_AREA`], at least one classroom
/// and at least one training area. Each shortfall is a separate issue.
pub fn check_facility_adequacy(institution: &Institution) -> FacilityAdequacyReport {
    let facilities: Vec<FacilityEvaluation> =
        institution.facilities().map(FacilityEvaluation::of).collect();
    let total_area = institution.total_facility_area();
    let counts = FacilityCounts {
        classroom: count_of(institution, FacilityType::Classroom),
        training_area: count_of(institution, FacilityType::TrainingArea),
        total: facilities.len(),
    };

    let mut overall_issues = Vec::new();
    if total_area < MINIMUM_TOTAL_AREA {
        overall_issues.push(ComplianceIssue::TotalAreaBelowMinimum {
            required: MINIMUM_TOTAL_AREA,
            actual: total_area,
        });
    }
    if counts.classroom < 1 {
        overall_issues.push(ComplianceIssue::NoClassroom);
    }
    if counts.training_area < 1 {
        overall_issues.push(ComplianceIssue::NoTrainingArea);
    }

    FacilityAdequacyReport {
        institution_id: institution.id,
        facilities,
        overall_compliant: overall_issues.is_empty(),
        overall_issues,
        total_area,
        counts,
    }
}

fn count_of(institution: &Institution, facility_type: FacilityType) -> usize {
    institution
        .facilities()
        .filter(|f| f.facility_type == facility_type)
        .count()
}
