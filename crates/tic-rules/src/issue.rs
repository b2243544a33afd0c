//! # Compliance Issues
//!
//! One variant per rule that can fail. `Display` renders the human-readable
//! message; the structured fields stay available for callers that group or
//! filter issues.

use serde::{Deserialize, Serialize};

use tic_core::FacilityId;
use tic_state::{FacilityStatus, InstitutionStatus};

/// Where an issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCategory {
    /// Institution master data.
    BasicData,
    Qualification,
    /// A single facility's rule table.
    Facility,
    /// Institution-wide facility adequacy.
    Adequacy,
}

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum ComplianceIssue {
    MissingName,
    MissingLegalRepresentative,
    MissingContactPhone,
    NotOperating {
        status: InstitutionStatus,
    },
    MissingValidQualification,
    MissingFacilities,
    AreaBelowMinimum {
        facility_id: FacilityId,
        required: f64,
        actual: f64,
    },
    DensityBelowMinimum {
        facility_id: FacilityId,
        required: f64,
        actual: f64,
    },
    MissingSafetyEquipment {
        facility_id: FacilityId,
        item: String,
    },
    AbnormalStatus {
        facility_id: FacilityId,
        status: FacilityStatus,
    },
    TotalAreaBelowMinimum {
        required: f64,
        actual: f64,
    },
    NoClassroom,
    NoTrainingArea,
}

impl ComplianceIssue {
    pub fn category(&self) -> IssueCategory {
        match self {
            Self::MissingName
            | Self::MissingLegalRepresentative
            | Self::MissingContactPhone
            | Self::NotOperating { .. } => IssueCategory::BasicData,
            Self::MissingValidQualification => IssueCategory::Qualification,
            Self::MissingFacilities
            | Self::AreaBelowMinimum { .. }
            | Self::DensityBelowMinimum { .. }
            | Self::MissingSafetyEquipment { .. }
            | Self::AbnormalStatus { .. } => IssueCategory::Facility,
            Self::TotalAreaBelowMinimum { .. } | Self::NoClassroom | Self::NoTrainingArea => {
                IssueCategory::Adequacy
            }
        }
    }

    /// The facility the issue is about, if any.
    pub fn facility_id(&self) -> Option<FacilityId> {
        match self {
            Self::AreaBelowMinimum { facility_id, .. }
            | Self::DensityBelowMinimum { facility_id, .. }
            | Self::MissingSafetyEquipment { facility_id, .. }
            | Self::AbnormalStatus { facility_id, .. } => Some(*facility_id),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComplianceIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName => f.write_str("institution name must not be empty"),
            Self::MissingLegalRepresentative => {
                f.write_str("legal representative must not be empty")
            }
            Self::MissingContactPhone => f.write_str("contact phone must not be empty"),
            Self::NotOperating { status } => write!(f, "institution is not operating: {status}"),
            Self::MissingValidQualification => {
                f.write_str("missing a valid training qualification")
            }
            Self::MissingFacilities => f.write_str("missing facility information"),
            Self::AreaBelowMinimum {
                required, actual, ..
            } => write!(
                f,
                "area below minimum: requires {required} m², has {actual} m²"
            ),
            Self::DensityBelowMinimum {
                required, actual, ..
            } => write!(
                f,
                "density below minimum: requires {required} m²/person, has {actual} m²/person"
            ),
            Self::MissingSafetyEquipment { item, .. } => {
                write!(f, "missing mandatory safety equipment: {item}")
            }
            Self::AbnormalStatus { status, .. } => write!(f, "abnormal status: {status}"),
            Self::TotalAreaBelowMinimum { required, actual } => write!(
                f,
                "total facility area below minimum: requires {required} m², has {actual} m²"
            ),
            Self::NoClassroom => f.write_str("at least one classroom is required"),
            Self::NoTrainingArea => f.write_str("at least one training area is required"),
        }
    }
}

/// Round to two decimal places, for reporting derived ratios. Shared by
/// compliance issues and registry statistics.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
