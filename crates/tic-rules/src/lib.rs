//! # tic-rules — Compliance Rule Engine
//!
//! Pure functions over `tic-state` entities. Nothing here mutates state or
//! reads the clock; callers pass the instant to evaluate at.
//!
//! - [`facility`]: the per-facility rule table (area, density, safety
//!   equipment, operational status).
//! - [`institution`]: the institution-level verdict and the facility
//!   adequacy report.
//! - [`expiry`]: classification of qualifications by remaining days.
//! - [`issue`]: the [`ComplianceIssue`] every rule reports.

pub mod expiry;
pub mod facility;
pub mod institution;
pub mod issue;

pub use expiry::{
    assess_institution, assess_qualification, classify, ExpiryAssessment, ExpiryStatus,
    ExpiryThresholds,
};
pub use facility::{
    evaluate_facility, minimum_area, minimum_area_per_person, FacilityEvaluation,
    MANDATORY_SAFETY_EQUIPMENT, REQUIRED_STATUS,
};
pub use institution::{
    check_basic_data, check_facility_adequacy, check_institution_compliance,
    ComplianceVerdict, FacilityAdequacyReport, FacilityCounts, MINIMUM_TOTAL_AREA,
};
pub use issue::{round2, ComplianceIssue, IssueCategory};
