//! # tic-state — Entities and Their Lifecycles
//!
//! The records the compliance engine reasons about, each with the
//! transitions it permits:
//!
//! - **Qualification** (`qualification.rs`): validity window plus an
//!   operator status (valid / expired / revoked / suspended). Renew,
//!   revoke, suspend and restore are logged as status transitions.
//!
//! - **Facility** (`facility.rs`): area, capacity, equipment, safety
//!   equipment, operational status and inspection dates.
//!
//! - **Change record** (`change_record.rs`): an audit entry with the
//!   pending → approved | rejected workflow. Terminal states refuse every
//!   further decision.
//!
//! - **Institution** (`institution.rs`): the aggregate that owns the three
//!   child collections and guards their back-references.
//!
//! Nothing in this crate reads the clock. Every mutating method takes the
//! `now: Timestamp` it should stamp onto the record.

pub mod change_record;
pub mod facility;
pub mod institution;
pub mod qualification;

// ─── Qualification re-exports ───────────────────────────────────────

pub use qualification::{
    NewQualification, Qualification, QualificationError, QualificationStatus,
    QualificationTransitionRecord, QualificationUpdate, Renewal,
};

// ─── Facility re-exports ────────────────────────────────────────────

pub use facility::{
    EquipmentItem, Facility, FacilityError, FacilityStatus, FacilityUpdate, NewFacility,
};

// ─── Change record re-exports ───────────────────────────────────────

pub use change_record::{
    ApprovalError, ApprovalState, ApprovalStatus, ChangeRecord, NewChangeRecord,
};

// ─── Institution re-exports ─────────────────────────────────────────

pub use institution::{
    is_plausible_email, ContactInfo, Institution, InstitutionError, InstitutionStatus,
    InstitutionUpdate, NewInstitution,
};
