//! # tic-registry — Institution Registry and Services
//!
//! The in-memory persistence collaborator for the compliance engine, plus
//! the orchestration services built on it.
//!
//! ## Architecture
//!
//! [`Registry`] is a cloneable handle over `Arc<RwLock<_>>` state and an
//! injected [`tic_core::Clock`]. Services are methods on the handle,
//! grouped by the record they act on:
//!
//! - **Institutions** (`institutions.rs`): create, update (with a
//!   `basic-info` audit entry), status change (with a `status` audit
//!   entry), search, compliance verdicts, statistics, cascade removal.
//! - **Qualifications** (`qualifications.rs`): add, update, renew, revoke,
//!   suspend, restore, expiry classification, renewal reminders.
//! - **Facilities** (`facilities.rs`): add, update, inspections (single and
//!   batch), equipment, adequacy report.
//! - **Change records** (`changes.rs`): record, approve, reject, batch
//!   decisions, history and statistics.
//!
//! ## Atomicity
//!
//! Each service call takes the lock once. Calls that check and then write
//! (uniqueness, approval, renewal) do both under the same write guard and
//! stage edits on a clone, so a failed call leaves the registry as it was.
//!
//! ## Persistence
//!
//! [`Registry::from_institutions`] hydrates from a deserialized dataset and
//! [`Registry::snapshot`] returns the aggregates for writing back.

pub mod batch;
pub mod changes;
pub mod facilities;
pub mod institutions;
pub mod qualifications;
pub mod registry;
pub mod stats;

pub use batch::{tally, BatchItemResult};
pub use facilities::DEFAULT_INSPECTION_INTERVAL_DAYS;
pub use institutions::{
    Attribution, SearchField, BASIC_INFO_CHANGE, STATUS_CHANGE, SYSTEM_OPERATOR,
};
pub use qualifications::RenewalReminder;
pub use registry::Registry;
pub use stats::{
    ChangeStatistics, FacilityStatistics, InstitutionStatistics, QualificationStatistics,
};
