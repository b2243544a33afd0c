//! # tic-core — Foundational Types for Training-Institution Compliance
//!
//! This crate is the leaf of the workspace. It defines the primitives every
//! other crate builds on and depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Injected time.** No rule in the workspace reads the wall clock.
//!    Every temporal computation takes a `now: Timestamp` argument, and
//!    long-lived services hold an `Arc<dyn Clock>` so tests can freeze or
//!    advance time with [`FixedClock`].
//!
//! 2. **Half-open validity windows.** [`ValidityWindow`] is `[from, to)`:
//!    the start instant is inside the window, the end instant is not.
//!    `from < to` is enforced at construction.
//!
//! 3. **Newtype wrappers for identifiers.** `InstitutionId`,
//!    `QualificationId`, `FacilityId`, `ChangeRecordId` cannot be confused
//!    for one another.
//!
//! 4. **Single `FacilityType` enum.** The facility taxonomy is defined once
//!    and every rule table matches on it exhaustively.
//!
//! 5. **Three error kinds.** Validation, not-found and conflict. All are
//!    local, synchronous and non-retryable.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tic-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod domain;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use domain::{FacilityType, FACILITY_TYPE_COUNT};
pub use error::{ErrorKind, TicError, ValidationErrors};
pub use identity::{ChangeRecordId, FacilityId, InstitutionId, QualificationId};
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp, ValidityWindow};
