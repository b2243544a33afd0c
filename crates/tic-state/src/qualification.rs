//! # Qualification Lifecycle
//!
//! A qualification is a time-bounded certificate held by one institution.
//! Two independent notions of "state" apply to it:
//!
//! - the **operator status** (`valid`, `expired`, `revoked`, `suspended`),
//!   written explicitly by revoke/suspend/restore/renew, and
//! - the **temporal state**, computed from the validity window and a
//!   caller-supplied `now`.
//!
//! A qualification is *valid* only when both agree: status is `valid` and
//! `valid_from <= now < valid_to`.
//!
//! ## Status Transitions
//!
//! ```text
//!            revoke / suspend (unconditional)
//!   Valid ────────────────────────────────▶ Revoked | Suspended
//!     ▲                                          │
//!     └──────── restore (window still open) ─────┘
//!     ▲
//!     └──────── renew (new end after now) ◀── any status
//! ```
//!
//! Every status write appends a [`QualificationTransitionRecord`].
//! Certificate-number uniqueness spans institutions and is enforced by
//! the registry, not here.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tic_core::{
    InstitutionId, QualificationId, TicError, Timestamp, ValidationErrors, ValidityWindow,
};

// ─── Qualification Status ────────────────────────────────────────────

/// Operator-set status of a qualification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QualificationStatus {
    Valid,
    Expired,
    Revoked,
    Suspended,
}

impl QualificationStatus {
    pub fn all() -> &'static [QualificationStatus] {
        &[Self::Valid, Self::Expired, Self::Revoked, Self::Suspended]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
            Self::Suspended => "suspended",
        }
    }
}

impl std::fmt::Display for QualificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for QualificationStatus {
    type Err = TicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TicError::Validation(format!("unknown qualification status: {s:?}")))
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from qualification lifecycle transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QualificationError {
    /// Renewal end date is not strictly after `now`.
    #[error("renewal end date {new_valid_to} must be after {now}")]
    RenewalNotInFuture {
        new_valid_to: Timestamp,
        now: Timestamp,
    },

    /// Restore attempted after the validity window closed.
    #[error("qualification expired at {valid_to} and cannot be restored")]
    RestoreAfterExpiry { valid_to: Timestamp },

    /// The resulting validity window would be empty or inverted.
    #[error("{0}")]
    InvalidWindow(String),

    /// A supplied replacement value is blank.
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },
}

impl From<QualificationError> for TicError {
    fn from(err: QualificationError) -> Self {
        TicError::Validation(err.to_string())
    }
}

// ─── Transition Record ───────────────────────────────────────────────

/// Record of a status write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualificationTransitionRecord {
    pub from_status: QualificationStatus,
    pub to_status: QualificationStatus,
    pub timestamp: Timestamp,
    pub reason: String,
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Data required to register a qualification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQualification {
    /// Caller-chosen identifier; generated when absent.
    #[serde(default)]
    pub id: Option<QualificationId>,
    pub qualification_type: String,
    pub qualification_name: String,
    pub certificate_number: String,
    pub issuing_authority: String,
    pub issue_date: NaiveDate,
    pub valid_from: Timestamp,
    pub valid_to: Timestamp,
    #[serde(default)]
    pub scope: BTreeSet<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QualificationUpdate {
    pub qualification_type: Option<String>,
    pub qualification_name: Option<String>,
    pub certificate_number: Option<String>,
    pub issuing_authority: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub valid_from: Option<Timestamp>,
    pub valid_to: Option<Timestamp>,
    pub scope: Option<BTreeSet<String>>,
    pub attachments: Option<Vec<String>>,
}

/// Renewal request. Only `new_valid_to` is mandatory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Renewal {
    pub new_valid_to: Timestamp,
    #[serde(default)]
    pub new_certificate_number: Option<String>,
    #[serde(default)]
    pub issuing_authority: Option<String>,
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    #[serde(default)]
    pub scope: Option<BTreeSet<String>>,
    #[serde(default)]
    pub attachments: Option<Vec<String>>,
}

impl Renewal {
    /// A renewal that only moves the end date.
    pub fn until(new_valid_to: Timestamp) -> Self {
        Self {
            new_valid_to,
            new_certificate_number: None,
            issuing_authority: None,
            issue_date: None,
            scope: None,
            attachments: None,
        }
    }
}

// ─── Qualification ───────────────────────────────────────────────────

/// A certificate with its validity window, status and transition history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Qualification {
    pub id: QualificationId,
    pub institution_id: InstitutionId,
    pub qualification_type: String,
    pub qualification_name: String,
    pub certificate_number: String,
    pub issuing_authority: String,
    pub issue_date: NaiveDate,
    pub validity: ValidityWindow,
    #[serde(default)]
    pub scope: BTreeSet<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    status: QualificationStatus,
    #[serde(default)]
    transitions: Vec<QualificationTransitionRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Qualification {
    /// Validate `input` and create a qualification with status `valid`.
    ///
    /// All missing fields are reported together along with window ordering.
    pub fn new(
        institution_id: InstitutionId,
        input: NewQualification,
        now: Timestamp,
    ) -> Result<Self, TicError> {
        let mut errors = ValidationErrors::new();
        errors.require("qualification_type", &input.qualification_type);
        errors.require("qualification_name", &input.qualification_name);
        errors.require("certificate_number", &input.certificate_number);
        errors.require("issuing_authority", &input.issuing_authority);
        if input.valid_from >= input.valid_to {
            errors.push(format!(
                "valid_from ({}) must be before valid_to ({})",
                input.valid_from, input.valid_to
            ));
        }
        errors.finish()?;

        Ok(Self {
            id: input.id.unwrap_or_default(),
            institution_id,
            qualification_type: input.qualification_type,
            qualification_name: input.qualification_name,
            certificate_number: input.certificate_number,
            issuing_authority: input.issuing_authority,
            issue_date: input.issue_date,
            validity: ValidityWindow::new(input.valid_from, input.valid_to)?,
            scope: input.scope,
            attachments: input.attachments,
            status: QualificationStatus::Valid,
            transitions: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn status(&self) -> QualificationStatus {
        self.status
    }

    /// Ordered log of status writes.
    pub fn transitions(&self) -> &[QualificationTransitionRecord] {
        &self.transitions
    }

    pub fn valid_from(&self) -> Timestamp {
        self.validity.valid_from()
    }

    pub fn valid_to(&self) -> Timestamp {
        self.validity.valid_to()
    }

    /// Status is `valid` and `now` lies inside the validity window.
    pub fn is_valid(&self, now: Timestamp) -> bool {
        self.status == QualificationStatus::Valid && self.validity.contains(now)
    }

    /// Valid now and ending on or before `now + days`.
    pub fn is_expiring_soon(&self, now: Timestamp, days: i64) -> bool {
        self.is_valid(now) && self.validity.ends_within(now, days)
    }

    /// Status still says `valid` but the window has closed.
    pub fn is_lapsed(&self, now: Timestamp) -> bool {
        self.status == QualificationStatus::Valid && self.validity.has_ended(now)
    }

    /// Calendar days until `valid_to`; 0 once ended.
    pub fn remaining_days(&self, now: Timestamp) -> i64 {
        self.validity.remaining_days(now)
    }

    /// Whether `training_type` is in scope. An empty scope covers nothing.
    pub fn covers_training_type(&self, training_type: &str) -> bool {
        self.scope.contains(training_type)
    }

    /// Valid at `now` and covering every listed training type.
    pub fn covers_scope<S: AsRef<str>>(&self, training_types: &[S], now: Timestamp) -> bool {
        self.is_valid(now)
            && training_types
                .iter()
                .all(|t| self.covers_training_type(t.as_ref()))
    }

    /// Extend the validity window to `renewal.new_valid_to` and force status
    /// to `valid`.
    ///
    /// Everything is checked before anything is written, so a failed renewal
    /// leaves the qualification unchanged.
    pub fn renew(&mut self, renewal: Renewal, now: Timestamp) -> Result<(), QualificationError> {
        if renewal.new_valid_to <= now {
            return Err(QualificationError::RenewalNotInFuture {
                new_valid_to: renewal.new_valid_to,
                now,
            });
        }
        let validity = self
            .validity
            .with_valid_to(renewal.new_valid_to)
            .map_err(|e| QualificationError::InvalidWindow(e.to_string()))?;
        if renewal
            .new_certificate_number
            .as_deref()
            .is_some_and(|n| n.trim().is_empty())
        {
            return Err(QualificationError::EmptyField {
                field: "certificate_number",
            });
        }
        if renewal
            .issuing_authority
            .as_deref()
            .is_some_and(|a| a.trim().is_empty())
        {
            return Err(QualificationError::EmptyField {
                field: "issuing_authority",
            });
        }

        self.validity = validity;
        if let Some(number) = renewal.new_certificate_number {
            self.certificate_number = number;
        }
        if let Some(authority) = renewal.issuing_authority {
            self.issuing_authority = authority;
        }
        if let Some(date) = renewal.issue_date {
            self.issue_date = date;
        }
        if let Some(scope) = renewal.scope {
            self.scope = scope;
        }
        if let Some(attachments) = renewal.attachments {
            self.attachments = attachments;
        }
        let reason = format!("renewed until {}", renewal.new_valid_to);
        self.do_transition(QualificationStatus::Valid, &reason, now);
        Ok(())
    }

    /// Set status to `revoked`.
    pub fn revoke(&mut self, reason: &str, now: Timestamp) {
        self.do_transition(QualificationStatus::Revoked, reason, now);
    }

    /// Set status to `suspended`.
    pub fn suspend(&mut self, reason: &str, now: Timestamp) {
        self.do_transition(QualificationStatus::Suspended, reason, now);
    }

    /// Set status back to `valid`. Fails once the window has closed.
    pub fn restore(&mut self, now: Timestamp) -> Result<(), QualificationError> {
        if self.validity.has_ended(now) {
            return Err(QualificationError::RestoreAfterExpiry {
                valid_to: self.validity.valid_to(),
            });
        }
        self.do_transition(QualificationStatus::Valid, "restored", now);
        Ok(())
    }

    /// Apply a partial update, re-validating supplied fields and the window.
    /// Nothing is written unless every check passes.
    pub fn apply_update(&mut self, update: QualificationUpdate, now: Timestamp) -> Result<(), TicError> {
        let mut errors = ValidationErrors::new();
        let text_fields = [
            ("qualification_type", &update.qualification_type),
            ("qualification_name", &update.qualification_name),
            ("certificate_number", &update.certificate_number),
            ("issuing_authority", &update.issuing_authority),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                errors.require(field, value);
            }
        }
        let valid_from = update.valid_from.unwrap_or(self.validity.valid_from());
        let valid_to = update.valid_to.unwrap_or(self.validity.valid_to());
        if valid_from >= valid_to {
            errors.push(format!(
                "valid_from ({valid_from}) must be before valid_to ({valid_to})"
            ));
        }
        errors.finish()?;

        self.validity = ValidityWindow::new(valid_from, valid_to)?;
        if let Some(v) = update.qualification_type {
            self.qualification_type = v;
        }
        if let Some(v) = update.qualification_name {
            self.qualification_name = v;
        }
        if let Some(v) = update.certificate_number {
            self.certificate_number = v;
        }
        if let Some(v) = update.issuing_authority {
            self.issuing_authority = v;
        }
        if let Some(v) = update.issue_date {
            self.issue_date = v;
        }
        if let Some(v) = update.scope {
            self.scope = v;
        }
        if let Some(v) = update.attachments {
            self.attachments = v;
        }
        self.updated_at = now;
        Ok(())
    }

    fn do_transition(&mut self, to: QualificationStatus, reason: &str, now: Timestamp) {
        self.transitions.push(QualificationTransitionRecord {
            from_status: self.status,
            to_status: to,
            timestamp: now,
            reason: reason.to_string(),
        });
        self.status = to;
        self.updated_at = now;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
