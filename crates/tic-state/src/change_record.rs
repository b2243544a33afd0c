//! # Change Record Approval
//!
//! An audit entry describing one edit to an institution's data, plus the
//! two-outcome approval workflow that decides it.
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Approved (terminal)
//!    │
//!    └─────▶ Rejected (terminal)
//! ```
//!
//! The approver and decision time live inside the `Approved` / `Rejected`
//! variants of [`ApprovalState`], so "approver is set iff the record has
//! been decided" holds by construction. Deciding a record that is no
//! longer pending fails with [`ApprovalError::AlreadyProcessed`] and
//! leaves the earlier decision untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use tic_core::{ChangeRecordId, InstitutionId, TicError, Timestamp, ValidationErrors};

// ─── Approval State ──────────────────────────────────────────────────

/// Payload-free discriminant of [`ApprovalState`], for filters and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApprovalStatus {
    type Err = TicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(TicError::Validation(format!(
                "unknown approval status: {other:?}"
            ))),
        }
    }
}

/// Where a change record stands in the approval workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum ApprovalState {
    #[default]
    Pending,
    Approved {
        approver: String,
        decided_at: Timestamp,
    },
    Rejected {
        approver: String,
        decided_at: Timestamp,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },
}

impl ApprovalState {
    pub fn status(&self) -> ApprovalStatus {
        match self {
            Self::Pending => ApprovalStatus::Pending,
            Self::Approved { .. } => ApprovalStatus::Approved,
            Self::Rejected { .. } => ApprovalStatus::Rejected,
        }
    }

    pub fn approver(&self) -> Option<&str> {
        match self {
            Self::Pending => None,
            Self::Approved { approver, .. } | Self::Rejected { approver, .. } => Some(approver),
        }
    }

    pub fn decided_at(&self) -> Option<Timestamp> {
        match self {
            Self::Pending => None,
            Self::Approved { decided_at, .. } | Self::Rejected { decided_at, .. } => {
                Some(*decided_at)
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApprovalError {
    /// The record was already approved or rejected.
    #[error("change record {id} already processed ({status})")]
    AlreadyProcessed {
        id: ChangeRecordId,
        status: ApprovalStatus,
    },

    #[error("approver must not be empty")]
    EmptyApprover,
}

impl From<ApprovalError> for TicError {
    fn from(err: ApprovalError) -> Self {
        match err {
            ApprovalError::AlreadyProcessed { .. } => TicError::Conflict(err.to_string()),
            ApprovalError::EmptyApprover => TicError::Validation(err.to_string()),
        }
    }
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Data required to record a change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewChangeRecord {
    #[serde(default)]
    pub id: Option<ChangeRecordId>,
    pub change_type: String,
    pub change_details: Map<String, Value>,
    pub before: Map<String, Value>,
    pub after: Map<String, Value>,
    pub reason: String,
    pub operator: String,
    /// An initial decision; `None` records the change as pending.
    #[serde(default)]
    pub approval: Option<ApprovalState>,
}

// ─── Change Record ───────────────────────────────────────────────────

/// An audit entry for one institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub id: ChangeRecordId,
    pub institution_id: InstitutionId,
    pub change_type: String,
    pub change_details: Map<String, Value>,
    pub before: Map<String, Value>,
    pub after: Map<String, Value>,
    pub reason: String,
    pub operator: String,
    pub changed_at: Timestamp,
    #[serde(default)]
    approval: ApprovalState,
}

impl ChangeRecord {
    /// Validate `input` and create the record, timestamped at `now`.
    pub fn new(
        institution_id: InstitutionId,
        input: NewChangeRecord,
        now: Timestamp,
    ) -> Result<Self, TicError> {
        let mut errors = ValidationErrors::new();
        errors.require("change_type", &input.change_type);
        errors.require("reason", &input.reason);
        errors.require("operator", &input.operator);
        for (field, map) in [
            ("change_details", &input.change_details),
            ("before", &input.before),
            ("after", &input.after),
        ] {
            if map.is_empty() {
                errors.push(format!("{field} must not be empty"));
            }
        }
        if let Some(approver) = input.approval.as_ref().and_then(ApprovalState::approver) {
            errors.require("approver", approver);
        }
        errors.finish()?;

        Ok(Self {
            id: input.id.unwrap_or_default(),
            institution_id,
            change_type: input.change_type,
            change_details: input.change_details,
            before: input.before,
            after: input.after,
            reason: input.reason,
            operator: input.operator,
            changed_at: now,
            approval: input.approval.unwrap_or_default(),
        })
    }

    pub fn approval(&self) -> &ApprovalState {
        &self.approval
    }

    pub fn status(&self) -> ApprovalStatus {
        self.approval.status()
    }

    pub fn is_pending(&self) -> bool {
        self.approval.is_pending()
    }

    /// PENDING → APPROVED.
    pub fn approve(&mut self, approver: &str, now: Timestamp) -> Result<(), ApprovalError> {
        self.require_pending(approver)?;
        self.approval = ApprovalState::Approved {
            approver: approver.to_string(),
            decided_at: now,
        };
        Ok(())
    }

    /// PENDING → REJECTED, with an optional note explaining why.
    pub fn reject(
        &mut self,
        approver: &str,
        note: Option<&str>,
        now: Timestamp,
    ) -> Result<(), ApprovalError> {
        self.require_pending(approver)?;
        self.approval = ApprovalState::Rejected {
            approver: approver.to_string(),
            decided_at: now,
            note: note.filter(|n| !n.trim().is_empty()).map(str::to_string),
        };
        Ok(())
    }

    fn require_pending(&self, approver: &str) -> Result<(), ApprovalError> {
        if !self.approval.is_pending() {
            return Err(ApprovalError::AlreadyProcessed {
                id: self.id,
                status: self.approval.status(),
            });
        }
        if approver.trim().is_empty() {
            return Err(ApprovalError::EmptyApprover);
        }
        Ok(())
    }
}
