//! # Error Types
//!
//! The error taxonomy shared by every crate in the workspace. Lifecycle
//! modules define their own narrow error enums and convert into
//! [`TicError`] at the orchestration boundary.
//!
//! ## Kinds
//!
//! - **Validation**: malformed or missing input, bad date ordering, a
//!   renewal date that is not in the future, restoring an expired
//!   qualification. Never silently corrected.
//! - **NotFound**: an identifier that does not resolve.
//! - **Conflict**: a uniqueness violation, or an illegal state transition
//!   such as deciding an already-processed change record.
//!
//! None of these are retryable: the core performs no I/O of its own.

use thiserror::Error;

/// Top-level error type for training-institution compliance.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TicError {
    /// Input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind ("institution", "qualification", ...).
        kind: &'static str,
        /// The identifier that failed to resolve.
        id: String,
    },

    /// Uniqueness violation or illegal state transition.
    #[error("conflict: {0}")]
    Conflict(String),
}

/// Discriminant of [`TicError`] for callers that branch on the taxonomy
/// without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
}

impl TicError {
    /// Shorthand for a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Shorthand for a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Shorthand for a not-found error.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// The taxonomy bucket this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
        }
    }
}

/// Collects field-level validation failures and reports them together,
/// so a caller sees every problem with a submission at once.
#[derive(Debug, Default)]
pub struct ValidationErrors {
    messages: Vec<String>,
}

impl ValidationErrors {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure.
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// Record `"<field> must not be empty"` when `value` is blank.
    pub fn require(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(format!("{field} must not be empty"));
        }
    }

    /// Whether no failures were recorded.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// `Ok(())` when empty, otherwise a single [`TicError::Validation`]
    /// joining every message with `"; "`.
    pub fn finish(self) -> Result<(), TicError> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(TicError::Validation(self.messages.join("; ")))
        }
    }
}
