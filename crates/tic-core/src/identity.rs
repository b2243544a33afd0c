//! # Domain Identity Newtypes
//!
//! Newtype wrappers for every record identifier. You cannot pass a
//! `FacilityId` where a `QualificationId` is expected.
//!
//! Identifiers serialize as bare UUID strings. `Display` adds a kind
//! prefix (`facility:<uuid>`) for log and error output; `FromStr` accepts
//! both the prefixed and the bare form so ids copied from either place
//! round-trip through the CLI.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TicError;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// The kind prefix used by `Display`.
            pub const PREFIX: &'static str = $prefix;
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}:{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = TicError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .strip_prefix(concat!($prefix, ":"))
                    .unwrap_or(s)
                    .trim();
                Uuid::parse_str(raw).map(Self).map_err(|e| {
                    TicError::Validation(format!("invalid {} id {s:?}: {e}", $prefix))
                })
            }
        }
    };
}

record_id!(
    /// Unique identifier for a training institution.
    InstitutionId,
    "institution"
);

record_id!(
    /// Unique identifier for a qualification certificate.
    QualificationId,
    "qualification"
);

record_id!(
    /// Unique identifier for a facility.
    FacilityId,
    "facility"
);

record_id!(
    /// Unique identifier for a change record.
    ChangeRecordId,
    "change"
);
