//! # Facility Type — Single Source of Truth
//!
//! Defines the `FacilityType` enum used by every facility record and every
//! rule table in the workspace. Every `match` on `FacilityType` is
//! exhaustive, so adding a type forces each rule table to decide whether
//! the new type carries an area or density minimum.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TicError;

/// The closed set of physical facility kinds an institution may register.
///
/// | Type | Area minimum | Density minimum |
/// |------|--------------|-----------------|
/// | Classroom | 50 m² | 1.5 m²/person |
/// | TrainingArea | 100 m² | 2.0 m²/person |
/// | Office | 20 m² | - |
/// | MeetingRoom | - | - |
/// | Library | - | - |
/// | Other | - | - |
///
/// The minimums themselves live in `tic-rules`; the table is here so the
/// taxonomy and its regulatory weight read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityType {
    /// Theory teaching room.
    Classroom,
    /// Hands-on practical training space.
    TrainingArea,
    /// Administrative office.
    Office,
    MeetingRoom,
    Library,
    Other,
}

/// Total number of facility types.
pub const FACILITY_TYPE_COUNT: usize = 6;

impl FacilityType {
    /// Returns every facility type in canonical order.
    pub fn all() -> &'static [FacilityType] {
        &[
            Self::Classroom,
            Self::TrainingArea,
            Self::Office,
            Self::MeetingRoom,
            Self::Library,
            Self::Other,
        ]
    }

    /// Returns the kebab-case identifier. Matches the serde format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classroom => "classroom",
            Self::TrainingArea => "training-area",
            Self::Office => "office",
            Self::MeetingRoom => "meeting-room",
            Self::Library => "library",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FacilityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacilityType {
    type Err = TicError;

    /// Parse from the identifiers produced by [`FacilityType::as_str()`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classroom" => Ok(Self::Classroom),
            "training-area" => Ok(Self::TrainingArea),
            "office" => Ok(Self::Office),
            "meeting-room" => Ok(Self::MeetingRoom),
            "library" => Ok(Self::Library),
            "other" => Ok(Self::Other),
            other => Err(TicError::Validation(format!(
                "unknown facility type: {other:?}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_count() {
        assert_eq!(FacilityType::all().len(), FACILITY_TYPE_COUNT);
    }

    #[test]
    fn test_as_str_roundtrip() {
        for ty in FacilityType::all() {
            let parsed: FacilityType = ty.as_str().parse().unwrap();
            assert_eq!(*ty, parsed);
        }
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("gymnasium".parse::<FacilityType>().is_err());
        assert!("Classroom".parse::<FacilityType>().is_err()); // case-sensitive
        assert!("".parse::<FacilityType>().is_err());
    }

    #[test]
    fn test_unknown_type_is_validation_error() {
        let err = "lab".parse::<FacilityType>().unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Validation);
    }

    #[test]
    fn test_serde_format_matches_as_str() {
        for ty in FacilityType::all() {
            let json = serde_json::to_string(ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty.as_str()));
        }
    }
}
