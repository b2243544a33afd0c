//! Qualification expiry classification.
//!
//! Buckets a qualification by its remaining days: `<= 0` expired,
//! `<= expiring_soon_days` expiring soon, `<= warning_days` warning,
//! otherwise normal. The bucket depends on the window alone; the operator
//! status is reported next to it in [`ExpiryAssessment::is_valid`].

use serde::{Deserialize, Serialize};

use tic_core::{InstitutionId, QualificationId, TicError, Timestamp};
use tic_state::{Institution, Qualification, QualificationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpiryStatus {
    Expired,
    ExpiringSoon,
    Warning,
    Normal,
}

impl ExpiryStatus {
    pub fn all() -> &'static [ExpiryStatus] {
        &[Self::Expired, Self::ExpiringSoon, Self::Warning, Self::Normal]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::ExpiringSoon => "expiring-soon",
            Self::Warning => "warning",
            Self::Normal => "normal",
        }
    }

    /// Whether the qualification needs attention.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl std::fmt::Display for ExpiryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Day thresholds for [`classify`]. `0 <= expiring_soon_days <= warning_days`
/// holds for deserialized values too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds")]
pub struct ExpiryThresholds {
    expiring_soon_days: i64,
    warning_days: i64,
}

#[derive(Deserialize)]
struct RawThresholds {
    expiring_soon_days: i64,
    warning_days: i64,
}

impl TryFrom<RawThresholds> for ExpiryThresholds {
    type Error = TicError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        Self::new(raw.expiring_soon_days, raw.warning_days)
    }
}

impl Default for ExpiryThresholds {
    fn default() -> Self {
        Self {
            expiring_soon_days: 30,
            warning_days: 60,
        }
    }
}

impl ExpiryThresholds {
    pub fn new(expiring_soon_days: i64, warning_days: i64) -> Result<Self, TicError> {
        if expiring_soon_days < 0 {
            return Err(TicError::validation(format!(
                "expiring-soon window must not be negative, got {expiring_soon_days}"
            )));
        }
        if warning_days < expiring_soon_days {
            return Err(TicError::validation(format!(
                "warning window ({warning_days} days) must not be shorter than the \
                 expiring-soon window ({expiring_soon_days} days)"
            )));
        }
        Ok(Self {
            expiring_soon_days,
            warning_days,
        })
    }

    pub fn expiring_soon_days(&self) -> i64 {
        self.expiring_soon_days
    }

    pub fn warning_days(&self) -> i64 {
        self.warning_days
    }
}

pub fn classify(remaining_days: i64, thresholds: &ExpiryThresholds) -> ExpiryStatus {
    if remaining_days <= 0 {
        ExpiryStatus::Expired
    } else if remaining_days <= thresholds.expiring_soon_days {
        ExpiryStatus::ExpiringSoon
    } else if remaining_days <= thresholds.warning_days {
        ExpiryStatus::Warning
    } else {
        ExpiryStatus::Normal
    }
}

/// One row of an expiry check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiryAssessment {
    pub qualification_id: QualificationId,
    pub institution_id: InstitutionId,
    pub qualification_name: String,
    pub certificate_number: String,
    pub valid_to: Timestamp,
    pub status: QualificationStatus,
    pub remaining_days: i64,
    pub expiry_status: ExpiryStatus,
    pub is_valid: bool,
}

pub fn assess_qualification(
    qualification: &Qualification,
    now: Timestamp,
    thresholds: &ExpiryThresholds,
) -> ExpiryAssessment {
    let remaining_days = qualification.remaining_days(now);
    ExpiryAssessment {
        qualification_id: qualification.id,
        institution_id: qualification.institution_id,
        qualification_name: qualification.qualification_name.clone(),
        certificate_number: qualification.certificate_number.clone(),
        valid_to: qualification.valid_to(),
        status: qualification.status(),
        remaining_days,
        expiry_status: classify(remaining_days, thresholds),
        is_valid: qualification.is_valid(now),
    }
}

/// Assess every qualification of an institution, soonest expiry first.
pub fn assess_institution(
    institution: &Institution,
    now: Timestamp,
    thresholds: &ExpiryThresholds,
) -> Vec<ExpiryAssessment> {
    let mut rows: Vec<ExpiryAssessment> = institution
        .qualifications()
        .map(|q| assess_qualification(q, now, thresholds))
        .collect();
    rows.sort_by_key(|row| (row.valid_to, row.qualification_id));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use tic_state::NewQualification;

    fn now() -> Timestamp {
        Timestamp::parse("2026-05-10T09:00:00Z").unwrap()
    }

    fn qualification(valid_to_days: i64) -> Qualification {
        let valid_from = now().plus_days(-100);
        Qualification::new(
            InstitutionId::new(),
            NewQualification {
                id: None,
                qualification_type: "safety-training".to_string(),
                qualification_name: "Work Safety Training License".to_string(),
                certificate_number: "WS-9".to_string(),
                issuing_authority: "Bureau".to_string(),
                issue_date: valid_from.date(),
                valid_from,
                valid_to: now().plus_days(valid_to_days),
                scope: Default::default(),
                attachments: vec![],
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_classify_boundaries() {
        let t = ExpiryThresholds::default();
        assert_eq!(classify(-5, &t), ExpiryStatus::Expired);
        assert_eq!(classify(0, &t), ExpiryStatus::Expired);
        assert_eq!(classify(1, &t), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify(30, &t), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify(31, &t), ExpiryStatus::Warning);
        assert_eq!(classify(60, &t), ExpiryStatus::Warning);
        assert_eq!(classify(61, &t), ExpiryStatus::Normal);
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(ExpiryThresholds::new(-1, 10).is_err());
        assert!(ExpiryThresholds::new(40, 30).is_err());
        let t = ExpiryThresholds::new(10, 10).unwrap();
        assert_eq!(classify(10, &t), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify(11, &t), ExpiryStatus::Normal);
    }

    #[test]
    fn test_thresholds_checked_on_deserialize() {
        let inverted = r#"{"expiring_soon_days": 60, "warning_days": 30}"#;
        let err = serde_json::from_str::<ExpiryThresholds>(inverted).unwrap_err();
        assert!(err.to_string().contains("must not be shorter"));

        let negative = r#"{"expiring_soon_days": -1, "warning_days": 30}"#;
        assert!(serde_json::from_str::<ExpiryThresholds>(negative).is_err());

        let ok: ExpiryThresholds =
            serde_json::from_str(r#"{"expiring_soon_days": 14, "warning_days": 45}"#).unwrap();
        assert_eq!(ok, ExpiryThresholds::new(14, 45).unwrap());
    }

    #[test]
    fn test_assessment_of_revoked_qualification() {
        let mut q = qualification(15);
        q.revoke("fraud", now());
        let row = assess_qualification(&q, now(), &ExpiryThresholds::default());
        assert_eq!(row.remaining_days, 15);
        assert_eq!(row.expiry_status, ExpiryStatus::ExpiringSoon);
        assert!(!row.is_valid);
        assert_eq!(row.status, QualificationStatus::Revoked);
    }

    #[test]
    fn test_assessment_after_expiry() {
        let row = assess_qualification(&qualification(-3), now(), &ExpiryThresholds::default());
        assert_eq!(row.remaining_days, 0);
        assert_eq!(row.expiry_status, ExpiryStatus::Expired);
        assert!(row.expiry_status.is_actionable());
    }

    #[test]
    fn test_serialized_status() {
        assert_eq!(
            serde_json::to_value(ExpiryStatus::ExpiringSoon).unwrap(),
            serde_json::json!("expiring-soon")
        );
    }
}
