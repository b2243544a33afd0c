//! # Facility Rule Table
//!
//! Pure evaluation of one facility against a flat rule table:
//!
//! | Rule | Applies to | Threshold |
//! |------|------------|-----------|
//! | Minimum area | classroom / training area / office | 50 / 100 / 20 m² |
//! | Occupancy density | classroom / training area | 1.5 / 2.0 m² per person |
//! | Safety equipment | every facility | fire extinguisher, smoke alarm, emergency lighting |
//! | Operational status | every facility | must be in use |
//!
//! Thresholds are inclusive: an area exactly at the minimum passes.
//! Issues are reported in table order, one per missing safety item.

use serde::{Deserialize, Serialize};

use tic_core::{FacilityId, FacilityType};
use tic_state::{Facility, FacilityStatus};

use crate::issue::{round2, ComplianceIssue};

/// Safety items every facility must carry, matched by name ignoring case.
pub const MANDATORY_SAFETY_EQUIPMENT: [&str; 3] =
    ["fire extinguisher", "smoke alarm", "emergency lighting"];

/// The only status a compliant facility may be in.
pub const REQUIRED_STATUS: FacilityStatus = FacilityStatus::InUse;

/// Minimum floor area in m² for a facility type, if one applies.
pub fn minimum_area(facility_type: FacilityType) -> Option<f64> {
    match facility_type {
        FacilityType::Classroom => Some(50.0),
        FacilityType::TrainingArea => Some(100.0),
        FacilityType::Office => Some(20.0),
        FacilityType::MeetingRoom | FacilityType::Library | FacilityType::Other => None,
    }
}

/// Minimum floor area per occupant in m², if one applies.
pub fn minimum_area_per_person(facility_type: FacilityType) -> Option<f64> {
    match facility_type {
        FacilityType::Classroom => Some(1.5),
        FacilityType::TrainingArea => Some(2.0),
        FacilityType::Office
        | FacilityType::MeetingRoom
        | FacilityType::Library
        | FacilityType::Other => None,
    }
}

/// Evaluate a facility against every rule. Empty means compliant.
pub fn evaluate_facility(facility: &Facility) -> Vec<ComplianceIssue> {
    let mut issues = Vec::new();
    let facility_id = facility.id;

    if let Some(required) = minimum_area(facility.facility_type) {
        if facility.area < required {
            issues.push(ComplianceIssue::AreaBelowMinimum {
                facility_id,
                required,
                actual: facility.area,
            });
        }
    }

    if let Some(required) = minimum_area_per_person(facility.facility_type) {
        let actual = facility.area_per_person();
        if actual < required {
            issues.push(ComplianceIssue::DensityBelowMinimum {
                facility_id,
                required,
                actual: round2(actual),
            });
        }
    }

    for item in MANDATORY_SAFETY_EQUIPMENT {
        if !facility.has_safety_equipment(item) {
            issues.push(ComplianceIssue::MissingSafetyEquipment {
                facility_id,
                item: item.to_string(),
            });
        }
    }

    if facility.status != REQUIRED_STATUS {
        issues.push(ComplianceIssue::AbnormalStatus {
            facility_id,
            status: facility.status,
        });
    }

    issues
}

/// A facility together with its rule outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityEvaluation {
    pub facility_id: FacilityId,
    pub facility_name: String,
    pub facility_type: FacilityType,
    pub compliant: bool,
    pub issues: Vec<ComplianceIssue>,
}

impl FacilityEvaluation {
    pub fn of(facility: &Facility) -> Self {
        let issues = evaluate_facility(facility);
        Self {
            facility_id: facility.id,
            facility_name: facility.facility_name.clone(),
            facility_type: facility.facility_type,
            compliant: issues.is_empty(),
            issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tic_core::{InstitutionId, Timestamp};
    use tic_state::{EquipmentItem, NewFacility};

    fn now() -> Timestamp {
        Timestamp::parse("2026-05-10T09:00:00Z").unwrap()
    }

    fn full_safety() -> Vec<EquipmentItem> {
        MANDATORY_SAFETY_EQUIPMENT
            .iter()
            .map(|item| EquipmentItem::from(*item))
            .collect()
    }

    fn facility(facility_type: FacilityType, area: f64, capacity: u32) -> Facility {
        Facility::new(
            InstitutionId::new(),
            NewFacility {
                id: None,
                facility_type,
                facility_name: "Room".to_string(),
                location: "Building A".to_string(),
                area,
                capacity,
                equipment: vec![],
                safety_equipment: full_safety(),
                status: FacilityStatus::InUse,
                last_inspection: None,
                next_inspection: None,
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_compliant_classroom() {
        assert!(evaluate_facility(&facility(FacilityType::Classroom, 60.0, 30)).is_empty());
    }

    #[test]
    fn test_density_only_scenario() {
        let issues = evaluate_facility(&facility(FacilityType::Classroom, 60.0, 50));
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].to_string(),
            "density below minimum: requires 1.5 m²/person, has 1.2 m²/person"
        );
    }

    #[test]
    fn test_area_boundary_inclusive() {
        for ty in [FacilityType::Classroom, FacilityType::TrainingArea, FacilityType::Office] {
            let min = minimum_area(ty).unwrap();
            let at = evaluate_facility(&facility(ty, min, 1));
            assert!(
                !at.iter().any(|i| matches!(i, ComplianceIssue::AreaBelowMinimum { .. })),
                "{ty} at minimum should pass"
            );
            let below = evaluate_facility(&facility(ty, min - 1.0, 1));
            assert!(
                below.iter().any(|i| matches!(i, ComplianceIssue::AreaBelowMinimum { .. })),
                "{ty} below minimum should fail"
            );
        }
    }

    #[test]
    fn test_office_has_no_density_rule() {
        let issues = evaluate_facility(&facility(FacilityType::Office, 20.0, 100));
        assert!(issues.is_empty());
    }

    #[test]
    fn test_unregulated_types_only_check_safety_and_status() {
        let mut f = facility(FacilityType::Library, 1.0, 100);
        assert!(evaluate_facility(&f).is_empty());
        f.safety_equipment.clear();
        f.status = FacilityStatus::Decommissioned;
        let issues = evaluate_facility(&f);
        assert_eq!(issues.len(), 4);
        assert_eq!(issues[3].to_string(), "abnormal status: decommissioned");
    }

    #[test]
    fn test_missing_safety_items_reported_individually() {
        let mut f = facility(FacilityType::MeetingRoom, 30.0, 10);
        f.safety_equipment = vec![EquipmentItem::from("Smoke Alarm")];
        let messages: Vec<String> = evaluate_facility(&f).iter().map(|i| i.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "missing mandatory safety equipment: fire extinguisher",
                "missing mandatory safety equipment: emergency lighting",
            ]
        );
    }

    #[test]
    fn test_structured_safety_items_match_by_name() {
        let mut f = facility(FacilityType::Other, 10.0, 1);
        f.safety_equipment = serde_json::from_str(
            r#"[{"name": "fire extinguisher", "count": 2}, "smoke alarm", {"name": "Emergency Lighting"}]"#,
        )
        .unwrap();
        assert!(evaluate_facility(&f).is_empty());
    }

    #[test]
    fn test_issue_order_follows_table() {
        let mut f = facility(FacilityType::TrainingArea, 90.0, 60);
        f.safety_equipment.clear();
        f.status = FacilityStatus::PendingInspection;
        let issues = evaluate_facility(&f);
        assert!(matches!(issues[0], ComplianceIssue::AreaBelowMinimum { .. }));
        assert!(matches!(issues[1], ComplianceIssue::DensityBelowMinimum { .. }));
        assert!(matches!(issues[2], ComplianceIssue::MissingSafetyEquipment { .. }));
        assert!(matches!(issues[5], ComplianceIssue::AbnormalStatus { .. }));
        assert_eq!(issues.len(), 6);
    }

    #[test]
    fn test_evaluation_summary() {
        let eval = FacilityEvaluation::of(&facility(FacilityType::Classroom, 40.0, 10));
        assert!(!eval.compliant);
        assert_eq!(eval.issues.len(), 1);
    }
}
