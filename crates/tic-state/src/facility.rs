//! # Facility Records
//!
//! Physical assets an institution registers: classrooms, training areas,
//! offices and so on. A facility carries its area, capacity, equipment,
//! safety equipment, operational status and inspection dates.
//!
//! Equipment entries are free-form. They arrive either as a bare label
//! (`"fire extinguisher"`) or as a structured object with a `name` and any
//! other attributes (`{"name": "smoke alarm", "count": 4}`). [`EquipmentItem`]
//! models both and normalizes to a name with [`EquipmentItem::name()`].

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tic_core::{FacilityId, FacilityType, InstitutionId, TicError, Timestamp, ValidationErrors};

// ─── Facility Status ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FacilityStatus {
    #[default]
    InUse,
    UnderMaintenance,
    Decommissioned,
    PendingInspection,
}

impl FacilityStatus {
    pub fn all() -> &'static [FacilityStatus] {
        &[
            Self::InUse,
            Self::UnderMaintenance,
            Self::Decommissioned,
            Self::PendingInspection,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InUse => "in-use",
            Self::UnderMaintenance => "under-maintenance",
            Self::Decommissioned => "decommissioned",
            Self::PendingInspection => "pending-inspection",
        }
    }
}

impl std::fmt::Display for FacilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FacilityStatus {
    type Err = TicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TicError::Validation(format!("unknown facility status: {s:?}")))
    }
}

// ─── Equipment ───────────────────────────────────────────────────────

/// A piece of (safety) equipment, as a bare label or a structured record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EquipmentItem {
    Label(String),
    Structured {
        name: String,
        #[serde(flatten)]
        attributes: BTreeMap<String, serde_json::Value>,
    },
}

impl EquipmentItem {
    /// The item's name, whichever form it was given in.
    pub fn name(&self) -> &str {
        match self {
            Self::Label(label) => label,
            Self::Structured { name, .. } => name,
        }
    }

    /// Whether this item names `wanted`, ignoring case and surrounding
    /// whitespace.
    pub fn is_named(&self, wanted: &str) -> bool {
        self.name().trim().eq_ignore_ascii_case(wanted.trim())
    }
}

impl From<&str> for EquipmentItem {
    fn from(label: &str) -> Self {
        Self::Label(label.to_string())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from facility inspection transitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FacilityError {
    /// The follow-up inspection is not after the completed one.
    #[error("next inspection ({next}) must be after the completed inspection ({completed})")]
    InspectionOrder { completed: NaiveDate, next: NaiveDate },

    /// An equipment item was supplied with a blank name.
    #[error("equipment name must not be empty")]
    UnnamedEquipment,
}

impl From<FacilityError> for TicError {
    fn from(err: FacilityError) -> Self {
        TicError::Validation(err.to_string())
    }
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Data required to register a facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFacility {
    #[serde(default)]
    pub id: Option<FacilityId>,
    pub facility_type: FacilityType,
    pub facility_name: String,
    pub location: String,
    pub area: f64,
    pub capacity: u32,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub safety_equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub status: FacilityStatus,
    #[serde(default)]
    pub last_inspection: Option<NaiveDate>,
    #[serde(default)]
    pub next_inspection: Option<NaiveDate>,
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacilityUpdate {
    pub facility_type: Option<FacilityType>,
    pub facility_name: Option<String>,
    pub location: Option<String>,
    pub area: Option<f64>,
    pub capacity: Option<u32>,
    pub equipment: Option<Vec<EquipmentItem>>,
    pub safety_equipment: Option<Vec<EquipmentItem>>,
    pub status: Option<FacilityStatus>,
    pub last_inspection: Option<NaiveDate>,
    pub next_inspection: Option<NaiveDate>,
}

fn check_area(errors: &mut ValidationErrors, area: f64) {
    if !area.is_finite() || area <= 0.0 {
        errors.push(format!("area must be a positive number, got {area}"));
    }
}

fn check_capacity(errors: &mut ValidationErrors, capacity: u32) {
    if capacity == 0 {
        errors.push("capacity must be a positive integer");
    }
}

// ─── Facility ────────────────────────────────────────────────────────

/// A physical facility owned by one institution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub institution_id: InstitutionId,
    pub facility_type: FacilityType,
    pub facility_name: String,
    pub location: String,
    /// Floor area in m². Always positive and finite.
    pub area: f64,
    /// Maximum occupancy. Always positive.
    pub capacity: u32,
    #[serde(default)]
    pub equipment: Vec<EquipmentItem>,
    #[serde(default)]
    pub safety_equipment: Vec<EquipmentItem>,
    pub status: FacilityStatus,
    #[serde(default)]
    pub last_inspection: Option<NaiveDate>,
    #[serde(default)]
    pub next_inspection: Option<NaiveDate>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Facility {
    /// Validate `input` and create the facility.
    pub fn new(institution_id: InstitutionId, input: NewFacility, now: Timestamp) -> Result<Self, TicError> {
        let mut errors = ValidationErrors::new();
        errors.require("facility_name", &input.facility_name);
        errors.require("location", &input.location);
        check_area(&mut errors, input.area);
        check_capacity(&mut errors, input.capacity);
        errors.finish()?;

        Ok(Self {
            id: input.id.unwrap_or_default(),
            institution_id,
            facility_type: input.facility_type,
            facility_name: input.facility_name,
            location: input.location,
            area: input.area,
            capacity: input.capacity,
            equipment: input.equipment,
            safety_equipment: input.safety_equipment,
            status: input.status,
            last_inspection: input.last_inspection,
            next_inspection: input.next_inspection,
            created_at: now,
            updated_at: now,
        })
    }

    /// Re-check the field invariants of a facility that did not come
    /// through [`Facility::new`], such as one loaded from a dataset.
    pub fn validate(&self) -> Result<(), TicError> {
        let mut errors = ValidationErrors::new();
        errors.require("facility_name", &self.facility_name);
        errors.require("location", &self.location);
        check_area(&mut errors, self.area);
        check_capacity(&mut errors, self.capacity);
        errors.finish()
    }

    /// Floor area per person in m².
    pub fn area_per_person(&self) -> f64 {
        self.area / f64::from(self.capacity)
    }

    /// Inspection is due when none is scheduled or the scheduled date has
    /// arrived.
    pub fn needs_inspection(&self, now: Timestamp) -> bool {
        match self.next_inspection {
            None => true,
            Some(next) => next <= now.date(),
        }
    }

    /// Whether a safety item named `item` is present.
    pub fn has_safety_equipment(&self, item: &str) -> bool {
        self.safety_equipment.iter().any(|e| e.is_named(item))
    }

    pub fn schedule_inspection(&mut self, date: NaiveDate, now: Timestamp) {
        self.next_inspection = Some(date);
        self.updated_at = now;
    }

    /// Record a completed inspection and the next one. `next` must fall
    /// after `completed`.
    pub fn complete_inspection(
        &mut self,
        completed: NaiveDate,
        next: NaiveDate,
        now: Timestamp,
    ) -> Result<(), FacilityError> {
        if next <= completed {
            return Err(FacilityError::InspectionOrder { completed, next });
        }
        self.last_inspection = Some(completed);
        self.next_inspection = Some(next);
        self.updated_at = now;
        Ok(())
    }

    pub fn add_equipment(&mut self, item: EquipmentItem, now: Timestamp) -> Result<(), FacilityError> {
        if item.name().trim().is_empty() {
            return Err(FacilityError::UnnamedEquipment);
        }
        self.equipment.push(item);
        self.updated_at = now;
        Ok(())
    }

    pub fn add_safety_equipment(&mut self, item: EquipmentItem, now: Timestamp) -> Result<(), FacilityError> {
        if item.name().trim().is_empty() {
            return Err(FacilityError::UnnamedEquipment);
        }
        self.safety_equipment.push(item);
        self.updated_at = now;
        Ok(())
    }

    /// Apply a partial update. Supplied values are validated first; on
    /// error nothing changes.
    pub fn apply_update(&mut self, update: FacilityUpdate, now: Timestamp) -> Result<(), TicError> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &update.facility_name {
            errors.require("facility_name", name);
        }
        if let Some(location) = &update.location {
            errors.require("location", location);
        }
        if let Some(area) = update.area {
            check_area(&mut errors, area);
        }
        if let Some(capacity) = update.capacity {
            check_capacity(&mut errors, capacity);
        }
        errors.finish()?;

        if let Some(v) = update.facility_type {
            self.facility_type = v;
        }
        if let Some(v) = update.facility_name {
            self.facility_name = v;
        }
        if let Some(v) = update.location {
            self.location = v;
        }
        if let Some(v) = update.area {
            self.area = v;
        }
        if let Some(v) = update.capacity {
            self.capacity = v;
        }
        if let Some(v) = update.equipment {
            self.equipment = v;
        }
        if let Some(v) = update.safety_equipment {
            self.safety_equipment = v;
        }
        if let Some(v) = update.status {
            self.status = v;
        }
        if let Some(v) = update.last_inspection {
            self.last_inspection = Some(v);
        }
        if let Some(v) = update.next_inspection {
            self.next_inspection = Some(v);
        }
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> Timestamp {
        Timestamp::parse("2026-05-10T09:00:00Z").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn classroom() -> NewFacility {
        NewFacility {
            id: None,
            facility_type: FacilityType::Classroom,
            facility_name: "Room A101".to_string(),
            location: "Building A, floor 1".to_string(),
            area: 60.0,
            capacity: 30,
            equipment: vec!["projector".into()],
            safety_equipment: vec!["fire extinguisher".into()],
            status: FacilityStatus::InUse,
            last_inspection: None,
            next_inspection: None,
        }
    }

    #[test]
    fn test_new_validates_area_and_capacity() {
        let mut bad = classroom();
        bad.area = 0.0;
        bad.capacity = 0;
        bad.facility_name = String::new();
        let err = Facility::new(InstitutionId::new(), bad, now()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("area must be a positive number"));
        assert!(message.contains("capacity must be a positive integer"));
        assert!(message.contains("facility_name must not be empty"));
    }

    #[test]
    fn test_new_rejects_nan_area() {
        let mut bad = classroom();
        bad.area = f64::NAN;
        assert!(Facility::new(InstitutionId::new(), bad, now()).is_err());
    }

    #[test]
    fn test_validate_requires_location() {
        let mut f = Facility::new(InstitutionId::new(), classroom(), now()).unwrap();
        f.validate().unwrap();
        f.location = "  ".to_string();
        let err = f.validate().unwrap_err();
        assert!(err.to_string().contains("location"));
    }

    #[test]
    fn test_area_per_person() {
        let f = Facility::new(InstitutionId::new(), classroom(), now()).unwrap();
        assert!((f.area_per_person() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_needs_inspection() {
        let mut f = Facility::new(InstitutionId::new(), classroom(), now()).unwrap();
        assert!(f.needs_inspection(now()));
        f.schedule_inspection(now().date(), now());
        assert!(f.needs_inspection(now()));
        f.schedule_inspection(date("2026-06-01"), now());
        assert!(!f.needs_inspection(now()));
    }

    #[test]
    fn test_complete_inspection_requires_order() {
        let mut f = Facility::new(InstitutionId::new(), classroom(), now()).unwrap();
        let err = f
            .complete_inspection(date("2026-05-10"), date("2026-05-10"), now())
            .unwrap_err();
        assert!(matches!(err, FacilityError::InspectionOrder { .. }));
        assert_eq!(f.last_inspection, None);

        f.complete_inspection(date("2026-05-10"), date("2026-11-10"), now())
            .unwrap();
        assert_eq!(f.last_inspection, Some(date("2026-05-10")));
        assert_eq!(f.next_inspection, Some(date("2026-11-10")));
    }

    #[test]
    fn test_equipment_item_forms() {
        let json = r#"["Fire Extinguisher", {"name": "smoke alarm", "count": 4}]"#;
        let items: Vec<EquipmentItem> = serde_json::from_str(json).unwrap();
        assert_eq!(items[0].name(), "Fire Extinguisher");
        assert_eq!(items[1].name(), "smoke alarm");
        assert!(items[0].is_named("fire extinguisher"));
        let EquipmentItem::Structured { attributes, .. } = &items[1] else {
            panic!("expected structured item");
        };
        assert_eq!(attributes.get("count"), Some(&serde_json::json!(4)));
    }

    #[test]
    fn test_add_safety_equipment() {
        let mut f = Facility::new(InstitutionId::new(), classroom(), now()).unwrap();
        assert!(!f.has_safety_equipment("smoke alarm"));
        f.add_safety_equipment("smoke alarm".into(), now()).unwrap();
        assert!(f.has_safety_equipment("Smoke Alarm"));
        assert!(f.add_safety_equipment(" ".into(), now()).is_err());
    }

    #[test]
    fn test_update_is_atomic() {
        let mut f = Facility::new(InstitutionId::new(), classroom(), now()).unwrap();
        let before = f.clone();
        let update = FacilityUpdate {
            facility_name: Some("Room B201".to_string()),
            capacity: Some(0),
            ..Default::default()
        };
        assert!(f.apply_update(update, now()).is_err());
        assert_eq!(f, before);

        let update = FacilityUpdate {
            status: Some(FacilityStatus::UnderMaintenance),
            ..Default::default()
        };
        f.apply_update(update, now()).unwrap();
        assert_eq!(f.status, FacilityStatus::UnderMaintenance);
    }

    #[test]
    fn test_status_serde_format() {
        for status in FacilityStatus::all() {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{status}\""));
            assert_eq!(status.as_str().parse::<FacilityStatus>().unwrap(), *status);
        }
    }
}
