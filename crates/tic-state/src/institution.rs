//! # Institution Aggregate
//!
//! A training-provider organization and the records it owns. The
//! institution holds its qualifications, facilities and change records in
//! id-keyed maps; children are deleted with the parent.
//!
//! Every child carries a back-reference (`institution_id`). `add_*`
//! rejects a child whose back-reference names another institution and a
//! child whose id is already present. `replace_*` swaps in an edited copy
//! and refuses one whose id or back-reference changed. There is no
//! per-child removal. Uniqueness that spans institutions
//! (code, registration number, certificate number) is the registry's job.
//!
//! On the wire, child collections are plain lists; they are keyed by id
//! when loaded, and duplicate ids are a deserialization error.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use tic_core::{
    ChangeRecordId, FacilityId, InstitutionId, QualificationId, TicError, Timestamp,
    ValidationErrors,
};

use crate::change_record::ChangeRecord;
use crate::facility::Facility;
use crate::qualification::Qualification;

// ─── Institution Status ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstitutionStatus {
    #[default]
    PendingReview,
    Operating,
    Suspended,
    Deregistered,
}

impl InstitutionStatus {
    pub fn all() -> &'static [InstitutionStatus] {
        &[
            Self::PendingReview,
            Self::Operating,
            Self::Suspended,
            Self::Deregistered,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PendingReview => "pending-review",
            Self::Operating => "operating",
            Self::Suspended => "suspended",
            Self::Deregistered => "deregistered",
        }
    }
}

impl std::fmt::Display for InstitutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for InstitutionStatus {
    type Err = TicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| TicError::Validation(format!("unknown institution status: {s:?}")))
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from attaching children to an institution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstitutionError {
    /// A child with this id is already attached.
    #[error("{kind} {id} already exists")]
    DuplicateChild { kind: &'static str, id: String },

    /// The child's back-reference names a different institution.
    #[error("{kind} {id} belongs to {owner}, not {institution}")]
    ForeignChild {
        kind: &'static str,
        id: String,
        owner: InstitutionId,
        institution: InstitutionId,
    },

    /// No child with this id is attached.
    #[error("{kind} {id} is not attached")]
    MissingChild { kind: &'static str, id: String },

    /// A replacement changed the child's id or back-reference.
    #[error("{kind} {id} cannot change its id or owner")]
    IdentityChanged { kind: &'static str, id: String },
}

impl From<InstitutionError> for TicError {
    fn from(err: InstitutionError) -> Self {
        match err {
            InstitutionError::DuplicateChild { .. } => TicError::Conflict(err.to_string()),
            InstitutionError::ForeignChild { .. } | InstitutionError::IdentityChanged { .. } => {
                TicError::Validation(err.to_string())
            }
            InstitutionError::MissingChild { kind, id } => TicError::NotFound { kind, id },
        }
    }
}

// ─── Contact ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub person: String,
    pub phone: String,
    pub email: String,
}

/// `local@domain.tld` shape check: one `@`, non-empty local part, a dot
/// inside the domain, no whitespace.
pub fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

// ─── Inputs ──────────────────────────────────────────────────────────

/// Data required to register an institution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewInstitution {
    #[serde(default)]
    pub id: Option<InstitutionId>,
    pub name: String,
    pub code: String,
    pub institution_type: String,
    pub legal_representative: String,
    pub contact: ContactInfo,
    pub address: String,
    pub business_scope: String,
    pub established_on: NaiveDate,
    pub registration_number: String,
    #[serde(default)]
    pub status: InstitutionStatus,
    #[serde(default)]
    pub organization_structure: Value,
}

/// Partial update of the basic-information fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstitutionUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub institution_type: Option<String>,
    pub legal_representative: Option<String>,
    pub contact_person: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub business_scope: Option<String>,
}

// ─── Institution ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Institution {
    pub id: InstitutionId,
    pub name: String,
    pub code: String,
    pub institution_type: String,
    pub legal_representative: String,
    pub contact: ContactInfo,
    pub address: String,
    pub business_scope: String,
    pub established_on: NaiveDate,
    pub registration_number: String,
    pub status: InstitutionStatus,
    #[serde(default)]
    pub organization_structure: Value,
    #[serde(default, with = "child_list")]
    qualifications: BTreeMap<QualificationId, Qualification>,
    #[serde(default, with = "child_list")]
    facilities: BTreeMap<FacilityId, Facility>,
    #[serde(default, with = "child_list")]
    change_records: BTreeMap<ChangeRecordId, ChangeRecord>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Institution {
    /// Validate `input` and create an institution with no children.
    pub fn new(input: NewInstitution, now: Timestamp) -> Result<Self, TicError> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &input.name);
        errors.require("code", &input.code);
        errors.require("institution_type", &input.institution_type);
        errors.require("legal_representative", &input.legal_representative);
        errors.require("contact.person", &input.contact.person);
        errors.require("contact.phone", &input.contact.phone);
        errors.require("contact.email", &input.contact.email);
        errors.require("address", &input.address);
        errors.require("business_scope", &input.business_scope);
        errors.require("registration_number", &input.registration_number);
        if !input.contact.email.trim().is_empty() && !is_plausible_email(&input.contact.email) {
            errors.push(format!("contact.email is not a valid address: {:?}", input.contact.email));
        }
        errors.finish()?;

        Ok(Self {
            id: input.id.unwrap_or_default(),
            name: input.name,
            code: input.code,
            institution_type: input.institution_type,
            legal_representative: input.legal_representative,
            contact: input.contact,
            address: input.address,
            business_scope: input.business_scope,
            established_on: input.established_on,
            registration_number: input.registration_number,
            status: input.status,
            organization_structure: input.organization_structure,
            qualifications: BTreeMap::new(),
            facilities: BTreeMap::new(),
            change_records: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Snapshot of the basic-information fields, used as the before/after
    /// payload of a "basic-info" change record.
    pub fn basic_info_snapshot(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".into(), Value::from(self.name.clone()));
        map.insert("code".into(), Value::from(self.code.clone()));
        map.insert("institution_type".into(), Value::from(self.institution_type.clone()));
        map.insert(
            "legal_representative".into(),
            Value::from(self.legal_representative.clone()),
        );
        map.insert("contact_person".into(), Value::from(self.contact.person.clone()));
        map.insert("contact_phone".into(), Value::from(self.contact.phone.clone()));
        map.insert("contact_email".into(), Value::from(self.contact.email.clone()));
        map.insert("address".into(), Value::from(self.address.clone()));
        map.insert("business_scope".into(), Value::from(self.business_scope.clone()));
        map
    }

    /// Apply a partial basic-information update. Supplied values must be
    /// non-blank and the email well-formed; on error nothing changes.
    pub fn apply_update(&mut self, update: InstitutionUpdate, now: Timestamp) -> Result<(), TicError> {
        let mut errors = ValidationErrors::new();
        let text_fields = [
            ("name", &update.name),
            ("code", &update.code),
            ("institution_type", &update.institution_type),
            ("legal_representative", &update.legal_representative),
            ("contact.person", &update.contact_person),
            ("contact.phone", &update.contact_phone),
            ("contact.email", &update.contact_email),
            ("address", &update.address),
            ("business_scope", &update.business_scope),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                errors.require(field, value);
            }
        }
        if let Some(email) = &update.contact_email {
            if !email.trim().is_empty() && !is_plausible_email(email) {
                errors.push(format!("contact.email is not a valid address: {email:?}"));
            }
        }
        errors.finish()?;

        if let Some(v) = update.name {
            self.name = v;
        }
        if let Some(v) = update.code {
            self.code = v;
        }
        if let Some(v) = update.institution_type {
            self.institution_type = v;
        }
        if let Some(v) = update.legal_representative {
            self.legal_representative = v;
        }
        if let Some(v) = update.contact_person {
            self.contact.person = v;
        }
        if let Some(v) = update.contact_phone {
            self.contact.phone = v;
        }
        if let Some(v) = update.contact_email {
            self.contact.email = v;
        }
        if let Some(v) = update.address {
            self.address = v;
        }
        if let Some(v) = update.business_scope {
            self.business_scope = v;
        }
        self.updated_at = now;
        Ok(())
    }

    /// Set the status, returning the previous one.
    pub fn set_status(&mut self, status: InstitutionStatus, now: Timestamp) -> InstitutionStatus {
        let previous = self.status;
        self.status = status;
        self.updated_at = now;
        previous
    }

    /// Check a loaded institution: every child must point back here and
    /// every facility must satisfy its field invariants.
    pub fn validate(&self) -> Result<(), TicError> {
        for q in self.qualifications.values() {
            self.check_owner("qualification", q.id, q.institution_id)?;
        }
        for f in self.facilities.values() {
            self.check_owner("facility", f.id, f.institution_id)?;
            f.validate()?;
        }
        for r in self.change_records.values() {
            self.check_owner("change record", r.id, r.institution_id)?;
        }
        Ok(())
    }

    // ── Qualifications ───────────────────────────────────────────────

    pub fn qualifications(&self) -> impl Iterator<Item = &Qualification> {
        self.qualifications.values()
    }

    pub fn qualification(&self, id: &QualificationId) -> Option<&Qualification> {
        self.qualifications.get(id)
    }

    /// Swap in an edited copy of qualification `id`. Its id and back-reference
    /// must be unchanged.
    pub fn replace_qualification(
        &mut self,
        id: &QualificationId,
        next: Qualification,
    ) -> Result<(), InstitutionError> {
        replace_child(self.id, "qualification", &mut self.qualifications, id, next)
    }

    pub fn add_qualification(&mut self, qualification: Qualification) -> Result<(), InstitutionError> {
        self.check_owner("qualification", qualification.id, qualification.institution_id)?;
        if self.qualifications.contains_key(&qualification.id) {
            return Err(duplicate("qualification", qualification.id));
        }
        self.qualifications.insert(qualification.id, qualification);
        Ok(())
    }

    /// Whether at least one qualification is valid at `now`.
    pub fn has_valid_qualification(&self, now: Timestamp) -> bool {
        self.qualifications.values().any(|q| q.is_valid(now))
    }

    // ── Facilities ───────────────────────────────────────────────────

    pub fn facilities(&self) -> impl Iterator<Item = &Facility> {
        self.facilities.values()
    }

    pub fn facility(&self, id: &FacilityId) -> Option<&Facility> {
        self.facilities.get(id)
    }

    /// Swap in an edited copy of facility `id`. Its id and back-reference
    /// must be unchanged.
    pub fn replace_facility(
        &mut self,
        id: &FacilityId,
        next: Facility,
    ) -> Result<(), InstitutionError> {
        replace_child(self.id, "facility", &mut self.facilities, id, next)
    }

    pub fn add_facility(&mut self, facility: Facility) -> Result<(), InstitutionError> {
        self.check_owner("facility", facility.id, facility.institution_id)?;
        if self.facilities.contains_key(&facility.id) {
            return Err(duplicate("facility", facility.id));
        }
        self.facilities.insert(facility.id, facility);
        Ok(())
    }

    /// Sum of facility floor areas in m².
    pub fn total_facility_area(&self) -> f64 {
        self.facilities.values().map(|f| f.area).sum()
    }

    // ── Change records ───────────────────────────────────────────────

    pub fn change_records(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.change_records.values()
    }

    pub fn change_record(&self, id: &ChangeRecordId) -> Option<&ChangeRecord> {
        self.change_records.get(id)
    }

    /// Swap in an edited copy of change record `id`. Its id and back-reference
    /// must be unchanged.
    pub fn replace_change_record(
        &mut self,
        id: &ChangeRecordId,
        next: ChangeRecord,
    ) -> Result<(), InstitutionError> {
        replace_child(self.id, "change record", &mut self.change_records, id, next)
    }

    pub fn add_change_record(&mut self, record: ChangeRecord) -> Result<(), InstitutionError> {
        self.check_owner("change record", record.id, record.institution_id)?;
        if self.change_records.contains_key(&record.id) {
            return Err(duplicate("change record", record.id));
        }
        self.change_records.insert(record.id, record);
        Ok(())
    }

    fn check_owner(
        &self,
        kind: &'static str,
        id: impl ToString,
        owner: InstitutionId,
    ) -> Result<(), InstitutionError> {
        if owner != self.id {
            return Err(InstitutionError::ForeignChild {
                kind,
                id: id.to_string(),
                owner,
                institution: self.id,
            });
        }
        Ok(())
    }
}

fn replace_child<T: Keyed>(
    institution: InstitutionId,
    kind: &'static str,
    children: &mut BTreeMap<T::Key, T>,
    id: &T::Key,
    next: T,
) -> Result<(), InstitutionError> {
    if next.key() != *id || next.owner() != institution {
        return Err(InstitutionError::IdentityChanged {
            kind,
            id: id.to_string(),
        });
    }
    match children.get_mut(id) {
        Some(slot) => {
            *slot = next;
            Ok(())
        }
        None => Err(InstitutionError::MissingChild {
            kind,
            id: id.to_string(),
        }),
    }
}

fn duplicate(kind: &'static str, id: impl ToString) -> InstitutionError {
    InstitutionError::DuplicateChild {
        kind,
        id: id.to_string(),
    }
}

// ─── Child list (de)serialization ────────────────────────────────────

/// Records stored in an id-keyed child map.
pub trait Keyed {
    type Key: Ord + Copy + std::fmt::Display;
    fn key(&self) -> Self::Key;
    fn owner(&self) -> InstitutionId;
}

impl Keyed for Qualification {
    type Key = QualificationId;
    fn key(&self) -> QualificationId {
        self.id
    }
    fn owner(&self) -> InstitutionId {
        self.institution_id
    }
}

impl Keyed for Facility {
    type Key = FacilityId;
    fn key(&self) -> FacilityId {
        self.id
    }
    fn owner(&self) -> InstitutionId {
        self.institution_id
    }
}

impl Keyed for ChangeRecord {
    type Key = ChangeRecordId;
    fn key(&self) -> ChangeRecordId {
        self.id
    }
    fn owner(&self) -> InstitutionId {
        self.institution_id
    }
}

mod child_list {
    use std::collections::BTreeMap;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Keyed;

    pub fn serialize<S, T>(map: &BTreeMap<T::Key, T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Keyed + Serialize,
    {
        serializer.collect_seq(map.values())
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<BTreeMap<T::Key, T>, D::Error>
    where
        D: Deserializer<'de>,
        T: Keyed + Deserialize<'de>,
    {
        let items = Vec::<T>::deserialize(deserializer)?;
        let mut map = BTreeMap::new();
        for item in items {
            let key = item.key();
            if map.insert(key, item).is_some() {
                return Err(D::Error::custom(format!("duplicate id {key}")));
            }
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::{FacilityStatus, NewFacility};
    use crate::qualification::NewQualification;
    use tic_core::{ErrorKind, FacilityType};

    fn now() -> Timestamp {
        Timestamp::parse("2026-05-10T09:00:00Z").unwrap()
    }

    fn new_institution() -> NewInstitution {
        NewInstitution {
            id: None,
            name: "Harbor Safety Academy".to_string(),
            code: "HSA-001".to_string(),
            institution_type: "vocational".to_string(),
            legal_representative: "Lin Wei".to_string(),
            contact: ContactInfo {
                person: "Zhao Min".to_string(),
                phone: "13800138000".to_string(),
                email: "office@harbor-safety.example".to_string(),
            },
            address: "12 Harbor Road".to_string(),
            business_scope: "work safety training".to_string(),
            established_on: NaiveDate::from_ymd_opt(2015, 3, 1).unwrap(),
            registration_number: "REG-2015-0042".to_string(),
            status: InstitutionStatus::Operating,
            organization_structure: serde_json::json!({"departments": ["teaching", "admin"]}),
        }
    }

    fn facility_for(inst: &Institution) -> Facility {
        Facility::new(
            inst.id,
            NewFacility {
                id: None,
                facility_type: FacilityType::TrainingArea,
                facility_name: "Yard 1".to_string(),
                location: "north yard".to_string(),
                area: 150.0,
                capacity: 40,
                equipment: vec![],
                safety_equipment: vec![],
                status: FacilityStatus::InUse,
                last_inspection: None,
                next_inspection: None,
            },
            now(),
        )
        .unwrap()
    }

    fn qualification_for(inst: &Institution) -> Qualification {
        Qualification::new(
            inst.id,
            NewQualification {
                id: None,
                qualification_type: "safety-training".to_string(),
                qualification_name: "Work Safety Training License".to_string(),
                certificate_number: "WS-1".to_string(),
                issuing_authority: "Bureau".to_string(),
                issue_date: now().date(),
                valid_from: now().plus_days(-1),
                valid_to: now().plus_days(365),
                scope: Default::default(),
                attachments: vec![],
            },
            now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_fields_and_email_shape() {
        let mut input = new_institution();
        input.name = String::new();
        input.contact.email = "not-an-email".to_string();
        let err = Institution::new(input, now()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("name must not be empty"));
        assert!(message.contains("contact.email is not a valid address"));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_plausible_email("a@b.cn"));
        assert!(!is_plausible_email("a@b"));
        assert!(!is_plausible_email("@b.cn"));
        assert!(!is_plausible_email("a b@c.cn"));
        assert!(!is_plausible_email("a@b@c.cn"));
        assert!(!is_plausible_email("a@.cn"));
    }

    #[test]
    fn test_add_child_rejects_duplicate_and_foreign() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        let f = facility_for(&inst);
        inst.add_facility(f.clone()).unwrap();
        let err = inst.add_facility(f).unwrap_err();
        assert_eq!(TicError::from(err).kind(), ErrorKind::Conflict);

        let other = Institution::new(new_institution(), now()).unwrap();
        let foreign = facility_for(&other);
        let err = inst.add_facility(foreign).unwrap_err();
        assert!(matches!(err, InstitutionError::ForeignChild { .. }));
        assert_eq!(inst.facilities().count(), 1);
    }

    #[test]
    fn test_replace_child_keeps_identity() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        let f = facility_for(&inst);
        let id = f.id;
        inst.add_facility(f.clone()).unwrap();

        let mut renamed = f.clone();
        renamed.facility_name = "Yard 2".to_string();
        inst.replace_facility(&id, renamed).unwrap();
        assert_eq!(inst.facility(&id).unwrap().facility_name, "Yard 2");

        let mut rekeyed = f.clone();
        rekeyed.id = FacilityId::new();
        let err = inst.replace_facility(&id, rekeyed).unwrap_err();
        assert!(matches!(err, InstitutionError::IdentityChanged { .. }));
        assert_eq!(TicError::from(err).kind(), ErrorKind::Validation);

        let mut moved = f.clone();
        moved.institution_id = InstitutionId::new();
        let err = inst.replace_facility(&id, moved).unwrap_err();
        assert!(matches!(err, InstitutionError::IdentityChanged { .. }));

        let stray = facility_for(&inst);
        let err = inst.replace_facility(&stray.id, stray.clone()).unwrap_err();
        assert_eq!(TicError::from(err).kind(), ErrorKind::NotFound);

        assert_eq!(inst.facilities().count(), 1);
        assert_eq!(inst.facility(&id).unwrap().id, id);
        inst.validate().unwrap();
    }

    #[test]
    fn test_valid_qualification_and_area() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        assert!(!inst.has_valid_qualification(now()));
        inst.add_qualification(qualification_for(&inst)).unwrap();
        inst.add_facility(facility_for(&inst)).unwrap();
        inst.add_facility(facility_for(&inst)).unwrap();
        assert!(inst.has_valid_qualification(now()));
        assert!((inst.total_facility_area() - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_and_snapshot() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        let before = inst.basic_info_snapshot();
        let update = InstitutionUpdate {
            address: Some("88 River Street".to_string()),
            ..Default::default()
        };
        inst.apply_update(update, now()).unwrap();
        let after = inst.basic_info_snapshot();
        assert_ne!(before, after);
        assert_eq!(after["address"], "88 River Street");

        let bad = InstitutionUpdate {
            contact_email: Some("broken".to_string()),
            name: Some("New Name".to_string()),
            ..Default::default()
        };
        assert!(inst.apply_update(bad, now()).is_err());
        assert_eq!(inst.name, "Harbor Safety Academy");
    }

    #[test]
    fn test_set_status_returns_previous() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        let previous = inst.set_status(InstitutionStatus::Suspended, now());
        assert_eq!(previous, InstitutionStatus::Operating);
        assert_eq!(inst.status, InstitutionStatus::Suspended);
    }

    #[test]
    fn test_children_serialize_as_lists() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        inst.add_facility(facility_for(&inst)).unwrap();
        let value = serde_json::to_value(&inst).unwrap();
        assert!(value["facilities"].is_array());
        assert_eq!(value["facilities"].as_array().unwrap().len(), 1);
        let parsed: Institution = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, inst);
        parsed.validate().unwrap();
    }

    #[test]
    fn test_duplicate_child_ids_rejected_on_load() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        inst.add_facility(facility_for(&inst)).unwrap();
        let mut value = serde_json::to_value(&inst).unwrap();
        let first = value["facilities"][0].clone();
        value["facilities"].as_array_mut().unwrap().push(first);
        assert!(serde_json::from_value::<Institution>(value).is_err());
    }

    #[test]
    fn test_validate_catches_foreign_back_reference() {
        let mut inst = Institution::new(new_institution(), now()).unwrap();
        inst.add_facility(facility_for(&inst)).unwrap();
        let mut value = serde_json::to_value(&inst).unwrap();
        value["facilities"][0]["institution_id"] =
            serde_json::to_value(InstitutionId::new()).unwrap();
        let parsed: Institution = serde_json::from_value(value).unwrap();
        assert!(parsed.validate().is_err());
    }
}
