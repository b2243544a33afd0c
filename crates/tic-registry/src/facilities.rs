//! # Facility Services
//!
//! Facility registration and edits, inspection scheduling (single and
//! batch), equipment additions, the inspection worklist and the adequacy
//! report.

use chrono::{Days, NaiveDate};

use tic_core::{FacilityId, InstitutionId, TicError};
use tic_rules::{check_facility_adequacy, FacilityAdequacyReport};
use tic_state::{EquipmentItem, Facility, FacilityUpdate, Institution, NewFacility};

use crate::batch::BatchItemResult;
use crate::registry::Registry;
use crate::stats::FacilityStatistics;

/// Default spacing between inspections scheduled in one batch.
pub const DEFAULT_INSPECTION_INTERVAL_DAYS: u64 = 7;

impl Registry {
    pub fn add_facility(
        &self,
        institution_id: &InstitutionId,
        input: NewFacility,
    ) -> Result<Facility, TicError> {
        let now = self.now();
        let facility = Facility::new(*institution_id, input, now)?;
        let mut state = self.state.write();
        if state.facility_owner.contains_key(&facility.id) {
            return Err(TicError::conflict(format!("facility {} already exists", facility.id)));
        }
        state
            .institution_mut(institution_id)?
            .add_facility(facility.clone())?;
        state.facility_owner.insert(facility.id, *institution_id);
        tracing::info!(
            institution_id = %institution_id,
            facility_id = %facility.id,
            facility_type = %facility.facility_type,
            area = facility.area,
            capacity = facility.capacity,
            "facility added"
        );
        Ok(facility)
    }

    pub fn get_facility(&self, id: &FacilityId) -> Result<Facility, TicError> {
        let state = self.state.read();
        let owner = state.facility_owner(id)?;
        state
            .institution(&owner)?
            .facility(id)
            .cloned()
            .ok_or_else(|| TicError::not_found("facility", id))
    }

    pub fn facilities_of(&self, institution_id: &InstitutionId) -> Result<Vec<Facility>, TicError> {
        let state = self.state.read();
        Ok(state.institution(institution_id)?.facilities().cloned().collect())
    }

    /// Partial update, re-validated; on error nothing changes.
    pub fn update_facility(&self, id: &FacilityId, update: FacilityUpdate) -> Result<Facility, TicError> {
        let now = self.now();
        let f = self.with_facility(id, |f| f.apply_update(update, now))?;
        tracing::info!(facility_id = %id, "facility updated");
        Ok(f)
    }

    pub fn schedule_inspection(&self, id: &FacilityId, date: NaiveDate) -> Result<Facility, TicError> {
        let now = self.now();
        let f = self.with_facility(id, |f| {
            f.schedule_inspection(date, now);
            Ok(())
        })?;
        tracing::info!(facility_id = %id, next_inspection = %date, "inspection scheduled");
        Ok(f)
    }

    /// Record an inspection on `completed` and the next one on `next`,
    /// which must fall after it.
    pub fn complete_inspection(
        &self,
        id: &FacilityId,
        completed: NaiveDate,
        next: NaiveDate,
    ) -> Result<Facility, TicError> {
        let now = self.now();
        let f = self.with_facility(id, |f| {
            f.complete_inspection(completed, next, now)
                .map_err(TicError::from)
        })?;
        tracing::info!(
            facility_id = %id,
            last_inspection = %completed,
            next_inspection = %next,
            "inspection completed"
        );
        Ok(f)
    }

    pub fn add_equipment(&self, id: &FacilityId, item: EquipmentItem) -> Result<Facility, TicError> {
        let now = self.now();
        self.with_facility(id, |f| f.add_equipment(item, now).map_err(TicError::from))
    }

    pub fn add_safety_equipment(&self, id: &FacilityId, item: EquipmentItem) -> Result<Facility, TicError> {
        let now = self.now();
        let f = self.with_facility(id, |f| {
            f.add_safety_equipment(item, now).map_err(TicError::from)
        })?;
        tracing::info!(facility_id = %id, "safety equipment added");
        Ok(f)
    }

    /// Schedule inspections for `ids` in order, starting on `start` and
    /// moving the date on by `interval_days` after each success. A failed
    /// item does not consume a slot.
    pub fn batch_schedule_inspections(
        &self,
        ids: &[FacilityId],
        start: NaiveDate,
        interval_days: u64,
    ) -> Vec<BatchItemResult<FacilityId>> {
        let mut date = Some(start);
        ids.iter()
            .map(|id| {
                let Some(slot) = date else {
                    let err = TicError::validation("inspection date out of range");
                    return BatchItemResult::failed(*id, &err);
                };
                match self.schedule_inspection(id, slot) {
                    Ok(_) => {
                        date = slot.checked_add_days(Days::new(interval_days));
                        BatchItemResult::succeeded(*id, slot.to_string())
                    }
                    Err(e) => {
                        tracing::warn!(facility_id = %id, error = %e, "batch inspection item failed");
                        BatchItemResult::failed(*id, &e)
                    }
                }
            })
            .collect()
    }

    /// Facilities due for inspection: never scheduled first, then by date.
    pub fn facilities_needing_inspection(&self, institution_id: Option<&InstitutionId>) -> Vec<Facility> {
        let now = self.now();
        let state = self.state.read();
        let mut due: Vec<Facility> = state
            .institutions
            .values()
            .filter(|i| institution_id.map_or(true, |id| i.id == *id))
            .flat_map(Institution::facilities)
            .filter(|f| f.needs_inspection(now))
            .cloned()
            .collect();
        // `None` sorts before `Some`, so unscheduled facilities come first.
        due.sort_by_key(|f| (f.next_inspection, f.id));
        due
    }

    /// Per-facility evaluations plus total area and required-type checks.
    pub fn validate_facility_requirements(
        &self,
        institution_id: &InstitutionId,
    ) -> Result<FacilityAdequacyReport, TicError> {
        let state = self.state.read();
        Ok(check_facility_adequacy(state.institution(institution_id)?))
    }

    pub fn facility_statistics(
        &self,
        institution_id: Option<&InstitutionId>,
    ) -> Result<FacilityStatistics, TicError> {
        let now = self.now();
        let state = self.state.read();
        Ok(match institution_id {
            Some(id) => FacilityStatistics::collect(state.institution(id)?.facilities(), now),
            None => FacilityStatistics::collect(
                state.institutions.values().flat_map(Institution::facilities),
                now,
            ),
        })
    }

    fn with_facility(
        &self,
        id: &FacilityId,
        f: impl FnOnce(&mut Facility) -> Result<(), TicError>,
    ) -> Result<Facility, TicError> {
        let mut state = self.state.write();
        let owner = state.facility_owner(id)?;
        let institution = state.institution_mut(&owner)?;
        let mut next = institution
            .facility(id)
            .cloned()
            .ok_or_else(|| TicError::not_found("facility", id))?;
        f(&mut next)?;
        institution.replace_facility(id, next.clone())?;
        Ok(next)
    }
}
