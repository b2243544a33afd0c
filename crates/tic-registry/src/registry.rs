//! # Registry Core
//!
//! Thread-safe, cloneable in-memory store of institution aggregates.
//!
//! All state sits behind one `parking_lot::RwLock`. Every operation that
//! reads, validates and then writes (uniqueness checks, approval
//! compare-and-set, renewal) holds the write guard for its whole duration,
//! so concurrent callers observe each operation as a single step.
//! `parking_lot` locks do not poison, so a panicking writer does not
//! wedge the registry.
//!
//! Children are owned by their institution. Owner indexes map each child
//! id back to its institution so lookups by child id stay O(log n).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use parking_lot::RwLock;

use tic_core::{
    ChangeRecordId, Clock, FacilityId, InstitutionId, QualificationId, SystemClock, TicError,
    Timestamp,
};
use tic_state::Institution;

/// Shared handle to the registry. Clones share the same state.
#[derive(Clone)]
pub struct Registry {
    pub(crate) state: Arc<RwLock<RegistryState>>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("institutions", &self.state.read().institutions.len())
            .field("now", &self.clock.now())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl Registry {
    /// An empty registry reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(RwLock::new(RegistryState::default())),
            clock,
        }
    }

    /// Hydrate a registry from previously persisted institutions.
    ///
    /// Each institution is validated (child back-references, facility
    /// invariants) and the cross-institution uniqueness rules are checked:
    /// institution id, code, registration number, certificate number and
    /// every child id.
    pub fn from_institutions(
        institutions: Vec<Institution>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TicError> {
        let mut state = RegistryState::default();
        let mut certificates = BTreeSet::new();
        for institution in institutions {
            institution.validate()?;
            state.check_institution_unique(&institution, None)?;
            for q in institution.qualifications() {
                if !certificates.insert(q.certificate_number.clone()) {
                    return Err(TicError::conflict(format!(
                        "certificate number {:?} is used by more than one qualification",
                        q.certificate_number
                    )));
                }
            }
            state.insert(institution)?;
        }
        tracing::info!(
            institutions = state.institutions.len(),
            qualifications = state.qualification_owner.len(),
            facilities = state.facility_owner.len(),
            change_records = state.change_owner.len(),
            "registry hydrated"
        );
        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            clock,
        })
    }

    /// The current instant according to the injected clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Every institution with its children, ordered by id.
    pub fn snapshot(&self) -> Vec<Institution> {
        self.state.read().institutions.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.state.read().institutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ─── State ───────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub(crate) struct RegistryState {
    pub(crate) institutions: BTreeMap<InstitutionId, Institution>,
    pub(crate) qualification_owner: BTreeMap<QualificationId, InstitutionId>,
    pub(crate) facility_owner: BTreeMap<FacilityId, InstitutionId>,
    pub(crate) change_owner: BTreeMap<ChangeRecordId, InstitutionId>,
}

impl RegistryState {
    pub(crate) fn institution(&self, id: &InstitutionId) -> Result<&Institution, TicError> {
        self.institutions
            .get(id)
            .ok_or_else(|| TicError::not_found("institution", id))
    }

    pub(crate) fn institution_mut(
        &mut self,
        id: &InstitutionId,
    ) -> Result<&mut Institution, TicError> {
        self.institutions
            .get_mut(id)
            .ok_or_else(|| TicError::not_found("institution", id))
    }

    pub(crate) fn qualification_owner(&self, id: &QualificationId) -> Result<InstitutionId, TicError> {
        self.qualification_owner
            .get(id)
            .copied()
            .ok_or_else(|| TicError::not_found("qualification", id))
    }

    pub(crate) fn facility_owner(&self, id: &FacilityId) -> Result<InstitutionId, TicError> {
        self.facility_owner
            .get(id)
            .copied()
            .ok_or_else(|| TicError::not_found("facility", id))
    }

    pub(crate) fn change_owner(&self, id: &ChangeRecordId) -> Result<InstitutionId, TicError> {
        self.change_owner
            .get(id)
            .copied()
            .ok_or_else(|| TicError::not_found("change record", id))
    }

    /// Code and registration number must be unique among institutions.
    /// `except` excludes the institution being updated.
    pub(crate) fn check_institution_unique(
        &self,
        candidate: &Institution,
        except: Option<InstitutionId>,
    ) -> Result<(), TicError> {
        if except.is_none() && self.institutions.contains_key(&candidate.id) {
            return Err(TicError::conflict(format!(
                "institution {} already exists",
                candidate.id
            )));
        }
        for other in self.institutions.values() {
            if Some(other.id) == except {
                continue;
            }
            if other.code == candidate.code {
                return Err(TicError::conflict(format!(
                    "institution code {:?} is already in use",
                    candidate.code
                )));
            }
            if other.registration_number == candidate.registration_number {
                return Err(TicError::conflict(format!(
                    "registration number {:?} is already in use",
                    candidate.registration_number
                )));
            }
        }
        Ok(())
    }

    /// Whether any qualification other than `except` carries `number`.
    pub(crate) fn certificate_in_use(&self, number: &str, except: Option<QualificationId>) -> bool {
        self.institutions
            .values()
            .flat_map(Institution::qualifications)
            .any(|q| q.certificate_number == number && Some(q.id) != except)
    }

    /// Insert an institution and index its children. Child ids already
    /// owned by another institution are a conflict; nothing is inserted.
    pub(crate) fn insert(&mut self, institution: Institution) -> Result<(), TicError> {
        let owner = institution.id;
        for q in institution.qualifications() {
            if self.qualification_owner.contains_key(&q.id) {
                return Err(TicError::conflict(format!("qualification {} already exists", q.id)));
            }
        }
        for f in institution.facilities() {
            if self.facility_owner.contains_key(&f.id) {
                return Err(TicError::conflict(format!("facility {} already exists", f.id)));
            }
        }
        for r in institution.change_records() {
            if self.change_owner.contains_key(&r.id) {
                return Err(TicError::conflict(format!("change record {} already exists", r.id)));
            }
        }

        self.qualification_owner
            .extend(institution.qualifications().map(|q| (q.id, owner)));
        self.facility_owner
            .extend(institution.facilities().map(|f| (f.id, owner)));
        self.change_owner
            .extend(institution.change_records().map(|r| (r.id, owner)));
        self.institutions.insert(owner, institution);
        Ok(())
    }

    /// Remove an institution and drop its children from the indexes.
    pub(crate) fn remove(&mut self, id: &InstitutionId) -> Result<Institution, TicError> {
        let institution = self
            .institutions
            .remove(id)
            .ok_or_else(|| TicError::not_found("institution", id))?;
        for q in institution.qualifications() {
            self.qualification_owner.remove(&q.id);
        }
        for f in institution.facilities() {
            self.facility_owner.remove(&f.id);
        }
        for r in institution.change_records() {
            self.change_owner.remove(&r.id);
        }
        Ok(institution)
    }
}
