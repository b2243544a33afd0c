//! # Institution Services
//!
//! Create, update, status change, lookup, search, compliance checks and
//! statistics over institution aggregates.
//!
//! Basic-information updates and status changes leave an audit trail: each
//! one appends a pending change record with before and after snapshots.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use tic_core::{InstitutionId, TicError};
use tic_rules::{check_institution_compliance, ComplianceVerdict};
use tic_state::{
    ChangeRecord, Institution, InstitutionStatus, InstitutionUpdate, NewChangeRecord,
    NewInstitution,
};

use crate::registry::Registry;
use crate::stats::InstitutionStatistics;

/// Change type of audit entries for basic-information updates.
pub const BASIC_INFO_CHANGE: &str = "basic-info";
/// Change type of audit entries for status changes.
pub const STATUS_CHANGE: &str = "status";
/// Operator recorded when none is supplied.
pub const SYSTEM_OPERATOR: &str = "system";

/// Who made a change and why, stamped onto the audit entry it produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribution {
    pub operator: String,
    pub reason: String,
}

impl Attribution {
    pub fn new(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    /// Attributed to the system operator.
    pub fn system(reason: impl Into<String>) -> Self {
        Self::new(SYSTEM_OPERATOR, reason)
    }
}

impl Default for Attribution {
    fn default() -> Self {
        Self::system("system update")
    }
}

/// Field searched by [`Registry::search_institutions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchField {
    Name,
    Address,
}

impl Registry {
    /// Register a new institution. Code and registration number must not
    /// be in use by any other institution.
    pub fn create_institution(&self, input: NewInstitution) -> Result<Institution, TicError> {
        let now = self.now();
        let institution = Institution::new(input, now)?;
        let mut state = self.state.write();
        state.check_institution_unique(&institution, None)?;
        state.insert(institution.clone())?;
        tracing::info!(
            institution_id = %institution.id,
            code = %institution.code,
            status = %institution.status,
            "institution created"
        );
        Ok(institution)
    }

    /// Apply a partial basic-information update.
    ///
    /// The code is re-checked for uniqueness excluding this institution.
    /// When any basic field actually changed, a `basic-info` change record
    /// with the before and after snapshots is appended. Either the update
    /// and its audit entry are both stored or neither is.
    pub fn update_institution(
        &self,
        id: &InstitutionId,
        update: InstitutionUpdate,
        attribution: Attribution,
    ) -> Result<Institution, TicError> {
        let now = self.now();
        let mut state = self.state.write();
        let mut next = state.institution(id)?.clone();
        let before = next.basic_info_snapshot();
        next.apply_update(update, now)?;
        state.check_institution_unique(&next, Some(*id))?;

        let after = next.basic_info_snapshot();
        let mut audit = None;
        if before != after {
            let changed: Vec<&str> = after
                .iter()
                .filter(|(field, value)| before.get(*field) != Some(*value))
                .map(|(field, _)| field.as_str())
                .collect();
            let mut details = Map::new();
            details.insert(
                "summary".into(),
                Value::from(format!("updated {}", changed.join(", "))),
            );
            let record = ChangeRecord::new(
                next.id,
                NewChangeRecord {
                    id: None,
                    change_type: BASIC_INFO_CHANGE.to_string(),
                    change_details: details,
                    before,
                    after,
                    reason: attribution.reason,
                    operator: attribution.operator,
                    approval: None,
                },
                now,
            )?;
            next.add_change_record(record.clone())?;
            audit = Some(record.id);
        }

        let institution = state.institution_mut(id)?;
        *institution = next.clone();
        if let Some(record_id) = audit {
            state.change_owner.insert(record_id, *id);
        }
        tracing::info!(
            institution_id = %id,
            change_record_id = ?audit.map(|r| r.to_string()),
            "institution updated"
        );
        Ok(next)
    }

    /// Move the institution to `status`, recording a `status` change record
    /// with the old and new values. Returns the updated institution.
    pub fn change_institution_status(
        &self,
        id: &InstitutionId,
        status: InstitutionStatus,
        reason: &str,
    ) -> Result<Institution, TicError> {
        let now = self.now();
        let mut state = self.state.write();
        let mut next = state.institution(id)?.clone();
        let previous = next.set_status(status, now);

        let status_map = |s: InstitutionStatus| {
            let mut map = Map::new();
            map.insert("status".into(), Value::from(s.as_str()));
            map
        };
        let mut details = Map::new();
        details.insert(
            "summary".into(),
            Value::from(format!("status changed from {previous} to {status}")),
        );
        let record = ChangeRecord::new(
            next.id,
            NewChangeRecord {
                id: None,
                change_type: STATUS_CHANGE.to_string(),
                change_details: details,
                before: status_map(previous),
                after: status_map(status),
                reason: reason.to_string(),
                operator: SYSTEM_OPERATOR.to_string(),
                approval: None,
            },
            now,
        )?;
        let record_id = record.id;
        next.add_change_record(record)?;

        *state.institution_mut(id)? = next.clone();
        state.change_owner.insert(record_id, *id);
        tracing::info!(
            institution_id = %id,
            from = %previous,
            to = %status,
            change_record_id = %record_id,
            "institution status changed"
        );
        Ok(next)
    }

    pub fn get_institution(&self, id: &InstitutionId) -> Result<Institution, TicError> {
        self.state.read().institution(id).cloned()
    }

    pub fn list_institutions(&self) -> Vec<Institution> {
        self.snapshot()
    }

    pub fn institutions_by_status(&self, status: InstitutionStatus) -> Vec<Institution> {
        self.state
            .read()
            .institutions
            .values()
            .filter(|i| i.status == status)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring search on name or address.
    pub fn search_institutions(&self, field: SearchField, term: &str) -> Vec<Institution> {
        let needle = term.trim().to_lowercase();
        self.state
            .read()
            .institutions
            .values()
            .filter(|i| {
                let haystack = match field {
                    SearchField::Name => &i.name,
                    SearchField::Address => &i.address,
                };
                haystack.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect()
    }

    /// Compliance verdict for one institution at the registry's current
    /// instant.
    pub fn check_compliance(&self, id: &InstitutionId) -> Result<ComplianceVerdict, TicError> {
        let now = self.now();
        let state = self.state.read();
        Ok(check_institution_compliance(state.institution(id)?, now))
    }

    /// Verdicts for every institution, optionally only those in `status`.
    pub fn check_all_compliance(&self, status: Option<InstitutionStatus>) -> Vec<ComplianceVerdict> {
        let now = self.now();
        self.state
            .read()
            .institutions
            .values()
            .filter(|i| status.map_or(true, |s| i.status == s))
            .map(|i| check_institution_compliance(i, now))
            .collect()
    }

    pub fn institution_statistics(&self) -> InstitutionStatistics {
        InstitutionStatistics::collect(self.state.read().institutions.values())
    }

    /// Remove an institution together with every child it owns.
    pub fn remove_institution(&self, id: &InstitutionId) -> Result<Institution, TicError> {
        let removed = self.state.write().remove(id)?;
        tracing::info!(
            institution_id = %id,
            qualifications = removed.qualifications().count(),
            facilities = removed.facilities().count(),
            change_records = removed.change_records().count(),
            "institution removed"
        );
        Ok(removed)
    }
}
