//! # Change-Record Services
//!
//! Recording, the approval workflow and the audit queries.
//!
//! `approve_change` and `reject_change` hold the write guard across the
//! pending check and the decision, so of two concurrent decisions on the
//! same record exactly one succeeds; the other gets a conflict and the
//! first decision stands.

use tic_core::{ChangeRecordId, InstitutionId, TicError, Timestamp};
use tic_state::{ApprovalStatus, ChangeRecord, Institution, NewChangeRecord};

use crate::batch::BatchItemResult;
use crate::registry::Registry;
use crate::stats::ChangeStatistics;

impl Registry {
    pub fn record_change(
        &self,
        institution_id: &InstitutionId,
        input: NewChangeRecord,
    ) -> Result<ChangeRecord, TicError> {
        let now = self.now();
        let record = ChangeRecord::new(*institution_id, input, now)?;
        let mut state = self.state.write();
        if state.change_owner.contains_key(&record.id) {
            return Err(TicError::conflict(format!("change record {} already exists", record.id)));
        }
        state
            .institution_mut(institution_id)?
            .add_change_record(record.clone())?;
        state.change_owner.insert(record.id, *institution_id);
        tracing::info!(
            institution_id = %institution_id,
            change_record_id = %record.id,
            change_type = %record.change_type,
            operator = %record.operator,
            status = %record.status(),
            "change recorded"
        );
        Ok(record)
    }

    pub fn get_change(&self, id: &ChangeRecordId) -> Result<ChangeRecord, TicError> {
        let state = self.state.read();
        let owner = state.change_owner(id)?;
        state
            .institution(&owner)?
            .change_record(id)
            .cloned()
            .ok_or_else(|| TicError::not_found("change record", id))
    }

    /// Pending → approved. Fails with a conflict once the record is decided.
    pub fn approve_change(&self, id: &ChangeRecordId, approver: &str) -> Result<ChangeRecord, TicError> {
        let now = self.now();
        let result = self.decide(id, |r| r.approve(approver, now).map_err(TicError::from));
        match &result {
            Ok(_) => tracing::info!(change_record_id = %id, approver, "change approved"),
            Err(e) => tracing::warn!(change_record_id = %id, approver, error = %e, "approval rejected"),
        }
        result
    }

    /// Pending → rejected, with an optional note.
    pub fn reject_change(
        &self,
        id: &ChangeRecordId,
        approver: &str,
        note: Option<&str>,
    ) -> Result<ChangeRecord, TicError> {
        let now = self.now();
        let result = self.decide(id, |r| r.reject(approver, note, now).map_err(TicError::from));
        match &result {
            Ok(_) => tracing::info!(change_record_id = %id, approver, "change rejected"),
            Err(e) => tracing::warn!(change_record_id = %id, approver, error = %e, "rejection refused"),
        }
        result
    }

    /// Approve each record in order. Failures are reported per record.
    pub fn batch_approve(
        &self,
        ids: &[ChangeRecordId],
        approver: &str,
    ) -> Vec<BatchItemResult<ChangeRecordId>> {
        ids.iter()
            .map(|id| match self.approve_change(id, approver) {
                Ok(record) => BatchItemResult::succeeded(*id, record.change_type),
                Err(e) => BatchItemResult::failed(*id, &e),
            })
            .collect()
    }

    /// Reject each record in order with the same note.
    pub fn batch_reject(
        &self,
        ids: &[ChangeRecordId],
        approver: &str,
        note: Option<&str>,
    ) -> Vec<BatchItemResult<ChangeRecordId>> {
        ids.iter()
            .map(|id| match self.reject_change(id, approver, note) {
                Ok(record) => BatchItemResult::succeeded(*id, record.change_type),
                Err(e) => BatchItemResult::failed(*id, &e),
            })
            .collect()
    }

    /// Every change record of an institution, newest first.
    pub fn change_history(&self, institution_id: &InstitutionId) -> Result<Vec<ChangeRecord>, TicError> {
        let state = self.state.read();
        let mut records: Vec<ChangeRecord> =
            state.institution(institution_id)?.change_records().cloned().collect();
        newest_first(&mut records);
        Ok(records)
    }

    /// Records awaiting a decision, oldest first, optionally for one
    /// institution.
    pub fn pending_changes(&self, institution_id: Option<&InstitutionId>) -> Vec<ChangeRecord> {
        let mut records = self.collect_changes(institution_id, |r| r.is_pending());
        records.sort_by_key(|r| (r.changed_at, r.id));
        records
    }

    /// Records of one change type, newest first.
    pub fn changes_by_type(
        &self,
        institution_id: Option<&InstitutionId>,
        change_type: &str,
    ) -> Vec<ChangeRecord> {
        let mut records = self.collect_changes(institution_id, |r| r.change_type == change_type);
        newest_first(&mut records);
        records
    }

    /// Records with `from <= changed_at <= to`, newest first.
    pub fn changes_between(
        &self,
        institution_id: Option<&InstitutionId>,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<ChangeRecord>, TicError> {
        if from > to {
            return Err(TicError::validation(format!(
                "range start ({from}) must not be after its end ({to})"
            )));
        }
        let mut records =
            self.collect_changes(institution_id, |r| from <= r.changed_at && r.changed_at <= to);
        newest_first(&mut records);
        Ok(records)
    }

    pub fn changes_with_status(
        &self,
        institution_id: Option<&InstitutionId>,
        status: ApprovalStatus,
    ) -> Vec<ChangeRecord> {
        let mut records = self.collect_changes(institution_id, |r| r.status() == status);
        newest_first(&mut records);
        records
    }

    pub fn change_statistics(
        &self,
        institution_id: Option<&InstitutionId>,
    ) -> Result<ChangeStatistics, TicError> {
        let state = self.state.read();
        Ok(match institution_id {
            Some(id) => ChangeStatistics::collect(state.institution(id)?.change_records()),
            None => ChangeStatistics::collect(
                state.institutions.values().flat_map(Institution::change_records),
            ),
        })
    }

    /// Apply a decision to a record under the write guard.
    fn decide(
        &self,
        id: &ChangeRecordId,
        f: impl FnOnce(&mut ChangeRecord) -> Result<(), TicError>,
    ) -> Result<ChangeRecord, TicError> {
        let mut state = self.state.write();
        let owner = state.change_owner(id)?;
        let institution = state.institution_mut(&owner)?;
        let mut next = institution
            .change_record(id)
            .cloned()
            .ok_or_else(|| TicError::not_found("change record", id))?;
        f(&mut next)?;
        institution.replace_change_record(id, next.clone())?;
        Ok(next)
    }

    fn collect_changes(
        &self,
        institution_id: Option<&InstitutionId>,
        keep: impl Fn(&ChangeRecord) -> bool,
    ) -> Vec<ChangeRecord> {
        self.state
            .read()
            .institutions
            .values()
            .filter(|i| institution_id.map_or(true, |id| i.id == *id))
            .flat_map(Institution::change_records)
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

fn newest_first(records: &mut [ChangeRecord]) {
    records.sort_by(|a, b| b.changed_at.cmp(&a.changed_at).then_with(|| b.id.cmp(&a.id)));
}
