//! # Qualification Services
//!
//! Adds and edits qualifications under the global certificate-number
//! uniqueness rule, drives the lifecycle transitions, and answers the
//! expiry queries (expiry check, expiring within N days, lapsed, renewal
//! reminders).

use serde::{Deserialize, Serialize};

use tic_core::{InstitutionId, QualificationId, TicError, Timestamp};
use tic_rules::{assess_institution, ExpiryAssessment, ExpiryThresholds};
use tic_state::{Institution, NewQualification, Qualification, QualificationUpdate, Renewal};

use crate::registry::{Registry, RegistryState};
use crate::stats::QualificationStatistics;

/// A qualification due for renewal, with the contact to notify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewalReminder {
    pub institution_id: InstitutionId,
    pub institution_name: String,
    pub contact_person: String,
    pub contact_email: String,
    pub qualification_id: QualificationId,
    pub qualification_name: String,
    pub certificate_number: String,
    pub valid_to: Timestamp,
    pub remaining_days: i64,
}

impl Registry {
    pub fn add_qualification(
        &self,
        institution_id: &InstitutionId,
        input: NewQualification,
    ) -> Result<Qualification, TicError> {
        let now = self.now();
        let qualification = Qualification::new(*institution_id, input, now)?;
        let mut state = self.state.write();
        state.institution(institution_id)?;
        if state.qualification_owner.contains_key(&qualification.id) {
            return Err(TicError::conflict(format!(
                "qualification {} already exists",
                qualification.id
            )));
        }
        ensure_certificate_free(&state, &qualification.certificate_number, None)?;

        state
            .institution_mut(institution_id)?
            .add_qualification(qualification.clone())?;
        state
            .qualification_owner
            .insert(qualification.id, *institution_id);
        tracing::info!(
            institution_id = %institution_id,
            qualification_id = %qualification.id,
            certificate_number = %qualification.certificate_number,
            valid_to = %qualification.valid_to(),
            "qualification added"
        );
        Ok(qualification)
    }

    pub fn get_qualification(&self, id: &QualificationId) -> Result<Qualification, TicError> {
        let state = self.state.read();
        let owner = state.qualification_owner(id)?;
        state
            .institution(&owner)?
            .qualification(id)
            .cloned()
            .ok_or_else(|| TicError::not_found("qualification", id))
    }

    pub fn qualifications_of(&self, institution_id: &InstitutionId) -> Result<Vec<Qualification>, TicError> {
        let state = self.state.read();
        Ok(state.institution(institution_id)?.qualifications().cloned().collect())
    }

    /// Partial update; a new certificate number must be unique among all
    /// other qualifications.
    pub fn update_qualification(
        &self,
        id: &QualificationId,
        update: QualificationUpdate,
    ) -> Result<Qualification, TicError> {
        let now = self.now();
        let q = self.with_qualification(id, |q, state| {
            if let Some(number) = update.certificate_number.as_deref() {
                ensure_certificate_free(state, number, Some(q.id))?;
            }
            q.apply_update(update, now)
        })?;
        tracing::info!(qualification_id = %id, "qualification updated");
        Ok(q)
    }

    /// Extend the validity window and force the status back to valid.
    pub fn renew_qualification(
        &self,
        id: &QualificationId,
        renewal: Renewal,
    ) -> Result<Qualification, TicError> {
        let now = self.now();
        let new_valid_to = renewal.new_valid_to;
        let result = self.with_qualification(id, |q, state| {
            if let Some(number) = renewal.new_certificate_number.as_deref() {
                ensure_certificate_free(state, number, Some(q.id))?;
            }
            q.renew(renewal, now).map_err(TicError::from)
        });
        match &result {
            Ok(q) => tracing::info!(
                qualification_id = %id,
                valid_to = %q.valid_to(),
                "qualification renewed"
            ),
            Err(e) => tracing::warn!(
                qualification_id = %id,
                requested_valid_to = %new_valid_to,
                error = %e,
                "qualification renewal rejected"
            ),
        }
        result
    }

    pub fn revoke_qualification(&self, id: &QualificationId, reason: &str) -> Result<Qualification, TicError> {
        let now = self.now();
        let q = self.with_qualification(id, |q, _| {
            q.revoke(reason, now);
            Ok(())
        })?;
        tracing::info!(qualification_id = %id, reason, "qualification revoked");
        Ok(q)
    }

    pub fn suspend_qualification(&self, id: &QualificationId, reason: &str) -> Result<Qualification, TicError> {
        let now = self.now();
        let q = self.with_qualification(id, |q, _| {
            q.suspend(reason, now);
            Ok(())
        })?;
        tracing::info!(qualification_id = %id, reason, "qualification suspended");
        Ok(q)
    }

    /// Back to valid; fails once the validity window has closed.
    pub fn restore_qualification(&self, id: &QualificationId) -> Result<Qualification, TicError> {
        let now = self.now();
        let result = self.with_qualification(id, |q, _| q.restore(now).map_err(TicError::from));
        match &result {
            Ok(_) => tracing::info!(qualification_id = %id, "qualification restored"),
            Err(e) => tracing::warn!(qualification_id = %id, error = %e, "restore rejected"),
        }
        result
    }

    /// Classify every qualification of an institution by remaining days.
    pub fn check_expiry(
        &self,
        institution_id: &InstitutionId,
        thresholds: &ExpiryThresholds,
    ) -> Result<Vec<ExpiryAssessment>, TicError> {
        let now = self.now();
        let state = self.state.read();
        Ok(assess_institution(state.institution(institution_id)?, now, thresholds))
    }

    /// Valid qualifications ending within `days`, soonest first.
    pub fn expiring_within(&self, days: i64) -> Vec<Qualification> {
        let now = self.now();
        self.collect_qualifications(|q| q.is_expiring_soon(now, days))
    }

    /// Qualifications still marked valid whose window has ended.
    pub fn lapsed_qualifications(&self) -> Vec<Qualification> {
        let now = self.now();
        self.collect_qualifications(|q| q.is_lapsed(now))
    }

    /// Reminders for every valid qualification ending within `days`,
    /// soonest first.
    pub fn renewal_reminders(&self, days: i64) -> Vec<RenewalReminder> {
        let now = self.now();
        let state = self.state.read();
        let mut reminders: Vec<RenewalReminder> = state
            .institutions
            .values()
            .flat_map(|inst| {
                inst.qualifications()
                    .filter(move |q| q.is_expiring_soon(now, days))
                    .map(move |q| reminder(inst, q, now))
            })
            .collect();
        reminders.sort_by_key(|r| (r.valid_to, r.qualification_id));
        for r in &reminders {
            tracing::info!(
                institution_id = %r.institution_id,
                qualification_id = %r.qualification_id,
                remaining_days = r.remaining_days,
                "renewal reminder due"
            );
        }
        reminders
    }

    /// Whether the qualification is valid now and covers every listed
    /// training type.
    pub fn validate_scope<S: AsRef<str>>(
        &self,
        id: &QualificationId,
        training_types: &[S],
    ) -> Result<bool, TicError> {
        let now = self.now();
        Ok(self.get_qualification(id)?.covers_scope(training_types, now))
    }

    /// Statistics over one institution's qualifications, or all of them.
    pub fn qualification_statistics(
        &self,
        institution_id: Option<&InstitutionId>,
        expiring_soon_days: i64,
    ) -> Result<QualificationStatistics, TicError> {
        let now = self.now();
        let state = self.state.read();
        Ok(match institution_id {
            Some(id) => QualificationStatistics::collect(
                state.institution(id)?.qualifications(),
                now,
                expiring_soon_days,
            ),
            None => QualificationStatistics::collect(
                state.institutions.values().flat_map(Institution::qualifications),
                now,
                expiring_soon_days,
            ),
        })
    }

    /// Run `f` on the qualification under the write guard. `f` also sees
    /// the rest of the state for cross-record checks. On error the
    /// qualification is left as it was.
    fn with_qualification(
        &self,
        id: &QualificationId,
        f: impl FnOnce(&mut Qualification, &RegistryState) -> Result<(), TicError>,
    ) -> Result<Qualification, TicError> {
        let mut state = self.state.write();
        let owner = state.qualification_owner(id)?;
        let mut next = state
            .institution(&owner)?
            .qualification(id)
            .cloned()
            .ok_or_else(|| TicError::not_found("qualification", id))?;
        f(&mut next, &*state)?;
        state
            .institution_mut(&owner)?
            .replace_qualification(id, next.clone())?;
        Ok(next)
    }

    fn collect_qualifications(&self, keep: impl Fn(&Qualification) -> bool) -> Vec<Qualification> {
        let mut found: Vec<Qualification> = self
            .state
            .read()
            .institutions
            .values()
            .flat_map(Institution::qualifications)
            .filter(|q| keep(q))
            .cloned()
            .collect();
        found.sort_by_key(|q| (q.valid_to(), q.id));
        found
    }
}

fn ensure_certificate_free(
    state: &RegistryState,
    number: &str,
    except: Option<QualificationId>,
) -> Result<(), TicError> {
    if state.certificate_in_use(number, except) {
        return Err(TicError::conflict(format!(
            "certificate number {number:?} is already in use"
        )));
    }
    Ok(())
}

fn reminder(institution: &Institution, q: &Qualification, now: Timestamp) -> RenewalReminder {
    RenewalReminder {
        institution_id: institution.id,
        institution_name: institution.name.clone(),
        contact_person: institution.contact.person.clone(),
        contact_email: institution.contact.email.clone(),
        qualification_id: q.id,
        qualification_name: q.qualification_name.clone(),
        certificate_number: q.certificate_number.clone(),
        valid_to: q.valid_to(),
        remaining_days: q.remaining_days(now),
    }
}
