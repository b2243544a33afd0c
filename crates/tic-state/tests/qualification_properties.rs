//! # Qualification Lifecycle Properties
//!
//! Property tests tying the operator status to the temporal state across
//! arbitrary windows, instants and status histories.

use std::collections::BTreeSet;

use proptest::prelude::*;
use tic_core::{InstitutionId, Timestamp};
use tic_state::{NewQualification, Qualification, QualificationStatus, Renewal};

const BASE: i64 = 1_767_225_600; // 2026-01-01T00:00:00Z
const DAY: i64 = 86_400;

fn ts(secs: i64) -> Timestamp {
    Timestamp::from_epoch_secs(secs).unwrap()
}

fn qualification(from: i64, len: i64) -> Qualification {
    let valid_from = ts(from);
    let input = NewQualification {
        id: None,
        qualification_type: "safety-training".to_string(),
        qualification_name: "Work Safety Training License".to_string(),
        certificate_number: "WS-PROP".to_string(),
        issuing_authority: "Bureau".to_string(),
        issue_date: valid_from.date(),
        valid_from,
        valid_to: ts(from + len),
        scope: BTreeSet::new(),
        attachments: vec![],
    };
    Qualification::new(InstitutionId::new(), input, valid_from).unwrap()
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Revoke,
    Suspend,
    Restore,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Revoke), Just(Op::Suspend), Just(Op::Restore)]
}

proptest! {
    /// Whatever the history, a qualification is only valid when its status
    /// says so.
    #[test]
    fn valid_requires_valid_status(
        from in BASE..BASE + 365 * DAY,
        len in DAY..(3 * 365 * DAY),
        offset in -DAY..(4 * 365 * DAY),
        ops in prop::collection::vec(op(), 0..6),
    ) {
        let mut q = qualification(from, len);
        let now = ts(from + offset);
        for op in ops {
            match op {
                Op::Revoke => q.revoke("audit", now),
                Op::Suspend => q.suspend("audit", now),
                Op::Restore => { let _ = q.restore(now); }
            }
        }
        if q.status() != QualificationStatus::Valid {
            prop_assert!(!q.is_valid(now));
            prop_assert!(!q.is_expiring_soon(now, 30));
        }
    }

    /// Renewing to a future date makes the qualification valid at once;
    /// renewing to a past or present date fails and changes nothing.
    #[test]
    fn renewal_outcome(
        from in BASE..BASE + 365 * DAY,
        len in DAY..(365 * DAY),
        elapsed in 0..(2 * 365 * DAY),
        shift in -(365 * DAY)..(365 * DAY),
        suspended in any::<bool>(),
    ) {
        let mut q = qualification(from, len);
        let now = ts(from + elapsed);
        if suspended {
            q.suspend("audit", now);
        }
        let before = q.clone();
        let target = ts(from + elapsed + shift);
        let result = q.renew(Renewal::until(target), now);
        if shift > 0 {
            prop_assert!(result.is_ok());
            prop_assert!(q.is_valid(now));
            prop_assert_eq!(q.valid_to(), target);
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(q, before);
        }
    }
}
