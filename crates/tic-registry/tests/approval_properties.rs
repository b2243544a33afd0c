//! # Approval Decision Properties
//!
//! Whatever sequence of approve/reject calls hits a record, the first one
//! with a non-blank approver decides it and every later one conflicts.

use std::sync::Arc;

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use tic_core::{ErrorKind, FixedClock, Timestamp};
use tic_registry::Registry;
use tic_state::{ApprovalStatus, ContactInfo, InstitutionStatus, NewChangeRecord, NewInstitution};

#[derive(Debug, Clone)]
enum Decision {
    Approve(String),
    Reject(String),
}

fn approver() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z]{1,8}"]
}

fn decision() -> impl Strategy<Value = Decision> {
    prop_oneof![
        approver().prop_map(Decision::Approve),
        approver().prop_map(Decision::Reject),
    ]
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn registry_with_record() -> (Registry, tic_core::ChangeRecordId) {
    let now = Timestamp::parse("2026-05-10T09:00:00Z").unwrap();
    let registry = Registry::new(Arc::new(FixedClock::new(now)));
    let inst = registry
        .create_institution(NewInstitution {
            id: None,
            name: "Harbor Safety Academy".to_string(),
            code: "HSA".to_string(),
            institution_type: "vocational".to_string(),
            legal_representative: "Lin Wei".to_string(),
            contact: ContactInfo {
                person: "Zhao Min".to_string(),
                phone: "13800138000".to_string(),
                email: "office@harbor.example".to_string(),
            },
            address: "12 Harbor Road".to_string(),
            business_scope: "work safety training".to_string(),
            established_on: now.date(),
            registration_number: "REG-1".to_string(),
            status: InstitutionStatus::Operating,
            organization_structure: Value::Null,
        })
        .unwrap();
    let record = registry
        .record_change(
            &inst.id,
            NewChangeRecord {
                id: None,
                change_type: "scope".to_string(),
                change_details: object(json!({"summary": "scope extended"})),
                before: object(json!({"business_scope": "welding"})),
                after: object(json!({"business_scope": "welding, electrical"})),
                reason: "annual review".to_string(),
                operator: "clerk".to_string(),
                approval: None,
            },
        )
        .unwrap();
    (registry, record.id)
}

proptest! {
    #[test]
    fn first_effective_decision_wins(decisions in prop::collection::vec(decision(), 1..8)) {
        let (registry, id) = registry_with_record();
        let mut winner: Option<(ApprovalStatus, String)> = None;

        for d in &decisions {
            let (result, status, who) = match d {
                Decision::Approve(who) => (registry.approve_change(&id, who), ApprovalStatus::Approved, who),
                Decision::Reject(who) => (registry.reject_change(&id, who, None), ApprovalStatus::Rejected, who),
            };
            match (winner.is_some(), result) {
                (true, Err(e)) => prop_assert_eq!(e.kind(), ErrorKind::Conflict),
                (true, Ok(_)) => prop_assert!(false, "decided record accepted a second decision"),
                (false, Ok(_)) => winner = Some((status, who.clone())),
                (false, Err(e)) => {
                    prop_assert!(who.trim().is_empty());
                    prop_assert_eq!(e.kind(), ErrorKind::Validation);
                }
            }
        }

        let stored = registry.get_change(&id).unwrap();
        match winner {
            Some((status, who)) => {
                prop_assert_eq!(stored.status(), status);
                prop_assert_eq!(stored.approval().approver(), Some(who.as_str()));
            }
            None => prop_assert!(stored.is_pending()),
        }
    }
}
