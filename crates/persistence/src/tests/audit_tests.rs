// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence tests.

use classledger_audit::{Actor, AuditEvent, EntityRef};

use super::test_now;
use crate::Persistence;

#[test]
fn test_audit_events_round_trip_in_order() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");

    let created = AuditEvent::new(
        Actor::system(),
        String::from("CreateEnrollment"),
        EntityRef::new(String::from("enrollment"), 5),
        None,
        Some(String::from("pending")),
        None,
        test_now(),
    );
    let cancelled = AuditEvent::new(
        Actor::staff(3),
        String::from("CancelEnrollment"),
        EntityRef::new(String::from("enrollment"), 5),
        Some(String::from("pending")),
        Some(String::from("cancelled")),
        Some(String::from("Customer withdrew")),
        test_now(),
    );

    persistence
        .persist_audit_event(&created)
        .expect("Failed to persist event");
    persistence
        .persist_audit_event(&cancelled)
        .expect("Failed to persist event");

    let events = persistence
        .audit_events_for_entity("enrollment", 5)
        .expect("Query failed");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, "CreateEnrollment");
    assert_eq!(events[0].actor_type, "system");
    assert_eq!(events[1].action, "CancelEnrollment");
    assert_eq!(events[1].actor_id, "3");
    assert_eq!(events[1].before_status.as_deref(), Some("pending"));
    assert_eq!(events[1].after_status.as_deref(), Some("cancelled"));
    assert_eq!(events[1].details.as_deref(), Some("Customer withdrew"));
}

#[test]
fn test_events_for_other_entities_are_not_returned() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");

    let event = AuditEvent::new(
        Actor::system(),
        String::from("ApproveIncomeReport"),
        EntityRef::new(String::from("income_report"), 8),
        Some(String::from("pending")),
        Some(String::from("approved")),
        None,
        test_now(),
    );
    persistence
        .persist_audit_event(&event)
        .expect("Failed to persist event");

    let events = persistence
        .audit_events_for_entity("enrollment", 8)
        .expect("Query failed");
    assert!(events.is_empty());
}
