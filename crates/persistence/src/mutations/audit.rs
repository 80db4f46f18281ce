// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event persistence.

use classledger_audit::AuditEvent;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::debug;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Persists an audit event and returns its id.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn persist_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    debug!(action = %event.action, "Persisting audit event");

    diesel::insert_into(audit_events::table)
        .values((
            audit_events::actor_id.eq(&event.actor.id),
            audit_events::actor_type.eq(&event.actor.actor_type),
            audit_events::action.eq(&event.action),
            audit_events::entity_type.eq(&event.entity.entity_type),
            audit_events::entity_id.eq(event.entity.entity_id),
            audit_events::before_status.eq(event.before.as_deref()),
            audit_events::after_status.eq(event.after.as_deref()),
            audit_events::details.eq(event.details.as_deref()),
            audit_events::occurred_at.eq(event.occurred_at.to_rfc3339()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}
