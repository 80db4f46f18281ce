// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event lookups.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::AuditEventRow;
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Lists audit events recorded for an entity, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn events_for_entity(
    conn: &mut SqliteConnection,
    entity_type: &str,
    entity_id: i64,
) -> Result<Vec<AuditEventRow>, PersistenceError> {
    Ok(audit_events::table
        .filter(
            audit_events::entity_type
                .eq(entity_type)
                .and(audit_events::entity_id.eq(entity_id)),
        )
        .order(audit_events::event_id.asc())
        .load::<AuditEventRow>(conn)?)
}
