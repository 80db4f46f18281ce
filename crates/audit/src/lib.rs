// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change.
/// This could be a staff member, a system process, or an automated trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "staff", "system").
    pub actor_type: String,
}

impl Actor {
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// The actor recorded when no staff identity was supplied.
    #[must_use]
    pub fn system() -> Self {
        Self::new(String::from("system"), String::from("system"))
    }

    /// An actor for an identified staff member.
    #[must_use]
    pub fn staff(staff_id: i64) -> Self {
        Self::new(staff_id.to_string(), String::from("staff"))
    }
}

/// The record an operation touched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    /// The table-level entity name (e.g., "enrollment", "income_report").
    pub entity_type: String,
    /// The row id.
    pub entity_id: i64,
}

impl EntityRef {
    #[must_use]
    pub const fn new(entity_type: String, entity_id: i64) -> Self {
        Self {
            entity_type,
            entity_id,
        }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful mutating operation produces exactly one audit event
/// capturing who acted, which record changed, and the status before and
/// after the change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The name of the action (e.g., "`CreateEnrollment`", "`ApproveIncomeReport`").
    pub action: String,
    /// The record the action was performed on.
    pub entity: EntityRef,
    /// The status before the transition, when the entity already existed.
    pub before: Option<String>,
    /// The status after the transition, when the entity still exists.
    pub after: Option<String>,
    /// Optional additional details about the action.
    pub details: Option<String>,
    /// When the action happened.
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`. Once created, an audit event is
    /// immutable.
    #[must_use]
    pub const fn new(
        actor: Actor,
        action: String,
        entity: EntityRef,
        before: Option<String>,
        after: Option<String>,
        details: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            actor,
            action,
            entity,
            before,
            after,
            details,
            occurred_at,
        }
    }
}

/// A non-fatal problem surfaced on an otherwise successful response.
///
/// Discount usage bookkeeping runs as a best-effort follow-up to
/// enrollment creation; a failure there must never undo the enrollment,
/// so it surfaces as a warning on the response instead. A requested
/// voucher or campaign that failed an eligibility gate is reported the
/// same way: the enrollment proceeds undiscounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum BookkeepingWarning {
    /// A requested voucher failed an eligibility gate and was skipped.
    VoucherNotApplied { code: String, detail: String },
    /// A requested campaign failed an eligibility gate and was skipped.
    CampaignNotApplied { campaign_id: i64, detail: String },
    /// Recording the voucher usage row or counter increment failed.
    VoucherUsageNotRecorded { voucher_id: i64, detail: String },
    /// Incrementing the campaign usage counter failed.
    CampaignUsageNotRecorded { campaign_id: i64, detail: String },
    /// Releasing a voucher usage failed during rejection or cancellation.
    VoucherUsageNotReleased { voucher_id: i64, detail: String },
}

impl std::fmt::Display for BookkeepingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VoucherNotApplied { code, detail } => {
                write!(f, "Voucher {code} was not applied: {detail}")
            }
            Self::CampaignNotApplied {
                campaign_id,
                detail,
            } => {
                write!(f, "Campaign {campaign_id} was not applied: {detail}")
            }
            Self::VoucherUsageNotRecorded { voucher_id, detail } => {
                write!(f, "Voucher {voucher_id} usage was not recorded: {detail}")
            }
            Self::CampaignUsageNotRecorded {
                campaign_id,
                detail,
            } => {
                write!(f, "Campaign {campaign_id} usage was not recorded: {detail}")
            }
            Self::VoucherUsageNotReleased { voucher_id, detail } => {
                write!(f, "Voucher {voucher_id} usage was not released: {detail}")
            }
        }
    }
}
