// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Campaign mutations.

use chrono::{DateTime, Utc};
use classledger_domain::DiscountKind;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::campaigns;
use crate::error::PersistenceError;

/// Input for creating a campaign. The date window is mandatory.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub name: String,
    pub active: bool,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub usage_limit: Option<i64>,
    pub auto_apply: bool,
    pub priority: i64,
    pub applicable_product_ids: Option<Vec<i64>>,
    pub applicable_categories: Option<Vec<String>>,
    pub target_customer_segments: Option<Vec<String>>,
}

/// Creates a new campaign.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_campaign(
    conn: &mut SqliteConnection,
    campaign: &NewCampaign,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    info!("Creating campaign: {}", campaign.name);

    let product_ids: Option<String> = campaign
        .applicable_product_ids
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let categories: Option<String> = campaign
        .applicable_categories
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let segments: Option<String> = campaign
        .target_customer_segments
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    diesel::insert_into(campaigns::table)
        .values((
            campaigns::name.eq(&campaign.name),
            campaigns::active.eq(i32::from(campaign.active)),
            campaigns::discount_kind.eq(campaign.discount_kind.as_str()),
            campaigns::discount_value.eq(campaign.discount_value),
            campaigns::max_discount_amount.eq(campaign.max_discount_amount),
            campaigns::min_order_amount.eq(campaign.min_order_amount),
            campaigns::start_date.eq(campaign.start_date.to_rfc3339()),
            campaigns::end_date.eq(campaign.end_date.to_rfc3339()),
            campaigns::usage_limit.eq(campaign.usage_limit),
            campaigns::usage_count.eq(0),
            campaigns::auto_apply.eq(i32::from(campaign.auto_apply)),
            campaigns::priority.eq(campaign.priority),
            campaigns::applicable_product_ids.eq(product_ids),
            campaigns::applicable_categories.eq(categories),
            campaigns::target_customer_segments.eq(segments),
            campaigns::created_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Atomically increments a campaign's usage counter.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn increment_campaign_usage(
    conn: &mut SqliteConnection,
    campaign_id: i64,
) -> Result<(), PersistenceError> {
    diesel::update(campaigns::table.filter(campaigns::campaign_id.eq(campaign_id)))
        .set(campaigns::usage_count.eq(campaigns::usage_count + 1))
        .execute(conn)?;

    Ok(())
}
