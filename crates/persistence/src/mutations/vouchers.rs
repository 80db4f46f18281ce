// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Voucher mutations.
//!
//! Redemption and release both touch two places: the `voucher_usages`
//! row and the counter on the voucher itself. Both run in a single
//! database transaction, and the counter moves via an atomic SQL
//! expression rather than a read-modify-write in application code.

use chrono::{DateTime, Utc};
use classledger_domain::DiscountKind;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{voucher_usages, vouchers};
use crate::error::PersistenceError;

/// Input for creating a voucher.
#[derive(Debug, Clone)]
pub struct NewVoucher {
    pub code: String,
    pub name: String,
    pub active: bool,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_amount: Option<i64>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub usage_limit: Option<i64>,
    pub usage_per_customer: i64,
    pub applicable_customer_ids: Option<Vec<i64>>,
    pub applicable_product_ids: Option<Vec<i64>>,
    pub applicable_categories: Option<Vec<String>>,
}

/// Creates a new voucher.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. duplicate code).
pub fn create_voucher(
    conn: &mut SqliteConnection,
    voucher: &NewVoucher,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    info!("Creating voucher with code: {}", voucher.code);

    let customer_ids: Option<String> = voucher
        .applicable_customer_ids
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let product_ids: Option<String> = voucher
        .applicable_product_ids
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let categories: Option<String> = voucher
        .applicable_categories
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    diesel::insert_into(vouchers::table)
        .values((
            vouchers::code.eq(&voucher.code),
            vouchers::name.eq(&voucher.name),
            vouchers::active.eq(i32::from(voucher.active)),
            vouchers::discount_kind.eq(voucher.discount_kind.as_str()),
            vouchers::discount_value.eq(voucher.discount_value),
            vouchers::max_discount_amount.eq(voucher.max_discount_amount),
            vouchers::min_order_amount.eq(voucher.min_order_amount),
            vouchers::valid_from.eq(voucher.valid_from.map(|dt| dt.to_rfc3339())),
            vouchers::valid_until.eq(voucher.valid_until.map(|dt| dt.to_rfc3339())),
            vouchers::usage_limit.eq(voucher.usage_limit),
            vouchers::usage_count.eq(0),
            vouchers::usage_per_customer.eq(voucher.usage_per_customer),
            vouchers::applicable_customer_ids.eq(customer_ids),
            vouchers::applicable_product_ids.eq(product_ids),
            vouchers::applicable_categories.eq(categories),
            vouchers::created_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Records a redemption: one usage row plus an atomic counter increment,
/// in one transaction.
///
/// # Errors
///
/// Returns an error if either write fails; neither is applied then.
pub fn record_voucher_usage(
    conn: &mut SqliteConnection,
    voucher_id: i64,
    customer_id: i64,
    enrollment_id: i64,
    amount: i64,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    debug!(voucher_id, enrollment_id, "Recording voucher usage");

    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(voucher_usages::table)
            .values((
                voucher_usages::voucher_id.eq(voucher_id),
                voucher_usages::customer_id.eq(customer_id),
                voucher_usages::enrollment_id.eq(Some(enrollment_id)),
                voucher_usages::amount.eq(amount),
                voucher_usages::used_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        diesel::update(vouchers::table.filter(vouchers::voucher_id.eq(voucher_id)))
            .set(vouchers::usage_count.eq(vouchers::usage_count + 1))
            .execute(conn)?;

        Ok(())
    })
}

/// Releases a redemption tied to an enrollment: deletes the usage row
/// and decrements the counter, never below zero.
///
/// Returns `false` when no usage row existed, which makes release
/// idempotent; calling it twice cannot double-decrement.
///
/// # Errors
///
/// Returns an error if the transaction fails.
pub fn release_voucher_usage(
    conn: &mut SqliteConnection,
    voucher_id: i64,
    enrollment_id: i64,
) -> Result<bool, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let deleted: usize = diesel::delete(
            voucher_usages::table.filter(
                voucher_usages::voucher_id
                    .eq(voucher_id)
                    .and(voucher_usages::enrollment_id.eq(Some(enrollment_id))),
            ),
        )
        .execute(conn)?;

        if deleted == 0 {
            return Ok(false);
        }

        diesel::update(
            vouchers::table.filter(
                vouchers::voucher_id
                    .eq(voucher_id)
                    .and(vouchers::usage_count.gt(0)),
            ),
        )
        .set(vouchers::usage_count.eq(vouchers::usage_count - 1))
        .execute(conn)?;

        info!(voucher_id, enrollment_id, "Released voucher usage");
        Ok(true)
    })
}
