// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Product, customer, voucher and campaign lookups.

use classledger_domain::{Campaign, Product, Voucher};
use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{CampaignRow, CustomerRow, VoucherRow};
use crate::diesel_schema::{campaigns, children, customers, products, voucher_usages, vouchers};
use crate::error::PersistenceError;

/// Fetches a product by id.
///
/// # Errors
///
/// Returns `NotFound` if the product does not exist.
pub fn get_product(conn: &mut SqliteConnection, product_id: i64) -> Result<Product, PersistenceError> {
    let row = products::table
        .filter(products::product_id.eq(product_id))
        .first::<crate::data_models::ProductRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Product {product_id} not found")))?;

    Ok(row.into_domain())
}

/// Fetches a customer by id.
///
/// # Errors
///
/// Returns `NotFound` if the customer does not exist.
pub fn get_customer(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> Result<CustomerRow, PersistenceError> {
    customers::table
        .filter(customers::customer_id.eq(customer_id))
        .first::<CustomerRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Customer {customer_id} not found")))
}

/// Checks whether a child record belongs to the given customer.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn child_belongs_to(
    conn: &mut SqliteConnection,
    customer_id: i64,
    child_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = children::table
        .filter(
            children::child_id
                .eq(child_id)
                .and(children::customer_id.eq(customer_id)),
        )
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}

/// Fetches a voucher by id.
///
/// # Errors
///
/// Returns `NotFound` if the voucher does not exist.
pub fn get_voucher(conn: &mut SqliteConnection, voucher_id: i64) -> Result<Voucher, PersistenceError> {
    vouchers::table
        .filter(vouchers::voucher_id.eq(voucher_id))
        .first::<VoucherRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Voucher {voucher_id} not found")))?
        .into_domain()
}

/// Fetches a voucher by its code.
///
/// # Errors
///
/// Returns `NotFound` if no voucher carries the code.
pub fn get_voucher_by_code(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<Voucher, PersistenceError> {
    vouchers::table
        .filter(vouchers::code.eq(code))
        .first::<VoucherRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Voucher '{code}' not found")))?
        .into_domain()
}

/// Lists vouchers, optionally only active ones, newest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_vouchers(
    conn: &mut SqliteConnection,
    active_only: bool,
) -> Result<Vec<Voucher>, PersistenceError> {
    let mut query = vouchers::table.into_boxed();
    if active_only {
        query = query.filter(vouchers::active.eq(1));
    }

    query
        .order(vouchers::voucher_id.desc())
        .load::<VoucherRow>(conn)?
        .into_iter()
        .map(VoucherRow::into_domain)
        .collect()
}

/// Counts how many times a customer has redeemed a voucher.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn count_customer_voucher_uses(
    conn: &mut SqliteConnection,
    voucher_id: i64,
    customer_id: i64,
) -> Result<i64, PersistenceError> {
    Ok(voucher_usages::table
        .filter(
            voucher_usages::voucher_id
                .eq(voucher_id)
                .and(voucher_usages::customer_id.eq(customer_id)),
        )
        .count()
        .get_result(conn)?)
}

/// Lists campaigns eligible for auto-apply consideration, ordered by
/// priority descending then id ascending. This ordering is what makes
/// the strictly-greater selection stable.
///
/// # Errors
///
/// Returns an error if the query fails or a row is malformed.
pub fn list_auto_apply_campaigns(
    conn: &mut SqliteConnection,
) -> Result<Vec<Campaign>, PersistenceError> {
    campaigns::table
        .filter(campaigns::auto_apply.eq(1).and(campaigns::active.eq(1)))
        .order((campaigns::priority.desc(), campaigns::campaign_id.asc()))
        .load::<CampaignRow>(conn)?
        .into_iter()
        .map(CampaignRow::into_domain)
        .collect()
}

/// Fetches a campaign by id.
///
/// # Errors
///
/// Returns `NotFound` if the campaign does not exist.
pub fn get_campaign(
    conn: &mut SqliteConnection,
    campaign_id: i64,
) -> Result<Campaign, PersistenceError> {
    campaigns::table
        .filter(campaigns::campaign_id.eq(campaign_id))
        .first::<CampaignRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Campaign {campaign_id} not found")))?
        .into_domain()
}
