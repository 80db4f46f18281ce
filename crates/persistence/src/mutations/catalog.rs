// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Product, customer and child mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{children, customers, products};
use crate::error::PersistenceError;

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub category: Option<String>,
    pub list_price: i64,
    pub sale_price: Option<i64>,
    pub sale_active: bool,
    pub total_sessions: i64,
    pub price_per_session: i64,
}

/// Creates a new product.
///
/// # Errors
///
/// Returns an error if the insert fails (e.g. duplicate code).
pub fn create_product(
    conn: &mut SqliteConnection,
    product: &NewProduct,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    info!("Creating product with code: {}", product.code);

    diesel::insert_into(products::table)
        .values((
            products::code.eq(&product.code),
            products::name.eq(&product.name),
            products::category.eq(product.category.as_deref()),
            products::list_price.eq(product.list_price),
            products::sale_price.eq(product.sale_price),
            products::sale_active.eq(i32::from(product.sale_active)),
            products::total_sessions.eq(product.total_sessions),
            products::price_per_session.eq(product.price_per_session),
            products::created_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Creates a new customer.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_customer(
    conn: &mut SqliteConnection,
    name: &str,
    phone: Option<&str>,
    email: Option<&str>,
    branch_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(customers::table)
        .values((
            customers::name.eq(name),
            customers::phone.eq(phone),
            customers::email.eq(email),
            customers::branch_id.eq(branch_id),
            customers::created_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Creates a child record under a customer.
///
/// # Errors
///
/// Returns an error if the customer does not exist or the insert fails.
pub fn create_child(
    conn: &mut SqliteConnection,
    customer_id: i64,
    name: &str,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(children::table)
        .values((
            children::customer_id.eq(customer_id),
            children::name.eq(name),
            children::created_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}
