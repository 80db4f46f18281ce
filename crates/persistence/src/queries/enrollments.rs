// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment lookups, filtered lists and statistics.

use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable};
use diesel::SqliteConnection;

use crate::data_models::{EnrollmentRow, EnrollmentStatistics, IncomeReportRow};
use crate::diesel_schema::{customers, enrollments, income_reports};
use crate::error::PersistenceError;

/// Filters for listing enrollments. All fields are optional and
/// combined with AND.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentFilter {
    pub status: Option<String>,
    pub customer_id: Option<i64>,
    pub product_id: Option<i64>,
    pub branch_id: Option<i64>,
    /// Substring match on the customer name.
    pub search: Option<String>,
}

/// Fetches an enrollment by id.
///
/// # Errors
///
/// Returns `NotFound` if the enrollment does not exist.
pub fn get_enrollment(
    conn: &mut SqliteConnection,
    enrollment_id: i64,
) -> Result<EnrollmentRow, PersistenceError> {
    enrollments::table
        .filter(enrollments::enrollment_id.eq(enrollment_id))
        .first::<EnrollmentRow>(conn)
        .optional()?
        .ok_or_else(|| PersistenceError::NotFound(format!("Enrollment {enrollment_id} not found")))
}

/// Lists enrollments matching the filter, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_enrollments(
    conn: &mut SqliteConnection,
    filter: &EnrollmentFilter,
) -> Result<Vec<EnrollmentRow>, PersistenceError> {
    let mut query = enrollments::table.into_boxed();

    if let Some(status) = &filter.status {
        query = query.filter(enrollments::status.eq(status.clone()));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(enrollments::customer_id.eq(customer_id));
    }
    if let Some(product_id) = filter.product_id {
        query = query.filter(enrollments::product_id.eq(product_id));
    }
    if let Some(branch_id) = filter.branch_id {
        query = query.filter(enrollments::branch_id.eq(branch_id));
    }
    if let Some(search) = &filter.search {
        let pattern: String = format!("%{search}%");
        let matching_customers = customers::table
            .filter(customers::name.like(pattern))
            .select(customers::customer_id);
        query = query.filter(enrollments::customer_id.eq_any(matching_customers));
    }

    Ok(query
        .order(enrollments::enrollment_id.desc())
        .load::<EnrollmentRow>(conn)?)
}

/// Aggregates enrollment counts by status plus realized and pending
/// revenue over non-cancelled enrollments.
///
/// # Errors
///
/// Returns an error if a query fails.
pub fn enrollment_statistics(
    conn: &mut SqliteConnection,
) -> Result<EnrollmentStatistics, PersistenceError> {
    let count_for = |conn: &mut SqliteConnection, status: &str| -> Result<i64, PersistenceError> {
        Ok(enrollments::table
            .filter(enrollments::status.eq(status))
            .count()
            .get_result(conn)?)
    };

    let total: i64 = enrollments::table.count().get_result(conn)?;
    let pending: i64 = count_for(conn, "pending")?;
    let approved: i64 = count_for(conn, "approved")?;
    let paid: i64 = count_for(conn, "paid")?;
    let active: i64 = count_for(conn, "active")?;
    let completed: i64 = count_for(conn, "completed")?;
    let cancelled: i64 = count_for(conn, "cancelled")?;

    // Diesel types SUM over a BIGINT column as Numeric, which cannot
    // load into an i64, so the aggregate gets an explicit SQL type.
    let realized_revenue: Option<i64> = enrollments::table
        .filter(enrollments::status.ne("cancelled"))
        .select(sql::<Nullable<BigInt>>("SUM(paid_amount)"))
        .get_result::<Option<i64>>(conn)?;
    let pending_revenue: Option<i64> = enrollments::table
        .filter(enrollments::status.ne("cancelled"))
        .select(sql::<Nullable<BigInt>>("SUM(remaining_amount)"))
        .get_result::<Option<i64>>(conn)?;

    Ok(EnrollmentStatistics {
        total,
        pending,
        approved,
        paid,
        active,
        completed,
        cancelled,
        realized_revenue: realized_revenue.unwrap_or(0),
        pending_revenue: pending_revenue.unwrap_or(0),
    })
}

/// Checks whether an approved income report is linked to the
/// enrollment via its `payer_info` JSON.
///
/// The link lives inside a JSON column, so approved reports are scanned
/// in application code rather than matched in SQL.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn has_approved_income_report(
    conn: &mut SqliteConnection,
    enrollment_id: i64,
) -> Result<bool, PersistenceError> {
    let approved: Vec<IncomeReportRow> = income_reports::table
        .filter(income_reports::status.eq("approved"))
        .load::<IncomeReportRow>(conn)?;

    Ok(approved
        .iter()
        .any(|report| report.linked_enrollment_id() == Some(enrollment_id)))
}
