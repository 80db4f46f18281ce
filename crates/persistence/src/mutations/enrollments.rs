// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment mutations.

use chrono::{DateTime, Utc};
use classledger_domain::StudentRef;
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{enrollments, income_reports, wallets};
use crate::error::PersistenceError;
use crate::mutations::wallets as wallet_mutations;

/// Input for creating an enrollment. Prices are already resolved; the
/// voucher/campaign columns carry at most one of the two.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub customer_id: i64,
    pub student: StudentRef,
    pub product_id: i64,
    pub branch_id: Option<i64>,
    pub original_price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
    pub voucher_id: Option<i64>,
    pub voucher_code: Option<String>,
    pub campaign_id: Option<i64>,
    pub total_sessions: i64,
    pub price_per_session: i64,
    pub notes: Option<String>,
}

/// Inserts an enrollment and its pending income report in one
/// transaction.
///
/// The income report's `payer_info` JSON embeds the enrollment id so a
/// later rejection can find its way back to the enrollment's voucher.
/// Discount usage bookkeeping deliberately does NOT happen here; it is
/// a best-effort follow-up after this transaction commits.
///
/// # Errors
///
/// Returns an error if either insert fails; neither row is kept then.
pub fn create_enrollment_with_income_report(
    conn: &mut SqliteConnection,
    enrollment: &NewEnrollment,
    report_title: &str,
    now: DateTime<Utc>,
) -> Result<(i64, i64), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(enrollments::table)
            .values((
                enrollments::customer_id.eq(enrollment.customer_id),
                enrollments::student_type.eq(enrollment.student.kind_str()),
                enrollments::student_id.eq(enrollment.student.student_id()),
                enrollments::product_id.eq(enrollment.product_id),
                enrollments::branch_id.eq(enrollment.branch_id),
                enrollments::status.eq("pending"),
                enrollments::original_price.eq(enrollment.original_price),
                enrollments::discount_amount.eq(enrollment.discount_amount),
                enrollments::final_price.eq(enrollment.final_price),
                enrollments::paid_amount.eq(0),
                enrollments::remaining_amount.eq(enrollment.final_price),
                enrollments::voucher_id.eq(enrollment.voucher_id),
                enrollments::voucher_code.eq(enrollment.voucher_code.as_deref()),
                enrollments::campaign_id.eq(enrollment.campaign_id),
                enrollments::total_sessions.eq(enrollment.total_sessions),
                enrollments::attended_sessions.eq(0),
                enrollments::remaining_sessions.eq(enrollment.total_sessions),
                enrollments::price_per_session.eq(enrollment.price_per_session),
                enrollments::notes.eq(enrollment.notes.as_deref()),
                enrollments::created_at.eq(now.to_rfc3339()),
                enrollments::updated_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        let enrollment_id: i64 = get_last_insert_rowid(conn)?;

        let payer_info: String = serde_json::to_string(&serde_json::json!({
            "enrollment_id": enrollment_id,
            "customer_id": enrollment.customer_id,
        }))?;

        diesel::insert_into(income_reports::table)
            .values((
                income_reports::title.eq(report_title),
                income_reports::amount.eq(enrollment.final_price),
                income_reports::status.eq("pending"),
                income_reports::payment_method.eq("pending"),
                income_reports::payer_info.eq(Some(payer_info)),
                income_reports::category.eq(Some("enrollment")),
                income_reports::branch_id.eq(enrollment.branch_id),
                income_reports::report_date.eq(now.to_rfc3339()),
                income_reports::created_at.eq(now.to_rfc3339()),
                income_reports::updated_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        let income_report_id: i64 = get_last_insert_rowid(conn)?;

        info!(enrollment_id, income_report_id, "Created enrollment");
        Ok((enrollment_id, income_report_id))
    })
}

/// A confirmed payment to apply: the wallet deposit and the
/// enrollment's resolved payment columns.
#[derive(Debug, Clone)]
pub struct EnrollmentPayment {
    pub enrollment_id: i64,
    pub student: StudentRef,
    pub amount: i64,
    pub payment_method: Option<String>,
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub status: String,
}

/// Applies a confirmed payment in one transaction: wallet deposit (the
/// wallet is created on first payment) plus the enrollment's payment
/// columns and status. Returns the wallet balance after the deposit.
///
/// # Errors
///
/// Returns `NotFound` if the enrollment does not exist; no write is
/// kept then, including the deposit.
pub fn record_enrollment_payment(
    conn: &mut SqliteConnection,
    payment: &EnrollmentPayment,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let wallet = wallet_mutations::get_or_create_wallet(conn, payment.student, now)?;
        let reference: String = format!("enrollment:{}", payment.enrollment_id);
        wallet_mutations::deposit(
            conn,
            wallet.wallet_id,
            payment.amount,
            Some(&reference),
            payment.payment_method.as_deref(),
            now,
        )?;

        update_enrollment_payment(
            conn,
            payment.enrollment_id,
            payment.paid_amount,
            payment.remaining_amount,
            &payment.status,
            now,
        )?;

        Ok(wallets::table
            .filter(wallets::wallet_id.eq(wallet.wallet_id))
            .select(wallets::balance)
            .first::<i64>(conn)?)
    })
}

/// Updates the payment columns and status after a payment confirmation.
///
/// # Errors
///
/// Returns `NotFound` if no enrollment row matched.
pub fn update_enrollment_payment(
    conn: &mut SqliteConnection,
    enrollment_id: i64,
    paid_amount: i64,
    remaining_amount: i64,
    status: &str,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let updated: usize =
        diesel::update(enrollments::table.filter(enrollments::enrollment_id.eq(enrollment_id)))
            .set((
                enrollments::paid_amount.eq(paid_amount),
                enrollments::remaining_amount.eq(remaining_amount),
                enrollments::status.eq(status),
                enrollments::updated_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Enrollment {enrollment_id} not found"
        )));
    }

    Ok(())
}

/// Marks an enrollment cancelled and records the reason.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn set_enrollment_cancelled(
    conn: &mut SqliteConnection,
    enrollment_id: i64,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    info!(enrollment_id, "Cancelling enrollment");

    diesel::update(enrollments::table.filter(enrollments::enrollment_id.eq(enrollment_id)))
        .set((
            enrollments::status.eq("cancelled"),
            enrollments::cancelled_reason.eq(Some(reason)),
            enrollments::updated_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    Ok(())
}

/// Deletes an enrollment row. Guards live in the caller; this is the
/// raw delete.
///
/// # Errors
///
/// Returns an error if no row was deleted.
pub fn delete_enrollment(
    conn: &mut SqliteConnection,
    enrollment_id: i64,
) -> Result<(), PersistenceError> {
    let deleted: usize =
        diesel::delete(enrollments::table.filter(enrollments::enrollment_id.eq(enrollment_id)))
            .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Enrollment {enrollment_id} not found"
        )));
    }

    Ok(())
}
