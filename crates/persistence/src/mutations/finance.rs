// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Income report and expense proposal mutations.
//!
//! Approval here only stages ledger rows. No cash account balance is
//! ever touched in this crate; settlement belongs to the external
//! verification workflow.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::SqliteConnection;
use tracing::info;

use crate::backend::sqlite::get_last_insert_rowid;
use crate::diesel_schema::{expense_proposals, financial_transactions, income_reports};
use crate::error::PersistenceError;

/// Input for creating an income report. Status is always forced to
/// `pending` regardless of what the caller sends over the wire.
#[derive(Debug, Clone)]
pub struct NewIncomeReport {
    pub title: String,
    pub amount: i64,
    pub payment_method: String,
    pub payer_info: Option<serde_json::Value>,
    pub category: Option<String>,
    pub financial_plan_id: Option<i64>,
    pub account_item_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub report_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Partial update for a pending income report.
#[derive(Debug, Clone, Default)]
pub struct IncomeReportChanges {
    pub title: Option<String>,
    pub amount: Option<i64>,
    pub payment_method: Option<String>,
    pub category: Option<String>,
    pub branch_id: Option<i64>,
    pub report_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Creates an income report with status `pending`.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_income_report(
    conn: &mut SqliteConnection,
    report: &NewIncomeReport,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    let payer_info: Option<String> = report
        .payer_info
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    diesel::insert_into(income_reports::table)
        .values((
            income_reports::title.eq(&report.title),
            income_reports::amount.eq(report.amount),
            income_reports::status.eq("pending"),
            income_reports::payment_method.eq(&report.payment_method),
            income_reports::payer_info.eq(payer_info),
            income_reports::category.eq(report.category.as_deref()),
            income_reports::financial_plan_id.eq(report.financial_plan_id),
            income_reports::account_item_id.eq(report.account_item_id),
            income_reports::branch_id.eq(report.branch_id),
            income_reports::report_date.eq(report.report_date.to_rfc3339()),
            income_reports::notes.eq(report.notes.as_deref()),
            income_reports::created_at.eq(now.to_rfc3339()),
            income_reports::updated_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

    get_last_insert_rowid(conn)
}

/// Approves a pending income report and stages one `approved` ledger
/// row, in one transaction.
///
/// The update filters on `status = 'pending'`, so a report that slipped
/// out of pending between the caller's check and this write cannot be
/// approved twice or gain a second ledger row.
///
/// # Errors
///
/// Returns `NotFound` if the report is missing or no longer pending.
pub fn approve_income_report(
    conn: &mut SqliteConnection,
    income_report_id: i64,
    approver: Option<i64>,
    cash_account_id: i64,
    payment_method: Option<&str>,
    payment_ref: Option<&str>,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let amount: i64 = income_reports::table
            .filter(income_reports::income_report_id.eq(income_report_id))
            .select(income_reports::amount)
            .first::<i64>(conn)?;

        let updated: usize = diesel::update(
            income_reports::table.filter(
                income_reports::income_report_id
                    .eq(income_report_id)
                    .and(income_reports::status.eq("pending")),
            ),
        )
        .set((
            income_reports::status.eq("approved"),
            income_reports::approved_by.eq(approver),
            income_reports::approved_at.eq(Some(now.to_rfc3339())),
            income_reports::cash_account_id.eq(Some(cash_account_id)),
            income_reports::payment_ref.eq(payment_ref),
            income_reports::updated_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Income report {income_report_id} is not pending"
            )));
        }

        if let Some(method) = payment_method {
            diesel::update(
                income_reports::table.filter(income_reports::income_report_id.eq(income_report_id)),
            )
            .set(income_reports::payment_method.eq(method))
            .execute(conn)?;
        }

        diesel::insert_into(financial_transactions::table)
            .values((
                financial_transactions::kind.eq("income"),
                financial_transactions::status.eq("approved"),
                financial_transactions::amount.eq(amount),
                financial_transactions::source_type.eq("income_report"),
                financial_transactions::source_id.eq(income_report_id),
                financial_transactions::cash_account_id.eq(Some(cash_account_id)),
                financial_transactions::payment_method.eq(payment_method),
                financial_transactions::payment_ref.eq(payment_ref),
                financial_transactions::created_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        let transaction_id: i64 = get_last_insert_rowid(conn)?;
        info!(income_report_id, transaction_id, "Approved income report");
        Ok(transaction_id)
    })
}

/// Rejects a pending income report.
///
/// # Errors
///
/// Returns `NotFound` if the report is missing or no longer pending.
pub fn reject_income_report(
    conn: &mut SqliteConnection,
    income_report_id: i64,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        income_reports::table.filter(
            income_reports::income_report_id
                .eq(income_report_id)
                .and(income_reports::status.eq("pending")),
        ),
    )
    .set((
        income_reports::status.eq("rejected"),
        income_reports::rejected_reason.eq(Some(reason)),
        income_reports::updated_at.eq(now.to_rfc3339()),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Income report {income_report_id} is not pending"
        )));
    }

    info!(income_report_id, "Rejected income report");
    Ok(())
}

/// Applies a partial update to a pending income report.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn update_income_report(
    conn: &mut SqliteConnection,
    income_report_id: i64,
    changes: &IncomeReportChanges,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    // Diesel has no clean way to build a dynamic SET clause, so each
    // present field is applied separately inside one transaction.
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let target = income_reports::table
            .filter(income_reports::income_report_id.eq(income_report_id));

        if let Some(title) = &changes.title {
            diesel::update(target)
                .set(income_reports::title.eq(title))
                .execute(conn)?;
        }
        if let Some(amount) = changes.amount {
            diesel::update(target)
                .set(income_reports::amount.eq(amount))
                .execute(conn)?;
        }
        if let Some(method) = &changes.payment_method {
            diesel::update(target)
                .set(income_reports::payment_method.eq(method))
                .execute(conn)?;
        }
        if let Some(category) = &changes.category {
            diesel::update(target)
                .set(income_reports::category.eq(Some(category.as_str())))
                .execute(conn)?;
        }
        if let Some(branch_id) = changes.branch_id {
            diesel::update(target)
                .set(income_reports::branch_id.eq(Some(branch_id)))
                .execute(conn)?;
        }
        if let Some(report_date) = changes.report_date {
            diesel::update(target)
                .set(income_reports::report_date.eq(report_date.to_rfc3339()))
                .execute(conn)?;
        }
        if let Some(notes) = &changes.notes {
            diesel::update(target)
                .set(income_reports::notes.eq(Some(notes.as_str())))
                .execute(conn)?;
        }

        diesel::update(target)
            .set(income_reports::updated_at.eq(now.to_rfc3339()))
            .execute(conn)?;

        Ok(())
    })
}

/// Deletes an income report row.
///
/// # Errors
///
/// Returns `NotFound` if no row was deleted.
pub fn delete_income_report(
    conn: &mut SqliteConnection,
    income_report_id: i64,
) -> Result<(), PersistenceError> {
    let deleted: usize = diesel::delete(
        income_reports::table.filter(income_reports::income_report_id.eq(income_report_id)),
    )
    .execute(conn)?;

    if deleted == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Income report {income_report_id} not found"
        )));
    }

    Ok(())
}

/// Input for creating an expense proposal. The cash account is chosen
/// at creation and rides on both the proposal and its ledger rows.
#[derive(Debug, Clone)]
pub struct NewExpenseProposal {
    pub title: String,
    pub amount: i64,
    pub category: Option<String>,
    pub financial_plan_id: i64,
    pub cash_account_id: i64,
    pub branch_id: Option<i64>,
    pub proposal_date: DateTime<Utc>,
    pub notes: Option<String>,
}

/// Partial update for a pending expense proposal.
#[derive(Debug, Clone, Default)]
pub struct ExpenseProposalChanges {
    pub title: Option<String>,
    pub amount: Option<i64>,
    pub category: Option<String>,
    pub branch_id: Option<i64>,
    pub proposal_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Creates an expense proposal together with its `pending` ledger row,
/// in one transaction.
///
/// # Errors
///
/// Returns an error if either insert fails; neither row is kept then.
pub fn create_expense_proposal(
    conn: &mut SqliteConnection,
    proposal: &NewExpenseProposal,
    now: DateTime<Utc>,
) -> Result<(i64, i64), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(expense_proposals::table)
            .values((
                expense_proposals::title.eq(&proposal.title),
                expense_proposals::amount.eq(proposal.amount),
                expense_proposals::status.eq("pending"),
                expense_proposals::category.eq(proposal.category.as_deref()),
                expense_proposals::financial_plan_id.eq(proposal.financial_plan_id),
                expense_proposals::cash_account_id.eq(proposal.cash_account_id),
                expense_proposals::branch_id.eq(proposal.branch_id),
                expense_proposals::proposal_date.eq(proposal.proposal_date.to_rfc3339()),
                expense_proposals::notes.eq(proposal.notes.as_deref()),
                expense_proposals::created_at.eq(now.to_rfc3339()),
                expense_proposals::updated_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        let proposal_id: i64 = get_last_insert_rowid(conn)?;

        diesel::insert_into(financial_transactions::table)
            .values((
                financial_transactions::kind.eq("expense"),
                financial_transactions::status.eq("pending"),
                financial_transactions::amount.eq(proposal.amount),
                financial_transactions::source_type.eq("expense_proposal"),
                financial_transactions::source_id.eq(proposal_id),
                financial_transactions::cash_account_id.eq(Some(proposal.cash_account_id)),
                financial_transactions::description.eq(Some(proposal.title.as_str())),
                financial_transactions::created_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        let transaction_id: i64 = get_last_insert_rowid(conn)?;
        info!(proposal_id, transaction_id, "Created expense proposal");
        Ok((proposal_id, transaction_id))
    })
}

/// Approves a pending expense proposal. The ledger is untouched here;
/// the pending row created at store time stays pending until payment.
///
/// # Errors
///
/// Returns `NotFound` if the proposal is missing or no longer pending.
pub fn approve_expense_proposal(
    conn: &mut SqliteConnection,
    expense_proposal_id: i64,
    approver: Option<i64>,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        expense_proposals::table.filter(
            expense_proposals::expense_proposal_id
                .eq(expense_proposal_id)
                .and(expense_proposals::status.eq("pending")),
        ),
    )
    .set((
        expense_proposals::status.eq("approved"),
        expense_proposals::approved_by.eq(approver),
        expense_proposals::approved_at.eq(Some(now.to_rfc3339())),
        expense_proposals::updated_at.eq(now.to_rfc3339()),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Expense proposal {expense_proposal_id} is not pending"
        )));
    }

    info!(expense_proposal_id, "Approved expense proposal");
    Ok(())
}

/// Rejects a pending expense proposal.
///
/// # Errors
///
/// Returns `NotFound` if the proposal is missing or no longer pending.
pub fn reject_expense_proposal(
    conn: &mut SqliteConnection,
    expense_proposal_id: i64,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(
        expense_proposals::table.filter(
            expense_proposals::expense_proposal_id
                .eq(expense_proposal_id)
                .and(expense_proposals::status.eq("pending")),
        ),
    )
    .set((
        expense_proposals::status.eq("rejected"),
        expense_proposals::rejected_reason.eq(Some(reason)),
        expense_proposals::updated_at.eq(now.to_rfc3339()),
    ))
    .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Expense proposal {expense_proposal_id} is not pending"
        )));
    }

    Ok(())
}

/// Marks an approved expense proposal paid and records a SECOND ledger
/// row carrying the settlement details.
///
/// The original pending row from store time is left as-is; the pair of
/// rows is what downstream reconciliation expects to see.
///
/// # Errors
///
/// Returns `NotFound` if the proposal is missing or not approved.
pub fn mark_expense_proposal_paid(
    conn: &mut SqliteConnection,
    expense_proposal_id: i64,
    payment_date: DateTime<Utc>,
    payment_method: &str,
    payment_ref: Option<&str>,
    now: DateTime<Utc>,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let (amount, title, cash_account_id): (i64, String, i64) = expense_proposals::table
            .filter(expense_proposals::expense_proposal_id.eq(expense_proposal_id))
            .select((
                expense_proposals::amount,
                expense_proposals::title,
                expense_proposals::cash_account_id,
            ))
            .first::<(i64, String, i64)>(conn)?;

        let updated: usize = diesel::update(
            expense_proposals::table.filter(
                expense_proposals::expense_proposal_id
                    .eq(expense_proposal_id)
                    .and(expense_proposals::status.eq("approved")),
            ),
        )
        .set((
            expense_proposals::status.eq("paid"),
            expense_proposals::payment_date.eq(Some(payment_date.to_rfc3339())),
            expense_proposals::payment_method.eq(Some(payment_method)),
            expense_proposals::payment_ref.eq(payment_ref),
            expense_proposals::updated_at.eq(now.to_rfc3339()),
        ))
        .execute(conn)?;

        if updated == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Expense proposal {expense_proposal_id} is not approved"
            )));
        }

        diesel::insert_into(financial_transactions::table)
            .values((
                financial_transactions::kind.eq("expense"),
                financial_transactions::status.eq("approved"),
                financial_transactions::amount.eq(amount),
                financial_transactions::source_type.eq("expense_proposal"),
                financial_transactions::source_id.eq(expense_proposal_id),
                financial_transactions::cash_account_id.eq(Some(cash_account_id)),
                financial_transactions::payment_method.eq(Some(payment_method)),
                financial_transactions::payment_ref.eq(payment_ref),
                financial_transactions::payment_date.eq(Some(payment_date.to_rfc3339())),
                financial_transactions::description.eq(Some(title.as_str())),
                financial_transactions::created_at.eq(now.to_rfc3339()),
            ))
            .execute(conn)?;

        let transaction_id: i64 = get_last_insert_rowid(conn)?;
        info!(
            expense_proposal_id,
            transaction_id, "Marked expense proposal paid"
        );
        Ok(transaction_id)
    })
}

/// Applies a partial update to a pending expense proposal, mirroring
/// title and amount into the still-pending ledger row.
///
/// # Errors
///
/// Returns an error if any update fails.
pub fn update_expense_proposal(
    conn: &mut SqliteConnection,
    expense_proposal_id: i64,
    changes: &ExpenseProposalChanges,
    now: DateTime<Utc>,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let target = expense_proposals::table
            .filter(expense_proposals::expense_proposal_id.eq(expense_proposal_id));
        let pending_ledger = financial_transactions::table.filter(
            financial_transactions::source_type
                .eq("expense_proposal")
                .and(financial_transactions::source_id.eq(expense_proposal_id))
                .and(financial_transactions::status.eq("pending")),
        );

        if let Some(title) = &changes.title {
            diesel::update(target)
                .set(expense_proposals::title.eq(title))
                .execute(conn)?;
            diesel::update(pending_ledger)
                .set(financial_transactions::description.eq(Some(title.as_str())))
                .execute(conn)?;
        }
        if let Some(amount) = changes.amount {
            diesel::update(target)
                .set(expense_proposals::amount.eq(amount))
                .execute(conn)?;
            diesel::update(pending_ledger)
                .set(financial_transactions::amount.eq(amount))
                .execute(conn)?;
        }
        if let Some(category) = &changes.category {
            diesel::update(target)
                .set(expense_proposals::category.eq(Some(category.as_str())))
                .execute(conn)?;
        }
        if let Some(branch_id) = changes.branch_id {
            diesel::update(target)
                .set(expense_proposals::branch_id.eq(Some(branch_id)))
                .execute(conn)?;
        }
        if let Some(proposal_date) = changes.proposal_date {
            diesel::update(target)
                .set(expense_proposals::proposal_date.eq(proposal_date.to_rfc3339()))
                .execute(conn)?;
        }
        if let Some(notes) = &changes.notes {
            diesel::update(target)
                .set(expense_proposals::notes.eq(Some(notes.as_str())))
                .execute(conn)?;
        }

        diesel::update(target)
            .set(expense_proposals::updated_at.eq(now.to_rfc3339()))
            .execute(conn)?;

        Ok(())
    })
}

/// Deletes an expense proposal and every ledger row that references it.
///
/// # Errors
///
/// Returns `NotFound` if the proposal does not exist.
pub fn delete_expense_proposal(
    conn: &mut SqliteConnection,
    expense_proposal_id: i64,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::delete(
            financial_transactions::table.filter(
                financial_transactions::source_type
                    .eq("expense_proposal")
                    .and(financial_transactions::source_id.eq(expense_proposal_id)),
            ),
        )
        .execute(conn)?;

        let deleted: usize = diesel::delete(
            expense_proposals::table
                .filter(expense_proposals::expense_proposal_id.eq(expense_proposal_id)),
        )
        .execute(conn)?;

        if deleted == 0 {
            return Err(PersistenceError::NotFound(format!(
                "Expense proposal {expense_proposal_id} not found"
            )));
        }

        Ok(())
    })
}
