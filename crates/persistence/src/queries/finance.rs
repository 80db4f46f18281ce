// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Income report, expense proposal and ledger lookups.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::data_models::{ExpenseProposalRow, FinancialTransactionRow, IncomeReportRow};
use crate::diesel_schema::{expense_proposals, financial_transactions, income_reports};
use crate::error::PersistenceError;

/// Filters for listing income reports or expense proposals.
#[derive(Debug, Clone, Default)]
pub struct FinanceFilter {
    pub status: Option<String>,
    pub branch_id: Option<i64>,
    /// Inclusive RFC 3339 lower bound on the report/proposal date.
    pub date_from: Option<String>,
    /// Inclusive RFC 3339 upper bound on the report/proposal date.
    pub date_to: Option<String>,
    /// Substring match on the title.
    pub search: Option<String>,
}

/// Fetches an income report by id.
///
/// # Errors
///
/// Returns `NotFound` if the report does not exist.
pub fn get_income_report(
    conn: &mut SqliteConnection,
    income_report_id: i64,
) -> Result<IncomeReportRow, PersistenceError> {
    income_reports::table
        .filter(income_reports::income_report_id.eq(income_report_id))
        .first::<IncomeReportRow>(conn)
        .optional()?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!("Income report {income_report_id} not found"))
        })
}

/// Lists income reports matching the filter, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_income_reports(
    conn: &mut SqliteConnection,
    filter: &FinanceFilter,
) -> Result<Vec<IncomeReportRow>, PersistenceError> {
    let mut query = income_reports::table.into_boxed();

    if let Some(status) = &filter.status {
        query = query.filter(income_reports::status.eq(status.clone()));
    }
    if let Some(branch_id) = filter.branch_id {
        query = query.filter(income_reports::branch_id.eq(branch_id));
    }
    if let Some(from) = &filter.date_from {
        query = query.filter(income_reports::report_date.ge(from.clone()));
    }
    if let Some(to) = &filter.date_to {
        query = query.filter(income_reports::report_date.le(to.clone()));
    }
    if let Some(search) = &filter.search {
        query = query.filter(income_reports::title.like(format!("%{search}%")));
    }

    Ok(query
        .order(income_reports::income_report_id.desc())
        .load::<IncomeReportRow>(conn)?)
}

/// Fetches an expense proposal by id.
///
/// # Errors
///
/// Returns `NotFound` if the proposal does not exist.
pub fn get_expense_proposal(
    conn: &mut SqliteConnection,
    expense_proposal_id: i64,
) -> Result<ExpenseProposalRow, PersistenceError> {
    expense_proposals::table
        .filter(expense_proposals::expense_proposal_id.eq(expense_proposal_id))
        .first::<ExpenseProposalRow>(conn)
        .optional()?
        .ok_or_else(|| {
            PersistenceError::NotFound(format!(
                "Expense proposal {expense_proposal_id} not found"
            ))
        })
}

/// Lists expense proposals matching the filter, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_expense_proposals(
    conn: &mut SqliteConnection,
    filter: &FinanceFilter,
) -> Result<Vec<ExpenseProposalRow>, PersistenceError> {
    let mut query = expense_proposals::table.into_boxed();

    if let Some(status) = &filter.status {
        query = query.filter(expense_proposals::status.eq(status.clone()));
    }
    if let Some(branch_id) = filter.branch_id {
        query = query.filter(expense_proposals::branch_id.eq(branch_id));
    }
    if let Some(from) = &filter.date_from {
        query = query.filter(expense_proposals::proposal_date.ge(from.clone()));
    }
    if let Some(to) = &filter.date_to {
        query = query.filter(expense_proposals::proposal_date.le(to.clone()));
    }
    if let Some(search) = &filter.search {
        query = query.filter(expense_proposals::title.like(format!("%{search}%")));
    }

    Ok(query
        .order(expense_proposals::expense_proposal_id.desc())
        .load::<ExpenseProposalRow>(conn)?)
}

/// Lists every ledger row staged for a source record, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn transactions_for_source(
    conn: &mut SqliteConnection,
    source_type: &str,
    source_id: i64,
) -> Result<Vec<FinancialTransactionRow>, PersistenceError> {
    Ok(financial_transactions::table
        .filter(
            financial_transactions::source_type
                .eq(source_type)
                .and(financial_transactions::source_id.eq(source_id)),
        )
        .order(financial_transactions::transaction_id.asc())
        .load::<FinancialTransactionRow>(conn)?)
}
