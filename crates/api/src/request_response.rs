// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response DTOs for the API boundary.
//!
//! These are distinct from domain types and represent the wire contract.
//! Every mutating request may carry a `staff_id`; when absent the action
//! is attributed to the system actor in the audit trail.

use chrono::{DateTime, Utc};
use classledger_audit::BookkeepingWarning;
use serde::{Deserialize, Serialize};

// ============================================================================
// Enrollments
// ============================================================================

/// Request to create an enrollment.
///
/// When `child_id` is set the student is that child, otherwise the
/// customer enrolls themselves. Discounts are opt-in: a voucher by id
/// or code, a campaign by id. Nothing the request does not name is
/// applied.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateEnrollmentRequest {
    pub customer_id: i64,
    pub child_id: Option<i64>,
    pub product_id: i64,
    pub branch_id: Option<i64>,
    /// Takes precedence over `voucher_code` when both are present.
    pub voucher_id: Option<i64>,
    pub voucher_code: Option<String>,
    pub campaign_id: Option<i64>,
    pub notes: Option<String>,
    pub staff_id: Option<i64>,
}

/// Response for a successful enrollment creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateEnrollmentResponse {
    pub enrollment_id: i64,
    pub income_report_id: i64,
    pub status: String,
    pub original_price: i64,
    pub discount_amount: i64,
    pub final_price: i64,
    pub voucher_code: Option<String>,
    pub campaign_id: Option<i64>,
    /// Best-effort bookkeeping problems that did not fail the creation.
    pub warnings: Vec<BookkeepingWarning>,
}

/// Request to record a payment against an enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConfirmPaymentRequest {
    pub amount: i64,
    pub payment_method: Option<String>,
    pub staff_id: Option<i64>,
}

/// Response after a payment confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmPaymentResponse {
    pub enrollment_id: i64,
    pub status: String,
    pub paid_amount: i64,
    pub remaining_amount: i64,
    pub wallet_balance: i64,
}

/// Request to cancel an enrollment. The reason is mandatory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CancelEnrollmentRequest {
    pub reason: String,
    pub staff_id: Option<i64>,
}

/// Response after cancelling an enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CancelEnrollmentResponse {
    pub enrollment_id: i64,
    pub status: String,
    pub warnings: Vec<BookkeepingWarning>,
}

// ============================================================================
// Vouchers and campaigns
// ============================================================================

/// Request to check voucher eligibility without redeeming it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ValidateVoucherRequest {
    pub code: String,
    pub customer_id: i64,
    pub product_id: i64,
    /// Prospective order amount. Defaults to the product's current price.
    pub amount: Option<i64>,
}

/// A passing voucher validation. A voucher that fails an eligibility
/// gate is an error response naming the failed gate, never a 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidateVoucherResponse {
    pub voucher_id: i64,
    pub code: String,
    pub discount_amount: i64,
    pub final_amount: i64,
}

/// The auto-apply campaign that would currently win for a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutoApplyCampaignResponse {
    pub campaign_id: i64,
    pub name: String,
    pub discount_amount: i64,
    pub final_price: i64,
}

// ============================================================================
// Income reports
// ============================================================================

/// Request to create an income report. The stored status is always
/// `pending` regardless of anything the caller sends.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateIncomeReportRequest {
    pub title: String,
    pub amount: i64,
    pub payment_method: String,
    pub payer_info: Option<serde_json::Value>,
    pub category: Option<String>,
    /// Financial-plan linkage for reporting, when the caller has one.
    pub financial_plan_id: Option<i64>,
    pub account_item_id: Option<i64>,
    pub branch_id: Option<i64>,
    pub report_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub staff_id: Option<i64>,
}

/// Partial update for a pending income report.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UpdateIncomeReportRequest {
    pub title: Option<String>,
    pub amount: Option<i64>,
    pub payment_method: Option<String>,
    pub category: Option<String>,
    pub branch_id: Option<i64>,
    pub report_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub staff_id: Option<i64>,
}

/// Request to approve a pending income report.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApproveIncomeReportRequest {
    pub cash_account_id: i64,
    pub payment_method: Option<String>,
    pub payment_ref: Option<String>,
    pub staff_id: Option<i64>,
}

/// Request to reject a pending income report or expense proposal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RejectRequest {
    pub reason: String,
    pub staff_id: Option<i64>,
}

/// Response after a state-changing income report action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncomeReportActionResponse {
    pub income_report_id: i64,
    pub status: String,
    /// The staged ledger row, present after approval.
    pub transaction_id: Option<i64>,
    pub warnings: Vec<BookkeepingWarning>,
}

// ============================================================================
// Expense proposals
// ============================================================================

/// Request to create an expense proposal. The financial plan and the
/// cash account the expense will settle against are chosen up front.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateExpenseProposalRequest {
    pub title: String,
    pub amount: i64,
    pub category: Option<String>,
    pub financial_plan_id: i64,
    pub cash_account_id: i64,
    pub branch_id: Option<i64>,
    pub proposal_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub staff_id: Option<i64>,
}

/// Partial update for a pending expense proposal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct UpdateExpenseProposalRequest {
    pub title: Option<String>,
    pub amount: Option<i64>,
    pub category: Option<String>,
    pub branch_id: Option<i64>,
    pub proposal_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub staff_id: Option<i64>,
}

/// Request to approve a pending expense proposal.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ApproveExpenseProposalRequest {
    pub staff_id: Option<i64>,
}

/// Request to settle an approved expense proposal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MarkExpenseProposalPaidRequest {
    pub payment_date: Option<DateTime<Utc>>,
    pub payment_method: String,
    pub payment_ref: Option<String>,
    pub staff_id: Option<i64>,
}

/// Response after a state-changing expense proposal action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseProposalActionResponse {
    pub expense_proposal_id: i64,
    pub status: String,
    /// The staged ledger row, present after create and mark-paid.
    pub transaction_id: Option<i64>,
}
