// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary layer for the ClassLedger system.
//!
//! One handler function per endpoint operation. Handlers own input
//! validation, status rule enforcement, audit event emission, and the
//! translation of domain and persistence errors into the API error
//! taxonomy. HTTP concerns (routing, status codes, the JSON envelope)
//! live in the server crate.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod request_response;
mod validation;

#[cfg(test)]
mod tests;

pub use error::{translate_domain_error, translate_persistence_error, ApiError};
pub use handlers::{
    approve_expense_proposal, approve_income_report, auto_apply_preview, cancel_enrollment,
    confirm_payment, create_enrollment, create_expense_proposal, create_income_report,
    delete_enrollment, delete_expense_proposal, delete_income_report, enrollment_statistics,
    get_enrollment, get_expense_proposal, get_income_report, list_enrollments,
    list_expense_proposals, list_income_reports, list_vouchers, mark_expense_proposal_paid,
    reject_expense_proposal, reject_income_report, update_expense_proposal, update_income_report,
    validate_voucher,
};
pub use request_response::{
    ApproveExpenseProposalRequest, ApproveIncomeReportRequest, AutoApplyCampaignResponse,
    CancelEnrollmentRequest, CancelEnrollmentResponse, ConfirmPaymentRequest,
    ConfirmPaymentResponse, CreateEnrollmentRequest, CreateEnrollmentResponse,
    CreateExpenseProposalRequest, CreateIncomeReportRequest, ExpenseProposalActionResponse,
    IncomeReportActionResponse, MarkExpenseProposalPaidRequest, RejectRequest,
    UpdateExpenseProposalRequest, UpdateIncomeReportRequest, ValidateVoucherRequest,
    ValidateVoucherResponse,
};
pub use validation::ValidationError;
