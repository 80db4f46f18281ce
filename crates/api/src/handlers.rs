// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API handler functions for state-changing and read-only operations.
//!
//! Each handler validates input, enforces status rules via the domain
//! crate, performs the persistence work, and records one audit event
//! per successful mutation. Best-effort discount bookkeeping failures
//! surface as structured warnings on the response, never as failures of
//! the primary write.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use tracing::warn;

use classledger_audit::{Actor, AuditEvent, BookkeepingWarning, EntityRef};
use classledger_domain::{
    best_auto_apply, select_discount, Campaign, CampaignQuote, DiscountSelection, EnrollmentStatus,
    ExpenseProposalStatus, IncomeReportStatus, Product, StudentRef, Voucher, VoucherQuote,
};
use classledger_persistence::{
    EnrollmentFilter, EnrollmentPayment, EnrollmentRow, EnrollmentStatistics,
    ExpenseProposalChanges, ExpenseProposalRow, FinanceFilter, IncomeReportChanges, IncomeReportRow,
    NewEnrollment, NewExpenseProposal, NewIncomeReport, Persistence, PersistenceError,
};

use crate::error::{translate_domain_error, translate_persistence_error, ApiError};
use crate::request_response::{
    ApproveExpenseProposalRequest, ApproveIncomeReportRequest, AutoApplyCampaignResponse,
    CancelEnrollmentRequest, CancelEnrollmentResponse, ConfirmPaymentRequest,
    ConfirmPaymentResponse, CreateEnrollmentRequest, CreateEnrollmentResponse,
    CreateExpenseProposalRequest, CreateIncomeReportRequest, ExpenseProposalActionResponse,
    IncomeReportActionResponse, MarkExpenseProposalPaidRequest, RejectRequest,
    UpdateExpenseProposalRequest, UpdateIncomeReportRequest, ValidateVoucherRequest,
    ValidateVoucherResponse,
};
use crate::validation::{require_non_empty, require_positive};

/// Builds the audit actor for an optional staff id.
fn actor_for(staff_id: Option<i64>) -> Actor {
    staff_id.map_or_else(Actor::system, Actor::staff)
}

/// Persists an audit event. A failure here must not undo the operation
/// that already committed, so it is logged and swallowed.
fn record_audit(persistence: &mut Persistence, event: &AuditEvent) {
    if let Err(e) = persistence.persist_audit_event(event) {
        warn!(action = %event.action, error = %e, "Failed to persist audit event");
    }
}

/// Maps a guarded-update `NotFound` onto a status conflict.
///
/// The handler has already confirmed the row exists, so a zero-row
/// update means the status moved underneath us.
fn conflict_on_not_found(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::DomainRuleViolation {
            rule: String::from("status_transition"),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}

fn internal(err: &PersistenceError) -> ApiError {
    ApiError::Internal {
        message: err.to_string(),
    }
}

// ============================================================================
// Enrollments
// ============================================================================

/// Resolves the student reference for an enrollment request.
///
/// A child must belong to the requesting customer; otherwise the
/// customer enrolls themselves.
fn resolve_student(
    persistence: &mut Persistence,
    customer_id: i64,
    child_id: Option<i64>,
) -> Result<StudentRef, ApiError> {
    let Some(child_id) = child_id else {
        return Ok(StudentRef::Customer(customer_id));
    };

    let belongs: bool = persistence
        .child_belongs_to(customer_id, child_id)
        .map_err(|e| internal(&e))?;
    if !belongs {
        return Err(ApiError::InvalidInput {
            field: String::from("child_id"),
            message: format!("Child {child_id} does not belong to customer {customer_id}"),
        });
    }
    Ok(StudentRef::Child(child_id))
}

/// Resolves the requested voucher, by id or code, into a quote.
///
/// A voucher that exists but fails an eligibility gate is skipped with
/// a warning; the enrollment proceeds undiscounted. An unknown voucher
/// id or code is still an error: the caller named a voucher that is
/// not there.
fn resolve_requested_voucher(
    persistence: &mut Persistence,
    request: &CreateEnrollmentRequest,
    product: &Product,
    order_amount: i64,
    now: DateTime<Utc>,
    warnings: &mut Vec<BookkeepingWarning>,
) -> Result<Option<VoucherQuote>, ApiError> {
    let voucher: Voucher = if let Some(voucher_id) = request.voucher_id {
        persistence
            .get_voucher(voucher_id)
            .map_err(|e| translate_persistence_error("Voucher", e))?
    } else if let Some(code) = request
        .voucher_code
        .as_deref()
        .filter(|code| !code.trim().is_empty())
    {
        persistence
            .get_voucher_by_code(code)
            .map_err(|e| translate_persistence_error("Voucher", e))?
    } else {
        return Ok(None);
    };

    let prior_uses: i64 = persistence
        .count_customer_voucher_uses(voucher.voucher_id, request.customer_id)
        .map_err(|e| internal(&e))?;

    match voucher.evaluate(request.customer_id, prior_uses, product, order_amount, now) {
        Ok(amount) => Ok(Some(VoucherQuote {
            voucher_id: voucher.voucher_id,
            code: voucher.code,
            amount,
        })),
        Err(rejection) => {
            warn!(code = %voucher.code, reason = %rejection, "Requested voucher not applied");
            warnings.push(BookkeepingWarning::VoucherNotApplied {
                code: voucher.code,
                detail: rejection.to_string(),
            });
            Ok(None)
        }
    }
}

/// Resolves the requested campaign into a quote. Campaigns are never
/// picked up implicitly at create time; auto-apply selection is the
/// separate read-only preview.
fn resolve_requested_campaign(
    persistence: &mut Persistence,
    campaign_id: Option<i64>,
    product: &Product,
    order_amount: i64,
    now: DateTime<Utc>,
    warnings: &mut Vec<BookkeepingWarning>,
) -> Result<Option<CampaignQuote>, ApiError> {
    let Some(campaign_id) = campaign_id else {
        return Ok(None);
    };
    let campaign: Campaign = persistence
        .get_campaign(campaign_id)
        .map_err(|e| translate_persistence_error("Campaign", e))?;

    match campaign.evaluate(product, order_amount, now) {
        Ok(amount) => Ok(Some(CampaignQuote {
            campaign_id,
            amount,
        })),
        Err(rejection) => {
            warn!(campaign_id, reason = %rejection, "Requested campaign not applied");
            warnings.push(BookkeepingWarning::CampaignNotApplied {
                campaign_id,
                detail: rejection.to_string(),
            });
            Ok(None)
        }
    }
}

/// Creates an enrollment with resolved discounts and its pending income
/// report.
///
/// Only a voucher or campaign the request names is considered; an
/// ineligible one is skipped with a warning and the enrollment goes
/// through undiscounted. The enrollment and report are one transaction.
/// Discount usage bookkeeping runs after that transaction commits;
/// failures there become warnings on the response.
///
/// # Errors
///
/// Returns an error if the customer, child, product, voucher or
/// campaign lookup fails, or the write fails.
pub fn create_enrollment(
    persistence: &mut Persistence,
    request: CreateEnrollmentRequest,
    now: DateTime<Utc>,
) -> Result<CreateEnrollmentResponse, ApiError> {
    persistence
        .get_customer(request.customer_id)
        .map_err(|e| translate_persistence_error("Customer", e))?;
    let student: StudentRef =
        resolve_student(persistence, request.customer_id, request.child_id)?;
    let product: Product = persistence
        .get_product(request.product_id)
        .map_err(|e| translate_persistence_error("Product", e))?;

    let original_price: i64 = product.current_price();

    let mut warnings: Vec<BookkeepingWarning> = Vec::new();
    let voucher_quote: Option<VoucherQuote> = resolve_requested_voucher(
        persistence,
        &request,
        &product,
        original_price,
        now,
        &mut warnings,
    )?;
    let campaign_quote: Option<CampaignQuote> = resolve_requested_campaign(
        persistence,
        request.campaign_id,
        &product,
        original_price,
        now,
        &mut warnings,
    )?;

    let selection: DiscountSelection = select_discount(voucher_quote, campaign_quote);
    let discount_amount: i64 = selection.amount();
    let final_price: i64 = original_price - discount_amount;

    let (voucher_id, voucher_code, campaign_id) = match &selection {
        DiscountSelection::None => (None, None, None),
        DiscountSelection::Voucher {
            voucher_id, code, ..
        } => (Some(*voucher_id), Some(code.clone()), None),
        DiscountSelection::Campaign { campaign_id, .. } => (None, None, Some(*campaign_id)),
    };

    let new_enrollment = NewEnrollment {
        customer_id: request.customer_id,
        student,
        product_id: product.product_id,
        branch_id: request.branch_id,
        original_price,
        discount_amount,
        final_price,
        voucher_id,
        voucher_code: voucher_code.clone(),
        campaign_id,
        total_sessions: product.total_sessions,
        price_per_session: product.price_per_session,
        notes: request.notes,
    };

    let report_title: String = format!("Enrollment payment - {}", product.name);
    let (enrollment_id, income_report_id) = persistence
        .create_enrollment_with_income_report(&new_enrollment, &report_title, now)
        .map_err(|e| internal(&e))?;

    // The enrollment is committed; from here on nothing may fail it.
    match &selection {
        DiscountSelection::Voucher {
            voucher_id, amount, ..
        } => {
            if let Err(e) = persistence.record_voucher_usage(
                *voucher_id,
                request.customer_id,
                enrollment_id,
                *amount,
                now,
            ) {
                warn!(voucher_id, enrollment_id, error = %e, "Voucher usage not recorded");
                warnings.push(BookkeepingWarning::VoucherUsageNotRecorded {
                    voucher_id: *voucher_id,
                    detail: e.to_string(),
                });
            }
        }
        DiscountSelection::Campaign { campaign_id, .. } => {
            if let Err(e) = persistence.increment_campaign_usage(*campaign_id) {
                warn!(campaign_id, enrollment_id, error = %e, "Campaign usage not recorded");
                warnings.push(BookkeepingWarning::CampaignUsageNotRecorded {
                    campaign_id: *campaign_id,
                    detail: e.to_string(),
                });
            }
        }
        DiscountSelection::None => {}
    }

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("CreateEnrollment"),
            EntityRef::new(String::from("enrollment"), enrollment_id),
            None,
            Some(String::from("pending")),
            None,
            now,
        ),
    );

    Ok(CreateEnrollmentResponse {
        enrollment_id,
        income_report_id,
        status: String::from("pending"),
        original_price,
        discount_amount,
        final_price,
        voucher_code,
        campaign_id,
        warnings,
    })
}

/// Records a payment against an enrollment via the student's wallet.
///
/// Full payment moves the enrollment through `paid` straight to
/// `active`; a partial payment leaves the status alone and recomputes
/// the remaining amount.
///
/// # Errors
///
/// Returns an error if the enrollment is missing, already settled or
/// cancelled, or the deposit fails.
pub fn confirm_payment(
    persistence: &mut Persistence,
    enrollment_id: i64,
    request: ConfirmPaymentRequest,
    now: DateTime<Utc>,
) -> Result<ConfirmPaymentResponse, ApiError> {
    require_positive("amount", request.amount)?;

    let enrollment: EnrollmentRow = persistence
        .get_enrollment(enrollment_id)
        .map_err(|e| translate_persistence_error("Enrollment", e))?;
    let status: EnrollmentStatus =
        EnrollmentStatus::from_str(&enrollment.status).map_err(translate_domain_error)?;

    if !matches!(
        status,
        EnrollmentStatus::Pending | EnrollmentStatus::Approved
    ) {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("payment_state"),
            message: format!(
                "Cannot record a payment for enrollment in status '{}'",
                enrollment.status
            ),
        });
    }

    let student: StudentRef = StudentRef::from_parts(&enrollment.student_type, enrollment.student_id)
        .map_err(translate_domain_error)?;

    let paid_amount: i64 = enrollment.paid_amount + request.amount;
    let remaining_amount: i64 = (enrollment.final_price - paid_amount).max(0);
    let new_status: &str = if paid_amount >= enrollment.final_price {
        EnrollmentStatus::Active.as_str()
    } else {
        &enrollment.status
    };

    // One transaction for the deposit and the payment columns; the
    // returned balance is read after the deposit inside it.
    let payment = EnrollmentPayment {
        enrollment_id,
        student,
        amount: request.amount,
        payment_method: request.payment_method.clone(),
        paid_amount,
        remaining_amount,
        status: String::from(new_status),
    };
    let wallet_balance: i64 = persistence
        .record_enrollment_payment(&payment, now)
        .map_err(|e| internal(&e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("ConfirmPayment"),
            EntityRef::new(String::from("enrollment"), enrollment_id),
            Some(enrollment.status.clone()),
            Some(payment.status.clone()),
            Some(format!("Received {}", request.amount)),
            now,
        ),
    );

    Ok(ConfirmPaymentResponse {
        enrollment_id,
        status: payment.status,
        paid_amount,
        remaining_amount,
        wallet_balance,
    })
}

/// Cancels an enrollment and releases its voucher usage.
///
/// # Errors
///
/// Returns an error if the enrollment is missing, the status forbids
/// cancellation, or the reason is empty.
pub fn cancel_enrollment(
    persistence: &mut Persistence,
    enrollment_id: i64,
    request: CancelEnrollmentRequest,
    now: DateTime<Utc>,
) -> Result<CancelEnrollmentResponse, ApiError> {
    require_non_empty("reason", &request.reason)?;

    let enrollment: EnrollmentRow = persistence
        .get_enrollment(enrollment_id)
        .map_err(|e| translate_persistence_error("Enrollment", e))?;
    let status: EnrollmentStatus =
        EnrollmentStatus::from_str(&enrollment.status).map_err(translate_domain_error)?;
    status.validate_cancel().map_err(translate_domain_error)?;

    persistence
        .set_enrollment_cancelled(enrollment_id, &request.reason, now)
        .map_err(|e| internal(&e))?;

    let mut warnings: Vec<BookkeepingWarning> = Vec::new();
    if let Some(voucher_id) = enrollment.voucher_id
        && let Err(e) = persistence.release_voucher_usage(voucher_id, enrollment_id)
    {
        warn!(voucher_id, enrollment_id, error = %e, "Voucher usage not released");
        warnings.push(BookkeepingWarning::VoucherUsageNotReleased {
            voucher_id,
            detail: e.to_string(),
        });
    }

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("CancelEnrollment"),
            EntityRef::new(String::from("enrollment"), enrollment_id),
            Some(enrollment.status),
            Some(String::from("cancelled")),
            Some(request.reason),
            now,
        ),
    );

    Ok(CancelEnrollmentResponse {
        enrollment_id,
        status: String::from("cancelled"),
        warnings,
    })
}

/// Deletes an enrollment.
///
/// Deletion is refused for enrollments that progressed past `pending`
/// (other than cancellation) and, independently, whenever an approved
/// income report is linked to the enrollment.
///
/// # Errors
///
/// Returns an error if the enrollment is missing or protected.
pub fn delete_enrollment(
    persistence: &mut Persistence,
    enrollment_id: i64,
    staff_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let enrollment: EnrollmentRow = persistence
        .get_enrollment(enrollment_id)
        .map_err(|e| translate_persistence_error("Enrollment", e))?;
    let status: EnrollmentStatus =
        EnrollmentStatus::from_str(&enrollment.status).map_err(translate_domain_error)?;

    if status.blocks_deletion() {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("enrollment_deletion"),
            message: format!("Cannot delete enrollment in status '{}'", enrollment.status),
        });
    }
    let has_approved: bool = persistence
        .has_approved_income_report(enrollment_id)
        .map_err(|e| internal(&e))?;
    if has_approved {
        return Err(ApiError::DomainRuleViolation {
            rule: String::from("enrollment_deletion"),
            message: format!(
                "Enrollment {enrollment_id} has an approved income report and cannot be deleted"
            ),
        });
    }

    persistence
        .delete_enrollment(enrollment_id)
        .map_err(|e| translate_persistence_error("Enrollment", e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(staff_id),
            String::from("DeleteEnrollment"),
            EntityRef::new(String::from("enrollment"), enrollment_id),
            Some(enrollment.status),
            None,
            None,
            now,
        ),
    );

    Ok(())
}

/// Lists enrollments matching the filter.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_enrollments(
    persistence: &mut Persistence,
    filter: &EnrollmentFilter,
) -> Result<Vec<EnrollmentRow>, ApiError> {
    persistence.list_enrollments(filter).map_err(|e| internal(&e))
}

/// Fetches a single enrollment.
///
/// # Errors
///
/// Returns an error if the enrollment does not exist.
pub fn get_enrollment(
    persistence: &mut Persistence,
    enrollment_id: i64,
) -> Result<EnrollmentRow, ApiError> {
    persistence
        .get_enrollment(enrollment_id)
        .map_err(|e| translate_persistence_error("Enrollment", e))
}

/// Aggregates enrollment counts and revenue.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn enrollment_statistics(
    persistence: &mut Persistence,
) -> Result<EnrollmentStatistics, ApiError> {
    persistence.enrollment_statistics().map_err(|e| internal(&e))
}

// ============================================================================
// Vouchers and campaigns
// ============================================================================

/// Checks whether a voucher can currently be used by a customer for a
/// product, without redeeming anything.
///
/// The gates run in their fixed order and the first failure is the
/// answer. The optional `amount` lets a caller check a prospective
/// order total; without it the product's current price is used.
///
/// # Errors
///
/// Returns `ResourceNotFound` for an unknown code or product and a
/// `voucher_eligibility` violation naming the first failed gate.
pub fn validate_voucher(
    persistence: &mut Persistence,
    request: &ValidateVoucherRequest,
    now: DateTime<Utc>,
) -> Result<ValidateVoucherResponse, ApiError> {
    if let Some(amount) = request.amount {
        require_positive("amount", amount)?;
    }

    let product: Product = persistence
        .get_product(request.product_id)
        .map_err(|e| translate_persistence_error("Product", e))?;
    let voucher: Voucher = persistence
        .get_voucher_by_code(&request.code)
        .map_err(|e| translate_persistence_error("Voucher", e))?;
    let prior_uses: i64 = persistence
        .count_customer_voucher_uses(voucher.voucher_id, request.customer_id)
        .map_err(|e| internal(&e))?;

    let order_amount: i64 = request.amount.unwrap_or_else(|| product.current_price());
    let discount_amount: i64 = voucher
        .evaluate(request.customer_id, prior_uses, &product, order_amount, now)
        .map_err(|rejection| ApiError::DomainRuleViolation {
            rule: String::from("voucher_eligibility"),
            message: rejection.to_string(),
        })?;

    Ok(ValidateVoucherResponse {
        voucher_id: voucher.voucher_id,
        code: voucher.code,
        discount_amount,
        final_amount: order_amount - discount_amount,
    })
}

/// Lists vouchers, optionally only active ones.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_vouchers(
    persistence: &mut Persistence,
    active_only: bool,
) -> Result<Vec<Voucher>, ApiError> {
    persistence
        .list_vouchers(active_only)
        .map_err(|e| internal(&e))
}

/// Previews the auto-apply campaign that would win for a product right
/// now. `None` means no campaign qualifies, which is not an error.
///
/// # Errors
///
/// Returns an error if the product does not exist or the query fails.
pub fn auto_apply_preview(
    persistence: &mut Persistence,
    product_id: i64,
    now: DateTime<Utc>,
) -> Result<Option<AutoApplyCampaignResponse>, ApiError> {
    let product: Product = persistence
        .get_product(product_id)
        .map_err(|e| translate_persistence_error("Product", e))?;
    let campaigns: Vec<Campaign> = persistence
        .list_auto_apply_campaigns()
        .map_err(|e| internal(&e))?;

    let order_amount: i64 = product.current_price();
    Ok(
        best_auto_apply(&campaigns, &product, order_amount, now).map(|(campaign, amount)| {
            AutoApplyCampaignResponse {
                campaign_id: campaign.campaign_id,
                name: campaign.name.clone(),
                discount_amount: amount,
                final_price: order_amount - amount,
            }
        }),
    )
}

// ============================================================================
// Income reports
// ============================================================================

/// Creates an income report. The stored status is always `pending`.
///
/// # Errors
///
/// Returns an error if validation or the insert fails.
pub fn create_income_report(
    persistence: &mut Persistence,
    request: CreateIncomeReportRequest,
    now: DateTime<Utc>,
) -> Result<IncomeReportActionResponse, ApiError> {
    require_non_empty("title", &request.title)?;
    require_positive("amount", request.amount)?;
    require_non_empty("payment_method", &request.payment_method)?;

    let report = NewIncomeReport {
        title: request.title,
        amount: request.amount,
        payment_method: request.payment_method,
        payer_info: request.payer_info,
        category: request.category,
        financial_plan_id: request.financial_plan_id,
        account_item_id: request.account_item_id,
        branch_id: request.branch_id,
        report_date: request.report_date.unwrap_or(now),
        notes: request.notes,
    };
    let income_report_id: i64 = persistence
        .create_income_report(&report, now)
        .map_err(|e| internal(&e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("CreateIncomeReport"),
            EntityRef::new(String::from("income_report"), income_report_id),
            None,
            Some(String::from("pending")),
            None,
            now,
        ),
    );

    Ok(IncomeReportActionResponse {
        income_report_id,
        status: String::from("pending"),
        transaction_id: None,
        warnings: Vec::new(),
    })
}

/// Lists income reports matching the filter.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_income_reports(
    persistence: &mut Persistence,
    filter: &FinanceFilter,
) -> Result<Vec<IncomeReportRow>, ApiError> {
    persistence
        .list_income_reports(filter)
        .map_err(|e| internal(&e))
}

/// Fetches a single income report.
///
/// # Errors
///
/// Returns an error if the report does not exist.
pub fn get_income_report(
    persistence: &mut Persistence,
    income_report_id: i64,
) -> Result<IncomeReportRow, ApiError> {
    persistence
        .get_income_report(income_report_id)
        .map_err(|e| translate_persistence_error("Income report", e))
}

/// Updates a pending income report.
///
/// # Errors
///
/// Returns an error if the report is missing or no longer pending.
pub fn update_income_report(
    persistence: &mut Persistence,
    income_report_id: i64,
    request: UpdateIncomeReportRequest,
    now: DateTime<Utc>,
) -> Result<IncomeReportActionResponse, ApiError> {
    let report: IncomeReportRow = persistence
        .get_income_report(income_report_id)
        .map_err(|e| translate_persistence_error("Income report", e))?;
    let status: IncomeReportStatus =
        IncomeReportStatus::from_str(&report.status).map_err(translate_domain_error)?;
    status.validate_update().map_err(translate_domain_error)?;

    if let Some(amount) = request.amount {
        require_positive("amount", amount)?;
    }
    if let Some(title) = &request.title {
        require_non_empty("title", title)?;
    }

    let changes = IncomeReportChanges {
        title: request.title,
        amount: request.amount,
        payment_method: request.payment_method,
        category: request.category,
        branch_id: request.branch_id,
        report_date: request.report_date,
        notes: request.notes,
    };
    persistence
        .update_income_report(income_report_id, &changes, now)
        .map_err(|e| internal(&e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("UpdateIncomeReport"),
            EntityRef::new(String::from("income_report"), income_report_id),
            Some(report.status.clone()),
            Some(report.status),
            None,
            now,
        ),
    );

    Ok(IncomeReportActionResponse {
        income_report_id,
        status: String::from("pending"),
        transaction_id: None,
        warnings: Vec::new(),
    })
}

/// Approves a pending income report and stages one `approved` ledger
/// row. No cash account balance moves here; settlement belongs to the
/// external verification workflow.
///
/// # Errors
///
/// Returns an error if the report is missing or not pending.
pub fn approve_income_report(
    persistence: &mut Persistence,
    income_report_id: i64,
    request: ApproveIncomeReportRequest,
    now: DateTime<Utc>,
) -> Result<IncomeReportActionResponse, ApiError> {
    let report: IncomeReportRow = persistence
        .get_income_report(income_report_id)
        .map_err(|e| translate_persistence_error("Income report", e))?;
    let status: IncomeReportStatus =
        IncomeReportStatus::from_str(&report.status).map_err(translate_domain_error)?;
    status.validate_approve().map_err(translate_domain_error)?;

    let transaction_id: i64 = persistence
        .approve_income_report(
            income_report_id,
            request.staff_id,
            request.cash_account_id,
            request.payment_method.as_deref(),
            request.payment_ref.as_deref(),
            now,
        )
        .map_err(conflict_on_not_found)?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("ApproveIncomeReport"),
            EntityRef::new(String::from("income_report"), income_report_id),
            Some(report.status),
            Some(String::from("approved")),
            None,
            now,
        ),
    );

    Ok(IncomeReportActionResponse {
        income_report_id,
        status: String::from("approved"),
        transaction_id: Some(transaction_id),
        warnings: Vec::new(),
    })
}

/// Rejects a pending income report and releases the linked enrollment's
/// voucher usage, when there is one.
///
/// # Errors
///
/// Returns an error if the report is missing, not pending, or the
/// reason is empty.
pub fn reject_income_report(
    persistence: &mut Persistence,
    income_report_id: i64,
    request: RejectRequest,
    now: DateTime<Utc>,
) -> Result<IncomeReportActionResponse, ApiError> {
    require_non_empty("reason", &request.reason)?;

    let report: IncomeReportRow = persistence
        .get_income_report(income_report_id)
        .map_err(|e| translate_persistence_error("Income report", e))?;
    let status: IncomeReportStatus =
        IncomeReportStatus::from_str(&report.status).map_err(translate_domain_error)?;
    status.validate_reject().map_err(translate_domain_error)?;

    persistence
        .reject_income_report(income_report_id, &request.reason, now)
        .map_err(conflict_on_not_found)?;

    let mut warnings: Vec<BookkeepingWarning> = Vec::new();
    if let Some(enrollment_id) = report.linked_enrollment_id()
        && let Ok(enrollment) = persistence.get_enrollment(enrollment_id)
        && let Some(voucher_id) = enrollment.voucher_id
        && let Err(e) = persistence.release_voucher_usage(voucher_id, enrollment_id)
    {
        warn!(voucher_id, enrollment_id, error = %e, "Voucher usage not released");
        warnings.push(BookkeepingWarning::VoucherUsageNotReleased {
            voucher_id,
            detail: e.to_string(),
        });
    }

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("RejectIncomeReport"),
            EntityRef::new(String::from("income_report"), income_report_id),
            Some(report.status),
            Some(String::from("rejected")),
            Some(request.reason),
            now,
        ),
    );

    Ok(IncomeReportActionResponse {
        income_report_id,
        status: String::from("rejected"),
        transaction_id: None,
        warnings,
    })
}

/// Deletes an income report. Only pending and rejected reports may be
/// removed.
///
/// # Errors
///
/// Returns an error if the report is missing or its status protects it.
pub fn delete_income_report(
    persistence: &mut Persistence,
    income_report_id: i64,
    staff_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let report: IncomeReportRow = persistence
        .get_income_report(income_report_id)
        .map_err(|e| translate_persistence_error("Income report", e))?;
    let status: IncomeReportStatus =
        IncomeReportStatus::from_str(&report.status).map_err(translate_domain_error)?;
    status.validate_delete().map_err(translate_domain_error)?;

    persistence
        .delete_income_report(income_report_id)
        .map_err(|e| translate_persistence_error("Income report", e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(staff_id),
            String::from("DeleteIncomeReport"),
            EntityRef::new(String::from("income_report"), income_report_id),
            Some(report.status),
            None,
            None,
            now,
        ),
    );

    Ok(())
}

// ============================================================================
// Expense proposals
// ============================================================================

/// Creates an expense proposal and its `pending` ledger row.
///
/// # Errors
///
/// Returns an error if validation or the insert fails.
pub fn create_expense_proposal(
    persistence: &mut Persistence,
    request: CreateExpenseProposalRequest,
    now: DateTime<Utc>,
) -> Result<ExpenseProposalActionResponse, ApiError> {
    require_non_empty("title", &request.title)?;
    require_positive("amount", request.amount)?;

    let proposal = NewExpenseProposal {
        title: request.title,
        amount: request.amount,
        category: request.category,
        financial_plan_id: request.financial_plan_id,
        cash_account_id: request.cash_account_id,
        branch_id: request.branch_id,
        proposal_date: request.proposal_date.unwrap_or(now),
        notes: request.notes,
    };
    let (expense_proposal_id, transaction_id) = persistence
        .create_expense_proposal(&proposal, now)
        .map_err(|e| internal(&e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("CreateExpenseProposal"),
            EntityRef::new(String::from("expense_proposal"), expense_proposal_id),
            None,
            Some(String::from("pending")),
            None,
            now,
        ),
    );

    Ok(ExpenseProposalActionResponse {
        expense_proposal_id,
        status: String::from("pending"),
        transaction_id: Some(transaction_id),
    })
}

/// Lists expense proposals matching the filter.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_expense_proposals(
    persistence: &mut Persistence,
    filter: &FinanceFilter,
) -> Result<Vec<ExpenseProposalRow>, ApiError> {
    persistence
        .list_expense_proposals(filter)
        .map_err(|e| internal(&e))
}

/// Fetches a single expense proposal.
///
/// # Errors
///
/// Returns an error if the proposal does not exist.
pub fn get_expense_proposal(
    persistence: &mut Persistence,
    expense_proposal_id: i64,
) -> Result<ExpenseProposalRow, ApiError> {
    persistence
        .get_expense_proposal(expense_proposal_id)
        .map_err(|e| translate_persistence_error("Expense proposal", e))
}

/// Updates a pending expense proposal, mirroring title and amount into
/// its pending ledger row.
///
/// # Errors
///
/// Returns an error if the proposal is missing or no longer pending.
pub fn update_expense_proposal(
    persistence: &mut Persistence,
    expense_proposal_id: i64,
    request: UpdateExpenseProposalRequest,
    now: DateTime<Utc>,
) -> Result<ExpenseProposalActionResponse, ApiError> {
    let proposal: ExpenseProposalRow = persistence
        .get_expense_proposal(expense_proposal_id)
        .map_err(|e| translate_persistence_error("Expense proposal", e))?;
    let status: ExpenseProposalStatus =
        ExpenseProposalStatus::from_str(&proposal.status).map_err(translate_domain_error)?;
    status.validate_update().map_err(translate_domain_error)?;

    if let Some(amount) = request.amount {
        require_positive("amount", amount)?;
    }
    if let Some(title) = &request.title {
        require_non_empty("title", title)?;
    }

    let changes = ExpenseProposalChanges {
        title: request.title,
        amount: request.amount,
        category: request.category,
        branch_id: request.branch_id,
        proposal_date: request.proposal_date,
        notes: request.notes,
    };
    persistence
        .update_expense_proposal(expense_proposal_id, &changes, now)
        .map_err(|e| internal(&e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("UpdateExpenseProposal"),
            EntityRef::new(String::from("expense_proposal"), expense_proposal_id),
            Some(proposal.status.clone()),
            Some(proposal.status),
            None,
            now,
        ),
    );

    Ok(ExpenseProposalActionResponse {
        expense_proposal_id,
        status: String::from("pending"),
        transaction_id: None,
    })
}

/// Approves a pending expense proposal. The ledger row staged at
/// creation stays `pending` until the proposal is actually paid.
///
/// # Errors
///
/// Returns an error if the proposal is missing or not pending.
pub fn approve_expense_proposal(
    persistence: &mut Persistence,
    expense_proposal_id: i64,
    request: ApproveExpenseProposalRequest,
    now: DateTime<Utc>,
) -> Result<ExpenseProposalActionResponse, ApiError> {
    let proposal: ExpenseProposalRow = persistence
        .get_expense_proposal(expense_proposal_id)
        .map_err(|e| translate_persistence_error("Expense proposal", e))?;
    let status: ExpenseProposalStatus =
        ExpenseProposalStatus::from_str(&proposal.status).map_err(translate_domain_error)?;
    status.validate_approve().map_err(translate_domain_error)?;

    persistence
        .approve_expense_proposal(expense_proposal_id, request.staff_id, now)
        .map_err(conflict_on_not_found)?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("ApproveExpenseProposal"),
            EntityRef::new(String::from("expense_proposal"), expense_proposal_id),
            Some(proposal.status),
            Some(String::from("approved")),
            None,
            now,
        ),
    );

    Ok(ExpenseProposalActionResponse {
        expense_proposal_id,
        status: String::from("approved"),
        transaction_id: None,
    })
}

/// Rejects a pending expense proposal.
///
/// # Errors
///
/// Returns an error if the proposal is missing, not pending, or the
/// reason is empty.
pub fn reject_expense_proposal(
    persistence: &mut Persistence,
    expense_proposal_id: i64,
    request: RejectRequest,
    now: DateTime<Utc>,
) -> Result<ExpenseProposalActionResponse, ApiError> {
    require_non_empty("reason", &request.reason)?;

    let proposal: ExpenseProposalRow = persistence
        .get_expense_proposal(expense_proposal_id)
        .map_err(|e| translate_persistence_error("Expense proposal", e))?;
    let status: ExpenseProposalStatus =
        ExpenseProposalStatus::from_str(&proposal.status).map_err(translate_domain_error)?;
    status.validate_reject().map_err(translate_domain_error)?;

    persistence
        .reject_expense_proposal(expense_proposal_id, &request.reason, now)
        .map_err(conflict_on_not_found)?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("RejectExpenseProposal"),
            EntityRef::new(String::from("expense_proposal"), expense_proposal_id),
            Some(proposal.status),
            Some(String::from("rejected")),
            Some(request.reason),
            now,
        ),
    );

    Ok(ExpenseProposalActionResponse {
        expense_proposal_id,
        status: String::from("rejected"),
        transaction_id: None,
    })
}

/// Marks an approved expense proposal paid, staging the second ledger
/// row that carries the settlement details.
///
/// # Errors
///
/// Returns an error if the proposal is missing, not approved, or the
/// payment method is empty.
pub fn mark_expense_proposal_paid(
    persistence: &mut Persistence,
    expense_proposal_id: i64,
    request: MarkExpenseProposalPaidRequest,
    now: DateTime<Utc>,
) -> Result<ExpenseProposalActionResponse, ApiError> {
    require_non_empty("payment_method", &request.payment_method)?;

    let proposal: ExpenseProposalRow = persistence
        .get_expense_proposal(expense_proposal_id)
        .map_err(|e| translate_persistence_error("Expense proposal", e))?;
    let status: ExpenseProposalStatus =
        ExpenseProposalStatus::from_str(&proposal.status).map_err(translate_domain_error)?;
    status.validate_mark_paid().map_err(translate_domain_error)?;

    let transaction_id: i64 = persistence
        .mark_expense_proposal_paid(
            expense_proposal_id,
            request.payment_date.unwrap_or(now),
            &request.payment_method,
            request.payment_ref.as_deref(),
            now,
        )
        .map_err(conflict_on_not_found)?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(request.staff_id),
            String::from("MarkExpenseProposalPaid"),
            EntityRef::new(String::from("expense_proposal"), expense_proposal_id),
            Some(proposal.status),
            Some(String::from("paid")),
            None,
            now,
        ),
    );

    Ok(ExpenseProposalActionResponse {
        expense_proposal_id,
        status: String::from("paid"),
        transaction_id: Some(transaction_id),
    })
}

/// Deletes an expense proposal and its ledger rows. Only pending and
/// rejected proposals may be removed.
///
/// # Errors
///
/// Returns an error if the proposal is missing or its status protects
/// it.
pub fn delete_expense_proposal(
    persistence: &mut Persistence,
    expense_proposal_id: i64,
    staff_id: Option<i64>,
    now: DateTime<Utc>,
) -> Result<(), ApiError> {
    let proposal: ExpenseProposalRow = persistence
        .get_expense_proposal(expense_proposal_id)
        .map_err(|e| translate_persistence_error("Expense proposal", e))?;
    let status: ExpenseProposalStatus =
        ExpenseProposalStatus::from_str(&proposal.status).map_err(translate_domain_error)?;
    status.validate_delete().map_err(translate_domain_error)?;

    persistence
        .delete_expense_proposal(expense_proposal_id)
        .map_err(|e| translate_persistence_error("Expense proposal", e))?;

    record_audit(
        persistence,
        &AuditEvent::new(
            actor_for(staff_id),
            String::from("DeleteExpenseProposal"),
            EntityRef::new(String::from("expense_proposal"), expense_proposal_id),
            Some(proposal.status),
            None,
            None,
            now,
        ),
    );

    Ok(())
}
