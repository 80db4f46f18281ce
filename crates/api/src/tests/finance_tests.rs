// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Financial approval workflow tests at the API boundary.

use super::helpers::{
    enrollment_request, seed_customer, seed_product, seed_voucher, setup_persistence, test_now,
};
use crate::error::ApiError;
use crate::handlers::{
    approve_expense_proposal, approve_income_report, create_enrollment, create_expense_proposal,
    create_income_report, delete_expense_proposal, delete_income_report,
    mark_expense_proposal_paid, reject_income_report, update_income_report,
};
use crate::request_response::{
    ApproveExpenseProposalRequest, ApproveIncomeReportRequest, CreateEnrollmentRequest,
    CreateExpenseProposalRequest, CreateIncomeReportRequest, MarkExpenseProposalPaidRequest,
    RejectRequest, UpdateIncomeReportRequest,
};

fn income_request(title: &str, amount: i64) -> CreateIncomeReportRequest {
    CreateIncomeReportRequest {
        title: String::from(title),
        amount,
        payment_method: String::from("cash"),
        payer_info: None,
        category: None,
        financial_plan_id: None,
        account_item_id: None,
        branch_id: None,
        report_date: None,
        notes: None,
        staff_id: None,
    }
}

fn approve_request() -> ApproveIncomeReportRequest {
    ApproveIncomeReportRequest {
        cash_account_id: 1,
        payment_method: None,
        payment_ref: None,
        staff_id: Some(7),
    }
}

fn expense_request(title: &str, amount: i64) -> CreateExpenseProposalRequest {
    CreateExpenseProposalRequest {
        title: String::from(title),
        amount,
        category: None,
        financial_plan_id: 1,
        cash_account_id: 2,
        branch_id: None,
        proposal_date: None,
        notes: None,
        staff_id: None,
    }
}

#[test]
fn test_approve_stages_a_ledger_row_and_is_not_repeatable() {
    let mut persistence = setup_persistence();
    let created = create_income_report(&mut persistence, income_request("Tuition", 5000), test_now())
        .expect("Create failed");

    let approved = approve_income_report(
        &mut persistence,
        created.income_report_id,
        approve_request(),
        test_now(),
    )
    .expect("Approve failed");
    assert_eq!(approved.status, "approved");
    assert!(approved.transaction_id.is_some());

    // Second approval is a state conflict, not a second ledger row.
    let second = approve_income_report(
        &mut persistence,
        created.income_report_id,
        approve_request(),
        test_now(),
    );
    assert!(matches!(second, Err(ApiError::DomainRuleViolation { .. })));

    let ledger = persistence
        .transactions_for_source("income_report", created.income_report_id)
        .expect("Ledger query failed");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].status, "approved");
}

#[test]
fn test_reject_requires_a_reason_and_records_it() {
    let mut persistence = setup_persistence();
    let created = create_income_report(&mut persistence, income_request("Tuition", 5000), test_now())
        .expect("Create failed");

    let missing_reason = reject_income_report(
        &mut persistence,
        created.income_report_id,
        RejectRequest {
            reason: String::new(),
            staff_id: None,
        },
        test_now(),
    );
    assert!(matches!(missing_reason, Err(ApiError::InvalidInput { .. })));

    let rejected = reject_income_report(
        &mut persistence,
        created.income_report_id,
        RejectRequest {
            reason: String::from("Duplicate"),
            staff_id: None,
        },
        test_now(),
    )
    .expect("Reject failed");
    assert_eq!(rejected.status, "rejected");

    let report = persistence
        .get_income_report(created.income_report_id)
        .expect("Missing");
    assert_eq!(report.rejected_reason.as_deref(), Some("Duplicate"));
}

#[test]
fn test_rejecting_an_enrollment_report_releases_the_voucher() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    let voucher_id = seed_voucher(&mut persistence, "SAVE100", 100);

    let request = CreateEnrollmentRequest {
        voucher_code: Some(String::from("SAVE100")),
        ..enrollment_request(customer_id, product_id)
    };
    let created = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");
    assert_eq!(
        persistence
            .get_voucher(voucher_id)
            .expect("Voucher missing")
            .usage_count,
        1
    );

    let rejected = reject_income_report(
        &mut persistence,
        created.income_report_id,
        RejectRequest {
            reason: String::from("Payment never arrived"),
            staff_id: None,
        },
        test_now(),
    )
    .expect("Reject failed");
    assert!(rejected.warnings.is_empty());

    assert_eq!(
        persistence
            .get_voucher(voucher_id)
            .expect("Voucher missing")
            .usage_count,
        0
    );
}

#[test]
fn test_update_and_delete_respect_the_status_rules() {
    let mut persistence = setup_persistence();
    let created = create_income_report(&mut persistence, income_request("Tuition", 5000), test_now())
        .expect("Create failed");

    let changes = UpdateIncomeReportRequest {
        amount: Some(5500),
        ..UpdateIncomeReportRequest::default()
    };
    update_income_report(&mut persistence, created.income_report_id, changes, test_now())
        .expect("Update failed");

    approve_income_report(
        &mut persistence,
        created.income_report_id,
        approve_request(),
        test_now(),
    )
    .expect("Approve failed");

    // Approved reports can be neither updated nor deleted.
    let late_update = update_income_report(
        &mut persistence,
        created.income_report_id,
        UpdateIncomeReportRequest {
            amount: Some(1),
            ..UpdateIncomeReportRequest::default()
        },
        test_now(),
    );
    assert!(matches!(late_update, Err(ApiError::DomainRuleViolation { .. })));

    let late_delete =
        delete_income_report(&mut persistence, created.income_report_id, None, test_now());
    assert!(matches!(late_delete, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_expense_proposal_round_trip_ends_with_two_ledger_rows() {
    let mut persistence = setup_persistence();
    let created =
        create_expense_proposal(&mut persistence, expense_request("Projector", 900), test_now())
            .expect("Create failed");
    assert_eq!(created.status, "pending");
    assert!(created.transaction_id.is_some());

    let stored = persistence
        .get_expense_proposal(created.expense_proposal_id)
        .expect("Missing");
    assert_eq!(stored.financial_plan_id, 1);
    assert_eq!(stored.cash_account_id, 2);

    approve_expense_proposal(
        &mut persistence,
        created.expense_proposal_id,
        ApproveExpenseProposalRequest { staff_id: Some(7) },
        test_now(),
    )
    .expect("Approve failed");

    let paid = mark_expense_proposal_paid(
        &mut persistence,
        created.expense_proposal_id,
        MarkExpenseProposalPaidRequest {
            payment_date: None,
            payment_method: String::from("bank"),
            payment_ref: Some(String::from("TX-55")),
            staff_id: Some(7),
        },
        test_now(),
    )
    .expect("Mark paid failed");
    assert_eq!(paid.status, "paid");

    let ledger = persistence
        .transactions_for_source("expense_proposal", created.expense_proposal_id)
        .expect("Ledger query failed");
    assert_eq!(ledger.len(), 2);
    assert_eq!(ledger[0].status, "pending");
    assert_eq!(ledger[1].status, "approved");
    assert_eq!(ledger[1].payment_ref.as_deref(), Some("TX-55"));
}

#[test]
fn test_mark_paid_straight_from_pending_is_a_conflict() {
    let mut persistence = setup_persistence();
    let created =
        create_expense_proposal(&mut persistence, expense_request("Projector", 900), test_now())
            .expect("Create failed");

    let result = mark_expense_proposal_paid(
        &mut persistence,
        created.expense_proposal_id,
        MarkExpenseProposalPaidRequest {
            payment_date: None,
            payment_method: String::from("cash"),
            payment_ref: None,
            staff_id: None,
        },
        test_now(),
    );
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_approved_expense_proposal_cannot_be_deleted() {
    let mut persistence = setup_persistence();
    let created =
        create_expense_proposal(&mut persistence, expense_request("Projector", 900), test_now())
            .expect("Create failed");
    approve_expense_proposal(
        &mut persistence,
        created.expense_proposal_id,
        ApproveExpenseProposalRequest::default(),
        test_now(),
    )
    .expect("Approve failed");

    let result =
        delete_expense_proposal(&mut persistence, created.expense_proposal_id, None, test_now());
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_deleting_a_pending_proposal_clears_its_ledger_rows() {
    let mut persistence = setup_persistence();
    let created =
        create_expense_proposal(&mut persistence, expense_request("Projector", 900), test_now())
            .expect("Create failed");

    delete_expense_proposal(&mut persistence, created.expense_proposal_id, None, test_now())
        .expect("Delete failed");

    let ledger = persistence
        .transactions_for_source("expense_proposal", created.expense_proposal_id)
        .expect("Ledger query failed");
    assert!(ledger.is_empty());
}

#[test]
fn test_audit_trail_covers_the_approval() {
    let mut persistence = setup_persistence();
    let created = create_income_report(&mut persistence, income_request("Tuition", 5000), test_now())
        .expect("Create failed");
    approve_income_report(
        &mut persistence,
        created.income_report_id,
        approve_request(),
        test_now(),
    )
    .expect("Approve failed");

    let events = persistence
        .audit_events_for_entity("income_report", created.income_report_id)
        .expect("Audit query failed");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].action, "CreateIncomeReport");
    assert_eq!(events[1].action, "ApproveIncomeReport");
    assert_eq!(events[1].actor_id, "7");
    assert_eq!(events[1].after_status.as_deref(), Some("approved"));
}
