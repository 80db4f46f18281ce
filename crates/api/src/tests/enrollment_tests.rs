// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment lifecycle tests: payment confirmation, cancellation and
//! deletion guards.

use super::helpers::{
    enrollment_request, seed_customer, seed_product, seed_voucher, setup_persistence, test_now,
};
use crate::error::ApiError;
use crate::handlers::{
    cancel_enrollment, confirm_payment, create_enrollment, delete_enrollment,
    enrollment_statistics,
};
use crate::request_response::{
    CancelEnrollmentRequest, ConfirmPaymentRequest, CreateEnrollmentRequest,
};

fn payment(amount: i64) -> ConfirmPaymentRequest {
    ConfirmPaymentRequest {
        amount,
        payment_method: Some(String::from("cash")),
        staff_id: None,
    }
}

fn cancel_request(reason: &str) -> CancelEnrollmentRequest {
    CancelEnrollmentRequest {
        reason: String::from(reason),
        staff_id: None,
    }
}

#[test]
fn test_full_payment_activates_the_enrollment() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");

    let response = confirm_payment(&mut persistence, created.enrollment_id, payment(1000), test_now())
        .expect("Payment failed");

    assert_eq!(response.status, "active");
    assert_eq!(response.paid_amount, 1000);
    assert_eq!(response.remaining_amount, 0);
    assert_eq!(response.wallet_balance, 1000);
}

#[test]
fn test_partial_payment_keeps_status_and_computes_remaining() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");

    let response = confirm_payment(&mut persistence, created.enrollment_id, payment(400), test_now())
        .expect("Payment failed");

    assert_eq!(response.status, "pending");
    assert_eq!(response.paid_amount, 400);
    assert_eq!(response.remaining_amount, 600);

    let second = confirm_payment(&mut persistence, created.enrollment_id, payment(600), test_now())
        .expect("Payment failed");
    assert_eq!(second.status, "active");
    assert_eq!(second.remaining_amount, 0);
}

#[test]
fn test_reported_wallet_balance_matches_the_stored_wallet() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");

    let first = confirm_payment(&mut persistence, created.enrollment_id, payment(400), test_now())
        .expect("Payment failed");
    assert_eq!(first.wallet_balance, 400);

    let second = confirm_payment(&mut persistence, created.enrollment_id, payment(250), test_now())
        .expect("Payment failed");
    assert_eq!(second.wallet_balance, 650);

    let wallet = persistence
        .get_wallet(classledger_domain::StudentRef::Customer(customer_id))
        .expect("Wallet query failed")
        .expect("Wallet missing");
    assert_eq!(wallet.balance, second.wallet_balance);
}

#[test]
fn test_payment_against_settled_enrollment_is_a_conflict() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");
    confirm_payment(&mut persistence, created.enrollment_id, payment(1000), test_now())
        .expect("Payment failed");

    let result = confirm_payment(&mut persistence, created.enrollment_id, payment(10), test_now());
    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "payment_state"
    ));
}

#[test]
fn test_zero_payment_is_invalid_input() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");

    let result = confirm_payment(&mut persistence, created.enrollment_id, payment(0), test_now());
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_cancel_requires_a_reason() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");

    let result = cancel_enrollment(
        &mut persistence,
        created.enrollment_id,
        cancel_request("  "),
        test_now(),
    );
    assert!(matches!(result, Err(ApiError::InvalidInput { .. })));
}

#[test]
fn test_cancel_is_rejected_after_payment() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");
    confirm_payment(&mut persistence, created.enrollment_id, payment(1000), test_now())
        .expect("Payment failed");

    let result = cancel_enrollment(
        &mut persistence,
        created.enrollment_id,
        cancel_request("Changed mind"),
        test_now(),
    );
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_cancel_releases_the_voucher_usage() {
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

    let response = cancel_enrollment(
        &mut persistence,
        created.enrollment_id,
        cancel_request("Customer withdrew"),
        test_now(),
    )
    .expect("Cancel failed");
    assert!(response.warnings.is_empty());

    assert_eq!(
        persistence
            .get_voucher(voucher_id)
            .expect("Voucher missing")
            .usage_count,
        0
    );
}

#[test]
fn test_delete_is_refused_for_paid_enrollments() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");
    confirm_payment(&mut persistence, created.enrollment_id, payment(1000), test_now())
        .expect("Payment failed");

    let result = delete_enrollment(&mut persistence, created.enrollment_id, None, test_now());
    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "enrollment_deletion"
    ));
}

#[test]
fn test_delete_is_refused_when_an_approved_income_report_exists() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");
    persistence
        .approve_income_report(created.income_report_id, None, 1, None, None, test_now())
        .expect("Approve failed");

    // Still pending by status, but the approved report protects it.
    let result = delete_enrollment(&mut persistence, created.enrollment_id, None, test_now());
    assert!(matches!(result, Err(ApiError::DomainRuleViolation { .. })));
}

#[test]
fn test_delete_removes_a_pending_enrollment() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let created =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");
    delete_enrollment(&mut persistence, created.enrollment_id, None, test_now())
        .expect("Delete failed");

    assert!(matches!(
        persistence.get_enrollment(created.enrollment_id),
        Err(classledger_persistence::PersistenceError::NotFound(_))
    ));
}

#[test]
fn test_statistics_reflect_the_lifecycle() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let active =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");
    let cancelled =
        create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
            .expect("Create failed");
    create_enrollment(&mut persistence, enrollment_request(customer_id, product_id), test_now())
        .expect("Create failed");

    confirm_payment(&mut persistence, active.enrollment_id, payment(1000), test_now())
        .expect("Payment failed");
    cancel_enrollment(
        &mut persistence,
        cancelled.enrollment_id,
        cancel_request("No show"),
        test_now(),
    )
    .expect("Cancel failed");

    let stats = enrollment_statistics(&mut persistence).expect("Statistics failed");
    assert_eq!(stats.total, 3);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.cancelled, 1);
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.realized_revenue, 1000);
    assert_eq!(stats.pending_revenue, 1000);
}
