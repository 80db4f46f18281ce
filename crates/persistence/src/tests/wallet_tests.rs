// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Wallet storage tests.

use classledger_domain::StudentRef;

use super::{create_test_customer, create_test_enrollment, create_test_product, test_now};
use crate::{EnrollmentPayment, Persistence, PersistenceError};

#[test]
fn test_get_or_create_returns_the_same_wallet_on_repeat_calls() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let customer_id = create_test_customer(&mut persistence, "Alice Tran");
    let student = StudentRef::Customer(customer_id);

    let first = persistence
        .get_or_create_wallet(student, test_now())
        .expect("Failed to create wallet");
    let second = persistence
        .get_or_create_wallet(student, test_now())
        .expect("Failed to fetch wallet");

    assert_eq!(first.wallet_id, second.wallet_id);
    assert_eq!(first.balance, 0);
}

#[test]
fn test_customer_and_child_wallets_are_distinct() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let customer_id = create_test_customer(&mut persistence, "Alice Tran");
    let child_id = persistence
        .create_child(customer_id, "Minh Tran", test_now())
        .expect("Failed to create child");

    let customer_wallet = persistence
        .get_or_create_wallet(StudentRef::Customer(customer_id), test_now())
        .expect("Failed to create wallet");
    let child_wallet = persistence
        .get_or_create_wallet(StudentRef::Child(child_id), test_now())
        .expect("Failed to create wallet");

    assert_ne!(customer_wallet.wallet_id, child_wallet.wallet_id);
}

#[test]
fn test_deposit_moves_balance_and_records_a_transaction() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let customer_id = create_test_customer(&mut persistence, "Alice Tran");
    let student = StudentRef::Customer(customer_id);

    let wallet = persistence
        .get_or_create_wallet(student, test_now())
        .expect("Failed to create wallet");
    persistence
        .deposit_to_wallet(
            wallet.wallet_id,
            1200,
            Some("enrollment:4"),
            Some("cash"),
            test_now(),
        )
        .expect("Deposit failed");

    let reloaded = persistence
        .get_wallet(student)
        .expect("Wallet query failed")
        .expect("Wallet missing");
    assert_eq!(reloaded.balance, 1200);

    let transactions = persistence
        .list_wallet_transactions(wallet.wallet_id)
        .expect("Transaction query failed");
    assert_eq!(transactions.len(), 1);
    assert_eq!(transactions[0].amount, 1200);
    assert_eq!(transactions[0].kind, "deposit");
    assert_eq!(transactions[0].reference.as_deref(), Some("enrollment:4"));
}

#[test]
fn test_record_enrollment_payment_deposits_and_updates_in_one_pass() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let customer_id = create_test_customer(&mut persistence, "Alice Tran");
    let product_id = create_test_product(&mut persistence, "MATH-101", 1200);
    let (enrollment_id, _) =
        create_test_enrollment(&mut persistence, customer_id, product_id, 1200);
    let student = StudentRef::Customer(customer_id);

    let payment = EnrollmentPayment {
        enrollment_id,
        student,
        amount: 500,
        payment_method: Some(String::from("cash")),
        paid_amount: 500,
        remaining_amount: 700,
        status: String::from("pending"),
    };
    let balance = persistence
        .record_enrollment_payment(&payment, test_now())
        .expect("Payment failed");
    assert_eq!(balance, 500);

    let enrollment = persistence
        .get_enrollment(enrollment_id)
        .expect("Enrollment missing");
    assert_eq!(enrollment.paid_amount, 500);
    assert_eq!(enrollment.remaining_amount, 700);

    let wallet = persistence
        .get_wallet(student)
        .expect("Wallet query failed")
        .expect("Wallet missing");
    assert_eq!(wallet.balance, 500);

    let transactions = persistence
        .list_wallet_transactions(wallet.wallet_id)
        .expect("Transaction query failed");
    assert_eq!(transactions.len(), 1);
    assert_eq!(
        transactions[0].reference.as_deref(),
        Some(format!("enrollment:{enrollment_id}").as_str())
    );
}

#[test]
fn test_record_enrollment_payment_rolls_back_the_deposit_on_failure() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let customer_id = create_test_customer(&mut persistence, "Alice Tran");
    let student = StudentRef::Customer(customer_id);

    // No such enrollment: the payment update fails after the deposit,
    // and the whole transaction must unwind.
    let payment = EnrollmentPayment {
        enrollment_id: 99_999,
        student,
        amount: 500,
        payment_method: None,
        paid_amount: 500,
        remaining_amount: 0,
        status: String::from("paid"),
    };
    let result = persistence.record_enrollment_payment(&payment, test_now());
    assert!(matches!(result, Err(PersistenceError::NotFound(_))));

    let wallet = persistence
        .get_wallet(student)
        .expect("Wallet query failed");
    assert!(wallet.is_none());
}

#[test]
fn test_get_wallet_returns_none_when_never_created() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let customer_id = create_test_customer(&mut persistence, "Alice Tran");

    let wallet = persistence
        .get_wallet(StudentRef::Customer(customer_id))
        .expect("Wallet query failed");
    assert!(wallet.is_none());
}
