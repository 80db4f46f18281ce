// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Voucher redemption bookkeeping tests.
//!
//! The usage row and the counter on the voucher must always move
//! together, and release must be idempotent.

use classledger_domain::Voucher;

use super::{create_test_customer, create_test_product, create_test_voucher, test_now};
use crate::Persistence;

fn setup() -> (Persistence, i64, i64, i64) {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");
    let customer_id = create_test_customer(&mut persistence, "Alice Tran");
    let product_id = create_test_product(&mut persistence, "MATH-101", 1200);
    let voucher_id = create_test_voucher(&mut persistence, "WELCOME100", 100);
    (persistence, customer_id, product_id, voucher_id)
}

#[test]
fn test_record_usage_increments_counter_and_stores_row() {
    let (mut persistence, customer_id, product_id, voucher_id) = setup();
    let (enrollment_id, _) =
        super::create_test_enrollment(&mut persistence, customer_id, product_id, 1100);

    persistence
        .record_voucher_usage(voucher_id, customer_id, enrollment_id, 100, test_now())
        .expect("Failed to record usage");

    let voucher: Voucher = persistence.get_voucher(voucher_id).expect("Voucher missing");
    assert_eq!(voucher.usage_count, 1);

    let uses: i64 = persistence
        .count_customer_voucher_uses(voucher_id, customer_id)
        .expect("Failed to count uses");
    assert_eq!(uses, 1);
}

#[test]
fn test_release_restores_counter_and_reports_whether_anything_was_released() {
    let (mut persistence, customer_id, product_id, voucher_id) = setup();
    let (enrollment_id, _) =
        super::create_test_enrollment(&mut persistence, customer_id, product_id, 1100);

    persistence
        .record_voucher_usage(voucher_id, customer_id, enrollment_id, 100, test_now())
        .expect("Failed to record usage");

    let released: bool = persistence
        .release_voucher_usage(voucher_id, enrollment_id)
        .expect("Failed to release usage");
    assert!(released);

    let voucher: Voucher = persistence.get_voucher(voucher_id).expect("Voucher missing");
    assert_eq!(voucher.usage_count, 0);

    let uses: i64 = persistence
        .count_customer_voucher_uses(voucher_id, customer_id)
        .expect("Failed to count uses");
    assert_eq!(uses, 0);
}

#[test]
fn test_release_twice_cannot_double_decrement() {
    let (mut persistence, customer_id, product_id, voucher_id) = setup();
    let (enrollment_id, _) =
        super::create_test_enrollment(&mut persistence, customer_id, product_id, 1100);

    persistence
        .record_voucher_usage(voucher_id, customer_id, enrollment_id, 100, test_now())
        .expect("Failed to record usage");
    persistence
        .release_voucher_usage(voucher_id, enrollment_id)
        .expect("Failed to release usage");

    let released_again: bool = persistence
        .release_voucher_usage(voucher_id, enrollment_id)
        .expect("Second release failed");
    assert!(!released_again);

    let voucher: Voucher = persistence.get_voucher(voucher_id).expect("Voucher missing");
    assert_eq!(voucher.usage_count, 0);
}

#[test]
fn test_release_without_prior_usage_is_a_no_op() {
    let (mut persistence, customer_id, product_id, voucher_id) = setup();
    let (enrollment_id, _) =
        super::create_test_enrollment(&mut persistence, customer_id, product_id, 1200);

    let released: bool = persistence
        .release_voucher_usage(voucher_id, enrollment_id)
        .expect("Release failed");
    assert!(!released);

    let voucher: Voucher = persistence.get_voucher(voucher_id).expect("Voucher missing");
    assert_eq!(voucher.usage_count, 0);
}

#[test]
fn test_per_customer_count_only_sees_that_customer() {
    let (mut persistence, customer_id, product_id, voucher_id) = setup();
    let other_customer_id = create_test_customer(&mut persistence, "Bao Le");

    let (enrollment_a, _) =
        super::create_test_enrollment(&mut persistence, customer_id, product_id, 1100);
    let (enrollment_b, _) =
        super::create_test_enrollment(&mut persistence, other_customer_id, product_id, 1100);

    persistence
        .record_voucher_usage(voucher_id, customer_id, enrollment_a, 100, test_now())
        .expect("Failed to record usage");
    persistence
        .record_voucher_usage(voucher_id, other_customer_id, enrollment_b, 100, test_now())
        .expect("Failed to record usage");

    let voucher: Voucher = persistence.get_voucher(voucher_id).expect("Voucher missing");
    assert_eq!(voucher.usage_count, 2);

    let uses: i64 = persistence
        .count_customer_voucher_uses(voucher_id, customer_id)
        .expect("Failed to count uses");
    assert_eq!(uses, 1);
}

#[test]
fn test_get_voucher_by_code_round_trips_applicability_lists() {
    let mut persistence = Persistence::new_in_memory().expect("Failed to create persistence");

    let voucher = crate::NewVoucher {
        code: String::from("SCOPED"),
        name: String::from("Scoped voucher"),
        active: true,
        discount_kind: classledger_domain::DiscountKind::Percentage,
        discount_value: 10,
        max_discount_amount: Some(50),
        min_order_amount: Some(200),
        valid_from: None,
        valid_until: None,
        usage_limit: Some(5),
        usage_per_customer: 2,
        applicable_customer_ids: Some(vec![1, 2]),
        applicable_product_ids: Some(vec![7]),
        applicable_categories: Some(vec![String::from("math")]),
    };
    persistence
        .create_voucher(&voucher, test_now())
        .expect("Failed to create voucher");

    let loaded: Voucher = persistence
        .get_voucher_by_code("SCOPED")
        .expect("Voucher missing");
    assert_eq!(loaded.applicable_customer_ids, Some(vec![1, 2]));
    assert_eq!(loaded.applicable_product_ids, Some(vec![7]));
    assert_eq!(
        loaded.applicable_categories,
        Some(vec![String::from("math")])
    );
    assert_eq!(loaded.max_discount_amount, Some(50));
}
