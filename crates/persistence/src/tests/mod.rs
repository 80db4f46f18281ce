// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

mod audit_tests;
mod voucher_tests;
mod wallet_tests;

use chrono::{DateTime, TimeZone, Utc};
use classledger_domain::{DiscountKind, StudentRef};

use crate::{NewEnrollment, NewProduct, NewVoucher, Persistence};

/// Fixed timestamp used across the persistence tests.
pub fn test_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0) {
        chrono::LocalResult::Single(dt) => dt,
        _ => panic!("Invalid test timestamp"),
    }
}

pub fn create_test_customer(persistence: &mut Persistence, name: &str) -> i64 {
    persistence
        .create_customer(name, Some("555-0100"), None, None, test_now())
        .expect("Failed to create customer")
}

pub fn create_test_product(persistence: &mut Persistence, code: &str, list_price: i64) -> i64 {
    let product = NewProduct {
        code: String::from(code),
        name: format!("Course {code}"),
        category: Some(String::from("math")),
        list_price,
        sale_price: None,
        sale_active: false,
        total_sessions: 12,
        price_per_session: list_price / 12,
    };
    persistence
        .create_product(&product, test_now())
        .expect("Failed to create product")
}

/// A fixed-amount voucher with no validity window or applicability
/// restrictions.
pub fn create_test_voucher(persistence: &mut Persistence, code: &str, amount: i64) -> i64 {
    let voucher = NewVoucher {
        code: String::from(code),
        name: format!("Voucher {code}"),
        active: true,
        discount_kind: DiscountKind::FixedAmount,
        discount_value: amount,
        max_discount_amount: None,
        min_order_amount: None,
        valid_from: None,
        valid_until: None,
        usage_limit: None,
        usage_per_customer: 1,
        applicable_customer_ids: None,
        applicable_product_ids: None,
        applicable_categories: None,
    };
    persistence
        .create_voucher(&voucher, test_now())
        .expect("Failed to create voucher")
}

/// Creates an undiscounted enrollment for the customer themselves.
/// Returns `(enrollment_id, income_report_id)`.
pub fn create_test_enrollment(
    persistence: &mut Persistence,
    customer_id: i64,
    product_id: i64,
    final_price: i64,
) -> (i64, i64) {
    let enrollment = NewEnrollment {
        customer_id,
        student: StudentRef::Customer(customer_id),
        product_id,
        branch_id: None,
        original_price: final_price,
        discount_amount: 0,
        final_price,
        voucher_id: None,
        voucher_code: None,
        campaign_id: None,
        total_sessions: 12,
        price_per_session: final_price / 12,
        notes: None,
    };
    persistence
        .create_enrollment_with_income_report(&enrollment, "Enrollment payment", test_now())
        .expect("Failed to create enrollment")
}
