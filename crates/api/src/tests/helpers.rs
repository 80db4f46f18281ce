// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Shared fixtures for the API handler tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use classledger_domain::DiscountKind;
use classledger_persistence::{NewCampaign, NewProduct, NewVoucher, Persistence};

use crate::request_response::CreateEnrollmentRequest;

pub fn test_now() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 8, 26, 12, 0, 0) {
        chrono::LocalResult::Single(dt) => dt,
        _ => panic!("Invalid test timestamp"),
    }
}

pub fn setup_persistence() -> Persistence {
    Persistence::new_in_memory().expect("Failed to create persistence")
}

pub fn seed_customer(persistence: &mut Persistence, name: &str) -> i64 {
    persistence
        .create_customer(name, None, None, None, test_now())
        .expect("Failed to create customer")
}

pub fn seed_product(persistence: &mut Persistence, code: &str, list_price: i64) -> i64 {
    let product = NewProduct {
        code: String::from(code),
        name: format!("Course {code}"),
        category: Some(String::from("language")),
        list_price,
        sale_price: None,
        sale_active: false,
        total_sessions: 10,
        price_per_session: list_price / 10,
    };
    persistence
        .create_product(&product, test_now())
        .expect("Failed to create product")
}

/// A fixed-amount voucher with one use per customer and no other
/// restrictions.
pub fn seed_voucher(persistence: &mut Persistence, code: &str, amount: i64) -> i64 {
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

/// A fixed-amount auto-apply campaign valid around `test_now()`.
pub fn seed_campaign(persistence: &mut Persistence, name: &str, amount: i64) -> i64 {
    let campaign = NewCampaign {
        name: String::from(name),
        active: true,
        discount_kind: DiscountKind::FixedAmount,
        discount_value: amount,
        max_discount_amount: None,
        min_order_amount: None,
        start_date: test_now() - Duration::days(7),
        end_date: test_now() + Duration::days(7),
        usage_limit: None,
        auto_apply: true,
        priority: 10,
        applicable_product_ids: None,
        applicable_categories: None,
        target_customer_segments: None,
    };
    persistence
        .create_campaign(&campaign, test_now())
        .expect("Failed to create campaign")
}

pub fn enrollment_request(customer_id: i64, product_id: i64) -> CreateEnrollmentRequest {
    CreateEnrollmentRequest {
        customer_id,
        child_id: None,
        product_id,
        branch_id: None,
        voucher_id: None,
        voucher_code: None,
        campaign_id: None,
        notes: None,
        staff_id: None,
    }
}
