// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Discount resolution tests at the API boundary.
//!
//! Discounts are opt-in per request: the persisted enrollment carries
//! at most one of voucher/campaign, a campaign wins only on a strictly
//! greater discount, and nothing is applied the request did not name.

use super::helpers::{
    enrollment_request, seed_campaign, seed_customer, seed_product, seed_voucher,
    setup_persistence, test_now,
};
use crate::error::ApiError;
use crate::handlers::{auto_apply_preview, create_enrollment, validate_voucher};
use crate::request_response::{CreateEnrollmentRequest, ValidateVoucherRequest};
use classledger_audit::BookkeepingWarning;

#[test]
fn test_enrollment_stores_exactly_one_discount_source() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    seed_voucher(&mut persistence, "SAVE100", 100);
    let campaign_id = seed_campaign(&mut persistence, "Autumn sale", 80);

    let request = CreateEnrollmentRequest {
        voucher_code: Some(String::from("SAVE100")),
        campaign_id: Some(campaign_id),
        ..enrollment_request(customer_id, product_id)
    };
    let response = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");

    // Voucher discount (100) beats the campaign (80).
    assert_eq!(response.discount_amount, 100);
    assert_eq!(response.final_price, 900);
    assert_eq!(response.voucher_code.as_deref(), Some("SAVE100"));
    assert_eq!(response.campaign_id, None);

    let stored = persistence
        .get_enrollment(response.enrollment_id)
        .expect("Enrollment missing");
    assert!(stored.voucher_id.is_some());
    assert!(stored.campaign_id.is_none());
}

#[test]
fn test_campaign_wins_only_when_strictly_greater() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    seed_voucher(&mut persistence, "SAVE100", 100);
    let campaign_id = seed_campaign(&mut persistence, "Big autumn sale", 150);

    let request = CreateEnrollmentRequest {
        voucher_code: Some(String::from("SAVE100")),
        campaign_id: Some(campaign_id),
        ..enrollment_request(customer_id, product_id)
    };
    let response = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");

    assert_eq!(response.discount_amount, 150);
    assert_eq!(response.voucher_code, None);
    assert_eq!(response.campaign_id, Some(campaign_id));

    let stored = persistence
        .get_enrollment(response.enrollment_id)
        .expect("Enrollment missing");
    assert!(stored.voucher_id.is_none());
    assert_eq!(stored.campaign_id, Some(campaign_id));
}

#[test]
fn test_equal_discounts_keep_the_voucher() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    seed_voucher(&mut persistence, "SAVE100", 100);
    let campaign_id = seed_campaign(&mut persistence, "Matching sale", 100);

    let request = CreateEnrollmentRequest {
        voucher_code: Some(String::from("SAVE100")),
        campaign_id: Some(campaign_id),
        ..enrollment_request(customer_id, product_id)
    };
    let response = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");

    assert_eq!(response.discount_amount, 100);
    assert_eq!(response.voucher_code.as_deref(), Some("SAVE100"));
    assert_eq!(response.campaign_id, None);
}

#[test]
fn test_unrequested_campaign_is_never_applied() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    let campaign_id = seed_campaign(&mut persistence, "Autumn sale", 80);

    // An active auto-apply campaign exists, but the request names none.
    let request = enrollment_request(customer_id, product_id);
    let response = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");

    assert_eq!(response.discount_amount, 0);
    assert_eq!(response.final_price, 1000);
    assert_eq!(response.campaign_id, None);

    let stored = persistence
        .get_enrollment(response.enrollment_id)
        .expect("Enrollment missing");
    assert!(stored.voucher_id.is_none());
    assert!(stored.campaign_id.is_none());
    assert_eq!(
        persistence
            .get_campaign(campaign_id)
            .expect("Campaign missing")
            .usage_count,
        0
    );
}

#[test]
fn test_requested_voucher_by_id_applies() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    let voucher_id = seed_voucher(&mut persistence, "SAVE100", 100);

    let request = CreateEnrollmentRequest {
        voucher_id: Some(voucher_id),
        ..enrollment_request(customer_id, product_id)
    };
    let response = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");

    assert_eq!(response.discount_amount, 100);
    assert_eq!(response.voucher_code.as_deref(), Some("SAVE100"));
}

#[test]
fn test_requested_campaign_applies_without_the_auto_apply_flag() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let campaign = classledger_persistence::NewCampaign {
        name: String::from("Staff-picked sale"),
        active: true,
        discount_kind: classledger_domain::DiscountKind::FixedAmount,
        discount_value: 120,
        max_discount_amount: None,
        min_order_amount: None,
        start_date: test_now() - chrono::Duration::days(7),
        end_date: test_now() + chrono::Duration::days(7),
        usage_limit: None,
        auto_apply: false,
        priority: 0,
        applicable_product_ids: None,
        applicable_categories: None,
        target_customer_segments: None,
    };
    let campaign_id = persistence
        .create_campaign(&campaign, test_now())
        .expect("Failed to create campaign");

    let request = CreateEnrollmentRequest {
        campaign_id: Some(campaign_id),
        ..enrollment_request(customer_id, product_id)
    };
    let response = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");

    assert_eq!(response.discount_amount, 120);
    assert_eq!(response.campaign_id, Some(campaign_id));
    assert_eq!(
        persistence
            .get_campaign(campaign_id)
            .expect("Campaign missing")
            .usage_count,
        1
    );
}

#[test]
fn test_voucher_bookkeeping_runs_after_enrollment_commit() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    let voucher_id = seed_voucher(&mut persistence, "SAVE100", 100);

    let request = CreateEnrollmentRequest {
        voucher_code: Some(String::from("SAVE100")),
        ..enrollment_request(customer_id, product_id)
    };
    let response = create_enrollment(&mut persistence, request, test_now()).expect("Create failed");
    assert!(response.warnings.is_empty());

    let voucher = persistence.get_voucher(voucher_id).expect("Voucher missing");
    assert_eq!(voucher.usage_count, 1);
}

#[test]
fn test_ineligible_voucher_is_skipped_with_a_warning() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    let voucher_id = seed_voucher(&mut persistence, "ONCE", 100);

    let first = CreateEnrollmentRequest {
        voucher_code: Some(String::from("ONCE")),
        ..enrollment_request(customer_id, product_id)
    };
    create_enrollment(&mut persistence, first, test_now()).expect("First create failed");

    // usage_per_customer is 1, so a second redemption is ineligible.
    // The enrollment still goes through, undiscounted, with a warning.
    let second = CreateEnrollmentRequest {
        voucher_code: Some(String::from("ONCE")),
        ..enrollment_request(customer_id, product_id)
    };
    let response = create_enrollment(&mut persistence, second, test_now()).expect("Create failed");

    assert_eq!(response.discount_amount, 0);
    assert_eq!(response.final_price, 1000);
    assert_eq!(response.voucher_code, None);
    assert!(matches!(
        response.warnings.as_slice(),
        [BookkeepingWarning::VoucherNotApplied { code, .. }] if code == "ONCE"
    ));

    let stored = persistence
        .get_enrollment(response.enrollment_id)
        .expect("Enrollment missing");
    assert!(stored.voucher_id.is_none());
    assert_eq!(
        persistence
            .get_voucher(voucher_id)
            .expect("Voucher missing")
            .usage_count,
        1
    );
}

#[test]
fn test_unknown_voucher_code_is_not_found() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let request = CreateEnrollmentRequest {
        voucher_code: Some(String::from("NOPE")),
        ..enrollment_request(customer_id, product_id)
    };
    let result = create_enrollment(&mut persistence, request, test_now());
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_unknown_campaign_id_is_not_found() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let request = CreateEnrollmentRequest {
        campaign_id: Some(999),
        ..enrollment_request(customer_id, product_id)
    };
    let result = create_enrollment(&mut persistence, request, test_now());
    assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
}

#[test]
fn test_validate_voucher_clamps_fixed_amount_to_the_price() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    seed_voucher(&mut persistence, "HUGE", 5000);

    let request = ValidateVoucherRequest {
        code: String::from("HUGE"),
        customer_id,
        product_id,
        amount: None,
    };
    let response =
        validate_voucher(&mut persistence, &request, test_now()).expect("Validate failed");

    // A fixed discount can never exceed the price.
    assert_eq!(response.discount_amount, 1000);
    assert_eq!(response.final_amount, 0);
}

#[test]
fn test_validate_voucher_answers_each_failed_gate_with_an_error() {
    let mut persistence = setup_persistence();
    let customer_id = seed_customer(&mut persistence, "Alice Tran");
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let voucher = classledger_persistence::NewVoucher {
        code: String::from("BIGONLY"),
        name: String::from("Minimum order voucher"),
        active: true,
        discount_kind: classledger_domain::DiscountKind::FixedAmount,
        discount_value: 100,
        max_discount_amount: None,
        min_order_amount: Some(5000),
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
        .expect("Failed to create voucher");

    // The product price (1000) is below the voucher minimum.
    let request = ValidateVoucherRequest {
        code: String::from("BIGONLY"),
        customer_id,
        product_id,
        amount: None,
    };
    let result = validate_voucher(&mut persistence, &request, test_now());
    assert!(matches!(
        result,
        Err(ApiError::DomainRuleViolation { ref rule, .. }) if rule == "voucher_eligibility"
    ));

    // A prospective amount above the minimum passes.
    let request = ValidateVoucherRequest {
        code: String::from("BIGONLY"),
        customer_id,
        product_id,
        amount: Some(6000),
    };
    let response =
        validate_voucher(&mut persistence, &request, test_now()).expect("Validate failed");
    assert_eq!(response.discount_amount, 100);
    assert_eq!(response.final_amount, 5900);
}

#[test]
fn test_auto_apply_preview_returns_none_when_nothing_qualifies() {
    let mut persistence = setup_persistence();
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);

    let preview =
        auto_apply_preview(&mut persistence, product_id, test_now()).expect("Preview failed");
    assert!(preview.is_none());
}

#[test]
fn test_auto_apply_preview_names_the_winning_campaign() {
    let mut persistence = setup_persistence();
    let product_id = seed_product(&mut persistence, "ENG-A1", 1000);
    seed_campaign(&mut persistence, "Autumn sale", 80);

    let preview = auto_apply_preview(&mut persistence, product_id, test_now())
        .expect("Preview failed")
        .expect("Expected a winning campaign");
    assert_eq!(preview.name, "Autumn sale");
    assert_eq!(preview.discount_amount, 80);
    assert_eq!(preview.final_price, 920);
}
