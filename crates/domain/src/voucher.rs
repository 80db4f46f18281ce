// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Voucher eligibility.
//!
//! A voucher passes through three independent gates before it yields a
//! discount: validity (active flag, date window, global usage cap),
//! customer eligibility (allow-list, per-customer cap) and product
//! applicability (product-id list, category list). The gates are checked
//! in that order and the first failing gate names the rejection.

use crate::pricing::{DiscountKind, DiscountRule, resolve_discount};
use crate::product::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discount voucher as loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voucher {
    pub voucher_id: i64,
    pub code: String,
    pub name: String,
    pub active: bool,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    /// Cap for percentage discounts.
    pub max_discount_amount: Option<i64>,
    /// Orders below this amount are rejected. `None` means no floor.
    pub min_order_amount: Option<i64>,
    /// Start of the validity window. `None` means valid from creation.
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window. `None` means no expiry.
    pub valid_until: Option<DateTime<Utc>>,
    /// Global redemption cap. `None` means unlimited.
    pub usage_limit: Option<i64>,
    /// Redemptions so far, across all customers.
    pub usage_count: i64,
    /// How many times a single customer may redeem this voucher.
    pub usage_per_customer: i64,
    /// Customer allow-list. Empty or `None` means any customer.
    pub applicable_customer_ids: Option<Vec<i64>>,
    /// Product allow-list. Empty or `None` means any product.
    pub applicable_product_ids: Option<Vec<i64>>,
    /// Category allow-list. Empty or `None` means any category.
    pub applicable_categories: Option<Vec<String>>,
}

/// Why a voucher did not apply, in gate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoucherRejection {
    /// Inactive, outside the date window, or globally exhausted.
    NotCurrentlyValid,
    /// The customer is not on the allow-list or hit their personal cap.
    NotUsableByCustomer,
    /// The product is outside the applicability lists.
    NotApplicableToProduct,
    /// The order amount is under the voucher's minimum.
    BelowMinimumOrder { minimum: i64 },
}

impl std::fmt::Display for VoucherRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCurrentlyValid => {
                write!(f, "Voucher is not currently valid")
            }
            Self::NotUsableByCustomer => {
                write!(f, "Voucher cannot be used by this customer")
            }
            Self::NotApplicableToProduct => {
                write!(f, "Voucher does not apply to this product")
            }
            Self::BelowMinimumOrder { minimum } => {
                write!(f, "Order amount is below the voucher minimum of {minimum}")
            }
        }
    }
}

/// An id list admits everything when it is absent or empty.
fn list_admits_id(list: Option<&Vec<i64>>, id: i64) -> bool {
    list.is_none_or(|ids| ids.is_empty() || ids.contains(&id))
}

fn list_admits_category(list: Option<&Vec<String>>, category: Option<&str>) -> bool {
    list.is_none_or(|cats| {
        cats.is_empty() || category.is_some_and(|c| cats.iter().any(|cat| cat == c))
    })
}

impl Voucher {
    /// Checks the active flag, the optional date window and the global
    /// usage cap.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        if !self.active {
            return false;
        }

        if self.valid_from.is_some_and(|from| now < from) {
            return false;
        }

        if self.valid_until.is_some_and(|until| now > until) {
            return false;
        }

        self.usage_limit
            .is_none_or(|limit| self.usage_count < limit)
    }

    /// Checks the customer allow-list and the per-customer redemption cap.
    ///
    /// `prior_uses` is the number of existing usage rows for this customer.
    #[must_use]
    pub fn can_be_used_by(&self, customer_id: i64, prior_uses: i64) -> bool {
        list_admits_id(self.applicable_customer_ids.as_ref(), customer_id)
            && prior_uses < self.usage_per_customer
    }

    /// Checks the product-id and category allow-lists. Both lists must
    /// admit the product when both are present.
    #[must_use]
    pub fn can_be_applied_to(&self, product: &Product) -> bool {
        list_admits_id(self.applicable_product_ids.as_ref(), product.product_id)
            && list_admits_category(
                self.applicable_categories.as_ref(),
                product.category.as_deref(),
            )
    }

    #[must_use]
    pub const fn discount_rule(&self) -> DiscountRule {
        DiscountRule {
            kind: self.discount_kind,
            value: self.discount_value,
            max_discount_amount: self.max_discount_amount,
        }
    }

    /// Runs every gate in order and returns the discount amount, or the
    /// first rejection encountered.
    ///
    /// # Errors
    /// Returns a `VoucherRejection` naming the failed gate.
    pub fn evaluate(
        &self,
        customer_id: i64,
        prior_uses: i64,
        product: &Product,
        order_amount: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, VoucherRejection> {
        if !self.is_valid(now) {
            return Err(VoucherRejection::NotCurrentlyValid);
        }

        if !self.can_be_used_by(customer_id, prior_uses) {
            return Err(VoucherRejection::NotUsableByCustomer);
        }

        if !self.can_be_applied_to(product) {
            return Err(VoucherRejection::NotApplicableToProduct);
        }

        if let Some(minimum) = self.min_order_amount
            && order_amount < minimum
        {
            return Err(VoucherRejection::BelowMinimumOrder { minimum });
        }

        Ok(resolve_discount(order_amount, &self.discount_rule()))
    }
}
