// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Discount resolution.
//!
//! A discount rule is either a percentage of the order amount (optionally
//! capped) or a fixed amount (clamped to the order amount). Both vouchers
//! and campaigns reduce to the same rule shape before computation.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The two supported discount computation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// A percentage of the order amount, optionally capped.
    Percentage,
    /// A fixed amount, never exceeding the order amount.
    FixedAmount,
}

impl DiscountKind {
    /// Returns the string representation used for persistence and API
    /// serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::FixedAmount => "fixed_amount",
        }
    }
}

impl FromStr for DiscountKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(Self::Percentage),
            "fixed_amount" => Ok(Self::FixedAmount),
            _ => Err(DomainError::InvalidDiscountKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A discount rule extracted from a voucher or a campaign.
///
/// Amounts are whole currency units (no fractional part).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountRule {
    /// How the discount is computed.
    pub kind: DiscountKind,
    /// Percentage (0-100) for `Percentage`, amount for `FixedAmount`.
    pub value: i64,
    /// Upper bound for percentage discounts. Ignored for fixed amounts.
    pub max_discount_amount: Option<i64>,
}

/// Computes the discount a rule yields on a base price.
///
/// The result is always within `[0, base_price]`, so the discounted
/// final price can never go negative.
#[must_use]
pub fn resolve_discount(base_price: i64, rule: &DiscountRule) -> i64 {
    if base_price <= 0 {
        return 0;
    }

    let discount: i64 = match rule.kind {
        DiscountKind::Percentage => {
            let raw: i64 = base_price.saturating_mul(rule.value) / 100;
            rule.max_discount_amount.map_or(raw, |cap| raw.min(cap))
        }
        DiscountKind::FixedAmount => rule.value,
    };

    discount.clamp(0, base_price)
}
