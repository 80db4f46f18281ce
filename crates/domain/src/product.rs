// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};

/// A sellable item (course or package).
///
/// The price is snapshotted onto each enrollment at order time, so later
/// product edits never change an existing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Canonical identifier.
    pub product_id: i64,
    /// Display code (e.g. "CRS-EN-A1").
    pub code: String,
    /// Display name.
    pub name: String,
    /// Optional category used by voucher/campaign applicability lists.
    pub category: Option<String>,
    /// The list price.
    pub list_price: i64,
    /// An optional sale price, effective only while `sale_active` is set.
    pub sale_price: Option<i64>,
    /// Whether the sale price is currently in effect.
    pub sale_active: bool,
    /// Number of sessions included in the package.
    pub total_sessions: i64,
    /// The per-session price snapshotted onto enrollments.
    pub price_per_session: i64,
}

impl Product {
    /// Returns the effective sale price: the sale price when one is set
    /// and active, otherwise the list price.
    #[must_use]
    pub fn current_price(&self) -> i64 {
        if self.sale_active {
            self.sale_price.unwrap_or(self.list_price)
        } else {
            self.list_price
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(list: i64, sale: Option<i64>, active: bool) -> Product {
        Product {
            product_id: 1,
            code: String::from("CRS-1"),
            name: String::from("Course"),
            category: None,
            list_price: list,
            sale_price: sale,
            sale_active: active,
            total_sessions: 24,
            price_per_session: list / 24,
        }
    }

    #[test]
    fn test_current_price_uses_active_sale_price() {
        assert_eq!(product(1_000_000, Some(800_000), true).current_price(), 800_000);
    }

    #[test]
    fn test_current_price_ignores_inactive_sale_price() {
        assert_eq!(product(1_000_000, Some(800_000), false).current_price(), 1_000_000);
    }

    #[test]
    fn test_current_price_falls_back_without_sale_price() {
        assert_eq!(product(1_000_000, None, true).current_price(), 1_000_000);
    }
}
