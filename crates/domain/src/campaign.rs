// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Campaign eligibility and auto-apply selection.
//!
//! Campaigns differ from vouchers in two ways: the date window is
//! mandatory on both sides, and a campaign is referenced by id rather
//! than presented by code. Auto-apply selection over the eligible set
//! is a separate concern handled by [`best_auto_apply`].

use crate::pricing::{DiscountKind, DiscountRule, resolve_discount};
use crate::product::Product;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A promotional campaign as loaded from storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Campaign {
    pub campaign_id: i64,
    pub name: String,
    pub active: bool,
    pub discount_kind: DiscountKind,
    pub discount_value: i64,
    pub max_discount_amount: Option<i64>,
    pub min_order_amount: Option<i64>,
    /// Mandatory window start.
    pub start_date: DateTime<Utc>,
    /// Mandatory window end.
    pub end_date: DateTime<Utc>,
    pub usage_limit: Option<i64>,
    pub usage_count: i64,
    /// Whether this campaign participates in auto-apply selection.
    pub auto_apply: bool,
    /// Higher priority campaigns are considered first.
    pub priority: i64,
    pub applicable_product_ids: Option<Vec<i64>>,
    pub applicable_categories: Option<Vec<String>>,
    /// Stored for reporting only; never checked at apply time.
    pub target_customer_segments: Option<Vec<String>>,
}

/// Why a directly requested campaign did not apply, in gate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CampaignRejection {
    /// Inactive, outside the date window, or globally exhausted.
    NotCurrentlyValid,
    /// The product is outside the applicability lists.
    NotApplicableToProduct,
    /// The order amount is under the campaign's minimum.
    BelowMinimumOrder { minimum: i64 },
}

impl std::fmt::Display for CampaignRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotCurrentlyValid => {
                write!(f, "Campaign is not currently valid")
            }
            Self::NotApplicableToProduct => {
                write!(f, "Campaign does not apply to this product")
            }
            Self::BelowMinimumOrder { minimum } => {
                write!(f, "Order amount is below the campaign minimum of {minimum}")
            }
        }
    }
}

fn list_admits_id(list: Option<&Vec<i64>>, id: i64) -> bool {
    list.is_none_or(|ids| ids.is_empty() || ids.contains(&id))
}

fn list_admits_category(list: Option<&Vec<String>>, category: Option<&str>) -> bool {
    list.is_none_or(|cats| {
        cats.is_empty() || category.is_some_and(|c| cats.iter().any(|cat| cat == c))
    })
}

impl Campaign {
    /// Checks the active flag, the mandatory date window and the total
    /// usage cap.
    #[must_use]
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.active
            && now >= self.start_date
            && now <= self.end_date
            && self.usage_limit.is_none_or(|limit| self.usage_count < limit)
    }

    /// Same allow-list semantics as vouchers.
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
    /// This is the path for a campaign the request names directly; the
    /// `auto_apply` flag only governs [`best_auto_apply`] selection and
    /// is not a gate here.
    ///
    /// # Errors
    /// Returns a `CampaignRejection` naming the failed gate.
    pub fn evaluate(
        &self,
        product: &Product,
        order_amount: i64,
        now: DateTime<Utc>,
    ) -> Result<i64, CampaignRejection> {
        if !self.is_valid(now) {
            return Err(CampaignRejection::NotCurrentlyValid);
        }

        if !self.can_be_applied_to(product) {
            return Err(CampaignRejection::NotApplicableToProduct);
        }

        if let Some(minimum) = self.min_order_amount
            && order_amount < minimum
        {
            return Err(CampaignRejection::BelowMinimumOrder { minimum });
        }

        Ok(resolve_discount(order_amount, &self.discount_rule()))
    }
}

/// Picks the auto-apply campaign yielding the greatest discount.
///
/// `campaigns` must already be ordered by priority descending, then id
/// ascending. A later campaign replaces the current pick only when its
/// discount is strictly greater, so the highest-priority campaign keeps
/// ties. Returns `None` when no campaign qualifies.
#[must_use]
pub fn best_auto_apply<'a>(
    campaigns: &'a [Campaign],
    product: &Product,
    order_amount: i64,
    now: DateTime<Utc>,
) -> Option<(&'a Campaign, i64)> {
    let mut best: Option<(&Campaign, i64)> = None;

    for campaign in campaigns {
        if !campaign.auto_apply
            || !campaign.is_valid(now)
            || !campaign.can_be_applied_to(product)
        {
            continue;
        }

        if campaign
            .min_order_amount
            .is_some_and(|minimum| order_amount < minimum)
        {
            continue;
        }

        let discount: i64 = resolve_discount(order_amount, &campaign.discount_rule());
        if discount <= 0 {
            continue;
        }

        match best {
            Some((_, best_discount)) if discount <= best_discount => {}
            _ => best = Some((campaign, discount)),
        }
    }

    best
}
