// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment lifecycle and discount selection.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The lifecycle status of an enrollment.
///
/// `Refunded` exists in the data model but no operation here produces
/// it; refunds run through an external reversal process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    Pending,
    Approved,
    Paid,
    Active,
    Completed,
    Cancelled,
    Refunded,
}

impl EnrollmentStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Paid => "paid",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
        }
    }

    /// Cancellation is allowed only before money has moved.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    /// Enrollments that reached approval or beyond must be kept.
    #[must_use]
    pub const fn blocks_deletion(&self) -> bool {
        matches!(
            self,
            Self::Approved | Self::Paid | Self::Active | Self::Completed
        )
    }

    /// Validates a cancellation request against the current status.
    ///
    /// # Errors
    /// Returns `InvalidStatusTransition` when the enrollment is already
    /// paid, active, completed or cancelled.
    pub fn validate_cancel(&self) -> Result<(), DomainError> {
        if self.can_cancel() {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                entity: "enrollment",
                from: self.as_str().to_string(),
                to: Self::Cancelled.as_str().to_string(),
                reason: String::from("only pending or approved enrollments can be cancelled"),
            })
        }
    }
}

impl FromStr for EnrollmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "paid" => Ok(Self::Paid),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "refunded" => Ok(Self::Refunded),
            _ => Err(DomainError::InvalidEnrollmentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The student an enrollment is for. A customer may enroll themselves
/// or one of their children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum StudentRef {
    Customer(i64),
    Child(i64),
}

impl StudentRef {
    #[must_use]
    pub const fn kind_str(&self) -> &'static str {
        match self {
            Self::Customer(_) => "customer",
            Self::Child(_) => "child",
        }
    }

    #[must_use]
    pub const fn student_id(&self) -> i64 {
        match self {
            Self::Customer(id) | Self::Child(id) => *id,
        }
    }

    /// Reassembles the reference from its persisted columns.
    ///
    /// # Errors
    /// Returns `InvalidStudentKind` for an unknown kind string.
    pub fn from_parts(kind: &str, id: i64) -> Result<Self, DomainError> {
        match kind {
            "customer" => Ok(Self::Customer(id)),
            "child" => Ok(Self::Child(id)),
            _ => Err(DomainError::InvalidStudentKind(kind.to_string())),
        }
    }
}

/// A voucher discount that passed every eligibility gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoucherQuote {
    pub voucher_id: i64,
    pub code: String,
    pub amount: i64,
}

/// A campaign discount that passed every eligibility gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CampaignQuote {
    pub campaign_id: i64,
    pub amount: i64,
}

/// The single discount an enrollment ends up carrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscountSelection {
    None,
    Voucher {
        voucher_id: i64,
        code: String,
        amount: i64,
    },
    Campaign {
        campaign_id: i64,
        amount: i64,
    },
}

impl DiscountSelection {
    #[must_use]
    pub const fn amount(&self) -> i64 {
        match self {
            Self::None => 0,
            Self::Voucher { amount, .. } | Self::Campaign { amount, .. } => *amount,
        }
    }
}

/// Chooses between an eligible voucher and an auto-applied campaign.
///
/// The campaign wins only when no voucher qualified or its discount is
/// strictly greater. A tie keeps the voucher the customer asked for.
#[must_use]
pub fn select_discount(
    voucher: Option<VoucherQuote>,
    campaign: Option<CampaignQuote>,
) -> DiscountSelection {
    match (voucher, campaign) {
        (None, None) => DiscountSelection::None,
        (Some(v), None) => DiscountSelection::Voucher {
            voucher_id: v.voucher_id,
            code: v.code,
            amount: v.amount,
        },
        (None, Some(c)) => DiscountSelection::Campaign {
            campaign_id: c.campaign_id,
            amount: c.amount,
        },
        (Some(v), Some(c)) => {
            if c.amount > v.amount {
                DiscountSelection::Campaign {
                    campaign_id: c.campaign_id,
                    amount: c.amount,
                }
            } else {
                DiscountSelection::Voucher {
                    voucher_id: v.voucher_id,
                    code: v.code,
                    amount: v.amount,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_round_trip() {
        for status in [
            EnrollmentStatus::Pending,
            EnrollmentStatus::Approved,
            EnrollmentStatus::Paid,
            EnrollmentStatus::Active,
            EnrollmentStatus::Completed,
            EnrollmentStatus::Cancelled,
            EnrollmentStatus::Refunded,
        ] {
            let s = status.as_str();
            match EnrollmentStatus::from_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse enrollment status {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_cancel_guard() {
        assert!(EnrollmentStatus::Pending.validate_cancel().is_ok());
        assert!(EnrollmentStatus::Approved.validate_cancel().is_ok());
        for status in [
            EnrollmentStatus::Paid,
            EnrollmentStatus::Active,
            EnrollmentStatus::Completed,
            EnrollmentStatus::Cancelled,
        ] {
            assert!(status.validate_cancel().is_err());
        }
    }

    #[test]
    fn test_deletion_guard() {
        assert!(!EnrollmentStatus::Pending.blocks_deletion());
        assert!(!EnrollmentStatus::Cancelled.blocks_deletion());
        assert!(EnrollmentStatus::Approved.blocks_deletion());
        assert!(EnrollmentStatus::Paid.blocks_deletion());
        assert!(EnrollmentStatus::Active.blocks_deletion());
        assert!(EnrollmentStatus::Completed.blocks_deletion());
    }

    #[test]
    fn test_student_ref_parts_round_trip() {
        let refs = [StudentRef::Customer(4), StudentRef::Child(9)];
        for r in refs {
            match StudentRef::from_parts(r.kind_str(), r.student_id()) {
                Ok(parsed) => assert_eq!(r, parsed),
                Err(e) => panic!("Failed to rebuild student ref: {e}"),
            }
        }
        assert!(StudentRef::from_parts("teacher", 1).is_err());
    }

    fn voucher_quote(amount: i64) -> VoucherQuote {
        VoucherQuote {
            voucher_id: 7,
            code: String::from("WELCOME10"),
            amount,
        }
    }

    const fn campaign_quote(amount: i64) -> CampaignQuote {
        CampaignQuote {
            campaign_id: 2,
            amount,
        }
    }

    #[test]
    fn test_campaign_wins_only_when_strictly_greater() {
        let selection = select_discount(Some(voucher_quote(50_000)), Some(campaign_quote(80_000)));
        assert!(matches!(selection, DiscountSelection::Campaign { .. }));
        assert_eq!(selection.amount(), 80_000);
    }

    #[test]
    fn test_tie_keeps_the_voucher() {
        let selection = select_discount(Some(voucher_quote(50_000)), Some(campaign_quote(50_000)));
        assert!(matches!(selection, DiscountSelection::Voucher { .. }));
    }

    #[test]
    fn test_smaller_campaign_loses() {
        let selection = select_discount(Some(voucher_quote(50_000)), Some(campaign_quote(30_000)));
        assert!(matches!(selection, DiscountSelection::Voucher { .. }));
    }

    #[test]
    fn test_campaign_applies_when_no_voucher() {
        let selection = select_discount(None, Some(campaign_quote(30_000)));
        assert!(matches!(selection, DiscountSelection::Campaign { .. }));
    }

    #[test]
    fn test_no_discount() {
        let selection = select_discount(None, None);
        assert_eq!(selection, DiscountSelection::None);
        assert_eq!(selection.amount(), 0);
    }
}
