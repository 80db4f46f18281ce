// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Financial approval state machines.
//!
//! Income reports and expense proposals are the two approval flows that
//! feed the financial transaction ledger. Approval stages a transaction;
//! settlement happens in a separate verification workflow that is the
//! only place cash balances change.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncomeReportStatus {
    Pending,
    Approved,
    Rejected,
}

impl IncomeReportStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// # Errors
    /// Returns `InvalidStatusTransition` unless the report is pending.
    pub fn validate_approve(&self) -> Result<(), DomainError> {
        self.require_pending("approved")
    }

    /// # Errors
    /// Returns `InvalidStatusTransition` unless the report is pending.
    pub fn validate_reject(&self) -> Result<(), DomainError> {
        self.require_pending("rejected")
    }

    /// Edits are allowed only while the report awaits a decision.
    ///
    /// # Errors
    /// Returns `InvalidStatusTransition` unless the report is pending.
    pub fn validate_update(&self) -> Result<(), DomainError> {
        self.require_pending(self.as_str())
    }

    /// # Errors
    /// Returns `InvalidStatusTransition` when the report was approved.
    pub fn validate_delete(&self) -> Result<(), DomainError> {
        match self {
            Self::Pending | Self::Rejected => Ok(()),
            Self::Approved => Err(DomainError::InvalidStatusTransition {
                entity: "income report",
                from: self.as_str().to_string(),
                to: String::from("deleted"),
                reason: String::from("approved income reports cannot be deleted"),
            }),
        }
    }

    fn require_pending(&self, to: &str) -> Result<(), DomainError> {
        if matches!(self, Self::Pending) {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                entity: "income report",
                from: self.as_str().to_string(),
                to: to.to_string(),
                reason: String::from("income report is no longer pending"),
            })
        }
    }
}

impl FromStr for IncomeReportStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(DomainError::InvalidIncomeReportStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for IncomeReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseProposalStatus {
    Pending,
    Approved,
    Rejected,
    Paid,
}

impl ExpenseProposalStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Paid => "paid",
        }
    }

    /// # Errors
    /// Returns `InvalidStatusTransition` unless the proposal is pending.
    pub fn validate_approve(&self) -> Result<(), DomainError> {
        self.require(matches!(self, Self::Pending), "approved")
    }

    /// # Errors
    /// Returns `InvalidStatusTransition` unless the proposal is pending.
    pub fn validate_reject(&self) -> Result<(), DomainError> {
        self.require(matches!(self, Self::Pending), "rejected")
    }

    /// Payment follows approval; nothing else can be paid out.
    ///
    /// # Errors
    /// Returns `InvalidStatusTransition` unless the proposal is approved.
    pub fn validate_mark_paid(&self) -> Result<(), DomainError> {
        self.require(matches!(self, Self::Approved), "paid")
    }

    /// # Errors
    /// Returns `InvalidStatusTransition` unless the proposal is pending.
    pub fn validate_update(&self) -> Result<(), DomainError> {
        self.require(matches!(self, Self::Pending), self.as_str())
    }

    /// # Errors
    /// Returns `InvalidStatusTransition` unless pending or rejected.
    pub fn validate_delete(&self) -> Result<(), DomainError> {
        self.require(matches!(self, Self::Pending | Self::Rejected), "deleted")
    }

    fn require(&self, ok: bool, to: &str) -> Result<(), DomainError> {
        if ok {
            Ok(())
        } else {
            Err(DomainError::InvalidStatusTransition {
                entity: "expense proposal",
                from: self.as_str().to_string(),
                to: to.to_string(),
                reason: String::from("expense proposal status does not allow this step"),
            })
        }
    }
}

impl FromStr for ExpenseProposalStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "paid" => Ok(Self::Paid),
            _ => Err(DomainError::InvalidExpenseProposalStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ExpenseProposalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger row status. `Verified` is only ever set by the external
/// settlement workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Verified,
}

impl TransactionStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Verified => "verified",
        }
    }
}

impl FromStr for TransactionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "verified" => Ok(Self::Verified),
            _ => Err(DomainError::InvalidTransactionStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(DomainError::InvalidTransactionKind(s.to_string())),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_report_status_round_trip() {
        for status in [
            IncomeReportStatus::Pending,
            IncomeReportStatus::Approved,
            IncomeReportStatus::Rejected,
        ] {
            let s = status.as_str();
            match IncomeReportStatus::from_str(s) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse income report status {s}: {e}"),
            }
        }
    }

    #[test]
    fn test_income_report_approve_only_from_pending() {
        assert!(IncomeReportStatus::Pending.validate_approve().is_ok());
        assert!(IncomeReportStatus::Approved.validate_approve().is_err());
        assert!(IncomeReportStatus::Rejected.validate_approve().is_err());
    }

    #[test]
    fn test_income_report_delete_guard() {
        assert!(IncomeReportStatus::Pending.validate_delete().is_ok());
        assert!(IncomeReportStatus::Rejected.validate_delete().is_ok());
        assert!(IncomeReportStatus::Approved.validate_delete().is_err());
    }

    #[test]
    fn test_expense_proposal_full_path() {
        assert!(ExpenseProposalStatus::Pending.validate_approve().is_ok());
        assert!(ExpenseProposalStatus::Approved.validate_mark_paid().is_ok());
        assert!(ExpenseProposalStatus::Paid.validate_mark_paid().is_err());
    }

    #[test]
    fn test_expense_proposal_mark_paid_requires_approval() {
        assert!(ExpenseProposalStatus::Pending.validate_mark_paid().is_err());
        assert!(ExpenseProposalStatus::Rejected.validate_mark_paid().is_err());
    }

    #[test]
    fn test_expense_proposal_update_pending_only() {
        assert!(ExpenseProposalStatus::Pending.validate_update().is_ok());
        assert!(ExpenseProposalStatus::Approved.validate_update().is_err());
        assert!(ExpenseProposalStatus::Paid.validate_update().is_err());
    }

    #[test]
    fn test_expense_proposal_delete_guard() {
        assert!(ExpenseProposalStatus::Pending.validate_delete().is_ok());
        assert!(ExpenseProposalStatus::Rejected.validate_delete().is_ok());
        assert!(ExpenseProposalStatus::Approved.validate_delete().is_err());
        assert!(ExpenseProposalStatus::Paid.validate_delete().is_err());
    }

    #[test]
    fn test_transaction_enums_round_trip() {
        for status in [
            TransactionStatus::Pending,
            TransactionStatus::Approved,
            TransactionStatus::Verified,
        ] {
            match TransactionStatus::from_str(status.as_str()) {
                Ok(parsed) => assert_eq!(status, parsed),
                Err(e) => panic!("Failed to parse transaction status: {e}"),
            }
        }
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            match TransactionKind::from_str(kind.as_str()) {
                Ok(parsed) => assert_eq!(kind, parsed),
                Err(e) => panic!("Failed to parse transaction kind: {e}"),
            }
        }
    }
}
