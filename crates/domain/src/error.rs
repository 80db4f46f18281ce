// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Discount kind string is not recognized.
    InvalidDiscountKind(String),
    /// Enrollment status string is not recognized.
    InvalidEnrollmentStatus(String),
    /// Income report status string is not recognized.
    InvalidIncomeReportStatus(String),
    /// Expense proposal status string is not recognized.
    InvalidExpenseProposalStatus(String),
    /// Financial transaction status string is not recognized.
    InvalidTransactionStatus(String),
    /// Financial transaction kind string is not recognized.
    InvalidTransactionKind(String),
    /// Student kind string is not recognized.
    InvalidStudentKind(String),
    /// A status transition is not permitted by the lifecycle rules.
    InvalidStatusTransition {
        /// The entity whose status was being changed.
        entity: &'static str,
        /// The current status.
        from: String,
        /// The requested target status.
        to: String,
        /// Why the transition is not allowed.
        reason: String,
    },
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDiscountKind(s) => write!(f, "Invalid discount kind: {s}"),
            Self::InvalidEnrollmentStatus(s) => write!(f, "Invalid enrollment status: {s}"),
            Self::InvalidIncomeReportStatus(s) => {
                write!(f, "Invalid income report status: {s}")
            }
            Self::InvalidExpenseProposalStatus(s) => {
                write!(f, "Invalid expense proposal status: {s}")
            }
            Self::InvalidTransactionStatus(s) => {
                write!(f, "Invalid financial transaction status: {s}")
            }
            Self::InvalidTransactionKind(s) => {
                write!(f, "Invalid financial transaction kind: {s}")
            }
            Self::InvalidStudentKind(s) => write!(f, "Invalid student kind: {s}"),
            Self::InvalidStatusTransition {
                entity,
                from,
                to,
                reason,
            } => {
                write!(f, "Cannot move {entity} from '{from}' to '{to}': {reason}")
            }
        }
    }
}

impl std::error::Error for DomainError {}
