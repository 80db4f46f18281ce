// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use classledger_domain::DomainError;
use classledger_persistence::PersistenceError;

/// API-level errors.
///
/// These are distinct from domain/persistence errors and represent the
/// API contract. The server layer maps them onto HTTP status codes:
/// `InvalidInput` and `DomainRuleViolation` are 422, `ResourceNotFound`
/// is 404, `Internal` is 500.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A domain rule was violated, including status state conflicts.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked
/// directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidDiscountKind(value) => ApiError::InvalidInput {
            field: String::from("discount_kind"),
            message: format!("Unknown discount kind '{value}'"),
        },
        DomainError::InvalidEnrollmentStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown enrollment status '{value}'"),
        },
        DomainError::InvalidIncomeReportStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown income report status '{value}'"),
        },
        DomainError::InvalidExpenseProposalStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown expense proposal status '{value}'"),
        },
        DomainError::InvalidTransactionStatus(value) => ApiError::InvalidInput {
            field: String::from("status"),
            message: format!("Unknown transaction status '{value}'"),
        },
        DomainError::InvalidTransactionKind(value) => ApiError::InvalidInput {
            field: String::from("kind"),
            message: format!("Unknown transaction kind '{value}'"),
        },
        DomainError::InvalidStudentKind(value) => ApiError::InvalidInput {
            field: String::from("student_type"),
            message: format!("Unknown student type '{value}'"),
        },
        DomainError::InvalidStatusTransition {
            entity,
            from,
            to,
            reason,
        } => ApiError::DomainRuleViolation {
            rule: String::from("status_transition"),
            message: format!("Cannot move {entity} from '{from}' to '{to}': {reason}"),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// `NotFound` becomes a resource-not-found for the named resource type;
/// everything else is an internal error. Handler-level status guards run
/// before the database write, so a `NotFound` raised by a guarded update
/// (row exists but is no longer in the required status) is surfaced as a
/// state conflict by the callers that expect it.
#[must_use]
pub fn translate_persistence_error(resource_type: &str, err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from(resource_type),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
