// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Field-level request validation.
//!
//! These checks run before any database work. They cover the shape of
//! the input only; status and eligibility rules live in the domain
//! crate.

use thiserror::Error;

use crate::error::ApiError;

/// Request field validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required text field was empty or whitespace.
    #[error("'{field}' must not be empty")]
    EmptyField { field: String },

    /// An amount field was zero or negative.
    #[error("'{field}' must be greater than zero")]
    NonPositiveAmount { field: String },
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let field: String = match &err {
            ValidationError::EmptyField { field }
            | ValidationError::NonPositiveAmount { field } => field.clone(),
        };
        Self::InvalidInput {
            field,
            message: err.to_string(),
        }
    }
}

/// Rejects empty or whitespace-only text.
///
/// # Errors
///
/// Returns `EmptyField` naming the field.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: String::from(field),
        });
    }
    Ok(())
}

/// Rejects zero or negative amounts.
///
/// # Errors
///
/// Returns `NonPositiveAmount` naming the field.
pub fn require_positive(field: &str, value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(ValidationError::NonPositiveAmount {
            field: String::from(field),
        });
    }
    Ok(())
}
