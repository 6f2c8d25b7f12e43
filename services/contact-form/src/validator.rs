// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Submission field validator.
//!
//! - Required field presence (first name, last name, email)
//! - Email address format
//!
//! Validation is pure: it never touches the rate limiter or the mailer.

use crate::submission::{is_valid_email, Submission};
use thiserror::Error;
use tracing::debug;

/// Validation error types.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid email address")]
    InvalidEmail,
}

/// Result of validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Submission is valid
    Valid,
    /// Submission is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// Contact form submission validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubmissionValidator;

impl SubmissionValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate required fields, then the address format.
    pub fn validate(&self, submission: &Submission) -> ValidationResult {
        let required = [
            ("first_name", &submission.first_name),
            ("last_name", &submission.last_name),
            ("email", &submission.email),
        ];

        if let Some(&(field, _)) = required.iter().find(|(_, value)| value.is_empty()) {
            debug!(field, "Required field missing");
            return ValidationResult::Invalid(ValidationError::MissingField(field));
        }

        if !is_valid_email(&submission.email) {
            debug!("Email address failed format check");
            return ValidationResult::Invalid(ValidationError::InvalidEmail);
        }

        ValidationResult::Valid
    }
}
