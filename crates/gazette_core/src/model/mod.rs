//! Domain model for the news and notes applications.
//!
//! # Responsibility
//! - Define canonical records shared by repositories, services and views.
//! - Own field-level invariants (`validate()`) enforced before persistence.
//!
//! # Invariants
//! - Every persisted record is identified by a SQLite `INTEGER PRIMARY KEY`.
//! - Timestamps are UTC epoch milliseconds; news dates are calendar dates.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod news;
pub mod note;
pub mod user;

/// Violation of a model-level field invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelValidationError {
    /// Required text field is blank.
    EmptyField(&'static str),
    /// Text field exceeds its character budget.
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Slug contains characters outside `[-a-zA-Z0-9_]`.
    InvalidSlug(String),
    /// Username contains characters outside `[\w.@+-]`.
    InvalidUsername(String),
}

impl Display for ModelValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "field `{field}` must not be empty"),
            Self::TooLong { field, max, actual } => write!(
                f,
                "field `{field}` has {actual} characters, at most {max} allowed"
            ),
            Self::InvalidSlug(value) => write!(f, "invalid slug `{value}`"),
            Self::InvalidUsername(value) => write!(f, "invalid username `{value}`"),
        }
    }
}

impl Error for ModelValidationError {}

/// Current UTC time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ModelValidationError> {
    if value.trim().is_empty() {
        return Err(ModelValidationError::EmptyField(field));
    }
    Ok(())
}

pub(crate) fn require_max_chars(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ModelValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ModelValidationError::TooLong { field, max, actual });
    }
    Ok(())
}
