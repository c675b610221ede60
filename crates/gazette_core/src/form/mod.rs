//! Form-level validation for user submissions.
//!
//! # Responsibility
//! - Turn raw submitted key/value fields into cleaned model drafts.
//! - Collect every field error in one pass so the page can re-render them.
//!
//! # Invariants
//! - Text inputs are trimmed before validation and persistence.
//! - A form with any error never produces a draft.

use serde::Serialize;
use std::collections::BTreeMap;

pub mod auth_forms;
pub mod comment_form;
pub mod note_form;

/// Key used for errors that belong to the whole form.
pub const NON_FIELD_ERRORS: &str = "__all__";
pub const REQUIRED_MESSAGE: &str = "This field is required.";

/// Field name to ordered list of messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.add(NON_FIELD_ERRORS, message);
    }

    /// Messages attached to `field`; empty when the field is clean.
    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn non_field(&self) -> &[String] {
        self.field(NON_FIELD_ERRORS)
    }

    pub fn has(&self, field: &str) -> bool {
        !self.field(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Trims `value` and records `REQUIRED_MESSAGE` when nothing is left.
pub(crate) fn clean_required(field: &str, value: &str, errors: &mut FormErrors) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
        return None;
    }
    Some(trimmed.to_string())
}

/// Records the max-length message when `value` exceeds `max` characters.
pub(crate) fn check_max_chars(
    field: &str,
    value: Option<String>,
    max: usize,
    errors: &mut FormErrors,
) -> Option<String> {
    let value = value?;
    let actual = value.chars().count();
    if actual > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters (it has {actual})."),
        );
        return None;
    }
    Some(value)
}
