//! User account model.
//!
//! # Invariants
//! - `username` is unique, 1..=150 characters of letters, digits and `@.+-_`.
//! - `password_hash` is an argon2 PHC string and is never serialized.

use super::{require_max_chars, require_text, ModelValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub type UserId = i64;

pub const USERNAME_MAX_CHARS: usize = 150;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

/// Registered account. The three roles seen by the views (author, other
/// user, anonymous) are derived per request, not stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Insert model for a new account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_username(&self.username)?;
        require_text("password_hash", &self.password_hash)
    }
}

/// Checks username shape without touching storage.
pub fn validate_username(username: &str) -> Result<(), ModelValidationError> {
    require_text("username", username)?;
    require_max_chars("username", username, USERNAME_MAX_CHARS)?;
    if !USERNAME_RE.is_match(username) {
        return Err(ModelValidationError::InvalidUsername(username.to_string()));
    }
    Ok(())
}
