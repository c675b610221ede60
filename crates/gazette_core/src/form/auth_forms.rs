//! Signup and login forms.

use super::{check_max_chars, clean_required, FormErrors, REQUIRED_MESSAGE};
use crate::model::user::{validate_username, USERNAME_MAX_CHARS};
use crate::repo::RepoResult;
use serde::{Deserialize, Serialize};

pub const INVALID_USERNAME_MESSAGE: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const DUPLICATE_USERNAME_MESSAGE: &str = "A user with that username already exists.";
pub const PASSWORD_MISMATCH_MESSAGE: &str = "The two password fields didn’t match.";
pub const INVALID_LOGIN_MESSAGE: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password1: String,
    #[serde(default, skip_serializing)]
    pub password2: String,
}

/// Cleaned signup input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupData {
    pub username: String,
    pub password: String,
}

impl SignupForm {
    pub fn clean(
        &self,
        username_taken: impl FnOnce(&str) -> RepoResult<bool>,
    ) -> RepoResult<Result<SignupData, FormErrors>> {
        let mut errors = FormErrors::new();

        let username = clean_required("username", &self.username, &mut errors);
        let username = check_max_chars("username", username, USERNAME_MAX_CHARS, &mut errors);
        let username = match username {
            Some(value) if validate_username(&value).is_err() => {
                errors.add("username", INVALID_USERNAME_MESSAGE);
                None
            }
            other => other,
        };
        if let Some(value) = username.as_deref() {
            if username_taken(value)? {
                errors.add("username", DUPLICATE_USERNAME_MESSAGE);
            }
        }

        let password1 = require_raw("password1", &self.password1, &mut errors);
        let password2 = require_raw("password2", &self.password2, &mut errors);
        if let (Some(first), Some(second)) = (password1.as_deref(), password2.as_deref()) {
            if first != second {
                errors.add("password2", PASSWORD_MISMATCH_MESSAGE);
            }
        }

        match (username, password1) {
            (Some(username), Some(password)) if errors.is_empty() => {
                Ok(Ok(SignupData { username, password }))
            }
            _ => Ok(Err(errors)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    /// Local path to return to after a successful login.
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    /// Returns `(username, password)` when both are present.
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::new();
        let username = clean_required("username", &self.username, &mut errors);
        let password = require_raw("password", &self.password, &mut errors);
        match (username, password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(errors),
        }
    }
}

/// Passwords are compared verbatim, so they are only checked for presence.
fn require_raw(field: &str, value: &str, errors: &mut FormErrors) -> Option<String> {
    if value.is_empty() {
        errors.add(field, REQUIRED_MESSAGE);
        return None;
    }
    Some(value.to_string())
}
