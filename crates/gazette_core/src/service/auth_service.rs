//! Account and login-session use-case service.
//!
//! # Responsibility
//! - Register accounts with argon2-hashed passwords.
//! - Issue, resolve and revoke cookie sessions.
//!
//! # Invariants
//! - Plain session tokens are only ever returned to the caller; storage
//!   keeps their SHA-256 digest.
//! - Expired sessions resolve to anonymous and are purged whenever a new
//!   session starts.

use crate::form::auth_forms::{
    LoginForm, SignupForm, DUPLICATE_USERNAME_MESSAGE, INVALID_LOGIN_MESSAGE,
};
use crate::form::FormErrors;
use crate::model::now_epoch_ms;
use crate::model::user::{NewUser, User, UserId};
use crate::repo::session_repo::{SessionRecord, SessionRepository};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{info, warn};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Two weeks.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 60 * 60);
const SESSION_TOKEN_BYTES: usize = 32;

#[derive(Debug)]
pub enum AuthServiceError {
    Invalid(FormErrors),
    UserNotFound(UserId),
    PasswordHash(String),
    Repo(RepoError),
}

impl Display for AuthServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(_) => write!(f, "authentication form is invalid"),
            Self::UserNotFound(id) => write!(f, "user not found: {id}"),
            Self::PasswordHash(message) => write!(f, "password hashing failed: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AuthServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AuthServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    /// Plain token for the `sessionid` cookie.
    pub token: String,
    pub user: User,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

pub struct AuthService<U: UserRepository, S: SessionRepository> {
    users: U,
    sessions: S,
    session_ttl: Duration,
}

impl<U: UserRepository, S: SessionRepository> AuthService<U, S> {
    pub fn new(users: U, sessions: S) -> Self {
        Self::with_session_ttl(users, sessions, DEFAULT_SESSION_TTL)
    }

    pub fn with_session_ttl(users: U, sessions: S, session_ttl: Duration) -> Self {
        Self {
            users,
            sessions,
            session_ttl,
        }
    }

    pub fn signup(&self, form: &SignupForm) -> Result<User, AuthServiceError> {
        let data = form
            .clean(|username| self.users.username_exists(username))?
            .map_err(AuthServiceError::Invalid)?;
        self.register(&data.username, &data.password)
    }

    /// Creates an account without form-level checks beyond model validation.
    pub fn register(&self, username: &str, password: &str) -> Result<User, AuthServiceError> {
        let password_hash = hash_password(password)?;
        let user = self
            .users
            .create_user(&NewUser {
                username: username.to_string(),
                password_hash,
            })
            .map_err(|err| match err {
                RepoError::Duplicate { .. } => {
                    let mut errors = FormErrors::new();
                    errors.add("username", DUPLICATE_USERNAME_MESSAGE);
                    AuthServiceError::Invalid(errors)
                }
                other => other.into(),
            })?;
        info!("event=signup module=auth status=ok user_id={}", user.id);
        Ok(user)
    }

    pub fn login(&self, form: &LoginForm) -> Result<SessionGrant, AuthServiceError> {
        let (username, password) = form.clean().map_err(AuthServiceError::Invalid)?;

        let user = self.users.find_by_username(&username)?;
        let verified = user
            .as_ref()
            .is_some_and(|user| verify_password(&password, &user.password_hash));
        let Some(user) = user.filter(|_| verified) else {
            warn!("event=login module=auth status=rejected reason=bad_credentials");
            let mut errors = FormErrors::new();
            errors.add_non_field(INVALID_LOGIN_MESSAGE);
            return Err(AuthServiceError::Invalid(errors));
        };

        self.start_session(user.id)
    }

    /// Opens a session for `user_id` without checking credentials.
    ///
    /// Sessions already expired at this instant are deleted first.
    pub fn start_session(&self, user_id: UserId) -> Result<SessionGrant, AuthServiceError> {
        let user = self
            .users
            .get_user(user_id)?
            .ok_or(AuthServiceError::UserNotFound(user_id))?;

        let now = now_epoch_ms();
        let purged = self.sessions.purge_expired(now)?;
        if purged > 0 {
            info!("event=session_purge module=auth status=ok removed={purged}");
        }

        let token = generate_session_token();
        let ttl_ms = i64::try_from(self.session_ttl.as_millis()).unwrap_or(i64::MAX);
        let expires_at = now.saturating_add(ttl_ms);
        self.sessions.insert_session(&SessionRecord {
            token_hash: hash_session_token(&token),
            user_id,
            created_at: now,
            expires_at,
        })?;
        info!("event=login module=auth status=ok user_id={user_id}");

        Ok(SessionGrant {
            token,
            user,
            expires_at,
        })
    }

    /// Resolves a cookie token to its user; unknown or expired tokens yield `None`.
    pub fn current_user(&self, token: &str) -> Result<Option<User>, AuthServiceError> {
        Ok(self
            .sessions
            .find_active_user(&hash_session_token(token), now_epoch_ms())?)
    }

    /// Revokes the session; returns whether one existed.
    pub fn logout(&self, token: &str) -> Result<bool, AuthServiceError> {
        let removed = self.sessions.delete_session(&hash_session_token(token))?;
        info!("event=logout module=auth status=ok removed={removed}");
        Ok(removed)
    }

    pub fn purge_expired_sessions(&self) -> Result<usize, AuthServiceError> {
        Ok(self.sessions.purge_expired(now_epoch_ms())?)
    }
}

/// Hashes a password into an argon2 PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String, AuthServiceError> {
    let mut salt_bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| AuthServiceError::PasswordHash(err.to_string()))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AuthServiceError::PasswordHash(err.to_string()))
}

/// Unparseable hashes (e.g. accounts created without a password) never match.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(password_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Storage key for a session token.
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
