//! Login session storage.
//!
//! Only a SHA-256 digest of the cookie token is stored, so a leaked database
//! does not leak usable cookies.

use crate::model::user::{User, UserId};
use crate::repo::user_repo::parse_user_row;
use crate::repo::RepoResult;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    /// Hex SHA-256 of the cookie token.
    pub token_hash: String,
    pub user_id: UserId,
    /// Epoch milliseconds.
    pub created_at: i64,
    /// Epoch milliseconds; the session is dead at or after this instant.
    pub expires_at: i64,
}

pub trait SessionRepository {
    fn insert_session(&self, record: &SessionRecord) -> RepoResult<()>;
    /// Returns the session owner when the session exists and has not expired.
    fn find_active_user(&self, token_hash: &str, now_ms: i64) -> RepoResult<Option<User>>;
    /// Returns whether a row was removed.
    fn delete_session(&self, token_hash: &str) -> RepoResult<bool>;
    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize>;
}

pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn insert_session(&self, record: &SessionRecord) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                record.token_hash.as_str(),
                record.user_id,
                record.created_at,
                record.expires_at,
            ],
        )?;
        Ok(())
    }

    fn find_active_user(&self, token_hash: &str, now_ms: i64) -> RepoResult<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT u.id, u.username, u.password_hash, u.created_at
                 FROM sessions s
                 INNER JOIN users u ON u.id = s.user_id
                 WHERE s.token_hash = ?1
                   AND s.expires_at > ?2;",
                params![token_hash, now_ms],
                parse_user_row,
            )
            .optional()?;
        Ok(user)
    }

    fn delete_session(&self, token_hash: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE token_hash = ?1;", [token_hash])?;
        Ok(changed > 0)
    }

    fn purge_expired(&self, now_ms: i64) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?1;", [now_ms])?;
        Ok(changed)
    }
}
