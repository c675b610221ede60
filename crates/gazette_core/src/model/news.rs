//! News items and their comments.
//!
//! # Invariants
//! - `News.title` is 1..=50 characters.
//! - A comment belongs to exactly one news item and one author.
//! - `Comment.created_at` is assigned once at creation and drives ordering.

use super::user::UserId;
use super::{now_epoch_ms, require_max_chars, require_text, ModelValidationError};
use chrono::NaiveDate;
use serde::Serialize;

pub type NewsId = i64;
pub type CommentId = i64;

pub const NEWS_TITLE_MAX_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct News {
    pub id: NewsId,
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

/// Insert model for a news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNews {
    pub title: String,
    pub text: String,
    pub date: NaiveDate,
}

impl NewNews {
    /// News item published today (local calendar date).
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self::dated(title, text, chrono::Local::now().date_naive())
    }

    pub fn dated(title: impl Into<String>, text: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            date,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("title", &self.title)?;
        require_max_chars("title", &self.title, NEWS_TITLE_MAX_CHARS)?;
        require_text("text", &self.text)
    }
}

/// Comment read model, joined with its author's username for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub news_id: NewsId,
    pub author_id: UserId,
    pub author_username: String,
    pub text: String,
    /// Epoch milliseconds.
    pub created_at: i64,
}

/// Insert model for a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub news_id: NewsId,
    pub author_id: UserId,
    pub text: String,
    pub created_at: i64,
}

impl NewComment {
    /// Comment stamped with the current time.
    pub fn new(news_id: NewsId, author_id: UserId, text: impl Into<String>) -> Self {
        Self {
            news_id,
            author_id,
            text: text.into(),
            created_at: now_epoch_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("text", &self.text)
    }
}
