//! Core domain logic for Gazette.
//! This crate is the single source of truth for business invariants shared by
//! the news and notes web applications.

pub mod config;
pub mod db;
pub mod form;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, Settings};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use form::{FormErrors, NON_FIELD_ERRORS};
pub use logging::{default_log_level, init_logging, logging_status, LogSink};
pub use model::news::{Comment, CommentId, NewComment, NewNews, News, NewsId};
pub use model::note::{Note, NoteDraft, NoteId};
pub use model::user::{NewUser, User, UserId};
pub use model::ModelValidationError;
pub use repo::{RepoError, RepoResult};
pub use service::auth_service::{AuthService, AuthServiceError, SessionGrant};
pub use service::news_service::{HomePage, NewsDetail, NewsService, NewsServiceError};
pub use service::note_service::{NoteService, NoteServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
