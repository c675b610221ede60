//! HTTP error mapping.
//!
//! Hidden objects (missing, or owned by someone else) become `404`. Every
//! other failure is logged and answered with a bare `500`.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use gazette_core::{
    AuthServiceError, DbError, NewsServiceError, NoteServiceError, RepoError,
};
use log::error;

const NOT_FOUND_PAGE: &str = include_str!("../templates/404.html");
const SERVER_ERROR_PAGE: &str = "<h1>Server Error (500)</h1>";

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    #[error("not found")]
    NotFound,
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("database error: {0}")]
    Db(#[from] DbError),
    #[error("repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("{0}")]
    Internal(String),
}

impl From<NewsServiceError> for WebError {
    fn from(value: NewsServiceError) -> Self {
        match value {
            NewsServiceError::NewsNotFound(_) | NewsServiceError::CommentNotFound(_) => {
                Self::NotFound
            }
            NewsServiceError::Repo(err) => Self::Repo(err),
            NewsServiceError::Invalid(_) => Self::Internal("unhandled comment form errors".into()),
        }
    }
}

impl From<NoteServiceError> for WebError {
    fn from(value: NoteServiceError) -> Self {
        match value {
            NoteServiceError::NoteNotFound(_) => Self::NotFound,
            NoteServiceError::Repo(err) => Self::Repo(err),
            NoteServiceError::Invalid(_) => Self::Internal("unhandled note form errors".into()),
        }
    }
}

impl From<AuthServiceError> for WebError {
    fn from(value: AuthServiceError) -> Self {
        match value {
            AuthServiceError::Repo(err) => Self::Repo(err),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            Self::NotFound => (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE)).into_response(),
            other => {
                error!("event=http_error module=web status=error error={other}");
                (StatusCode::INTERNAL_SERVER_ERROR, Html(SERVER_ERROR_PAGE)).into_response()
            }
        }
    }
}

pub type WebResult<T> = Result<T, WebError>;
