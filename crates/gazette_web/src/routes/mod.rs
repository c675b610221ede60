//! Routers for the two sites.
//!
//! Both mount the users pages under `/auth/`. Unknown paths answer `404`.

pub mod news;
pub mod notes;
pub mod users;

use crate::error::WebError;
use crate::middleware::request_logging;
use crate::state::{AppKind, AppState};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;

/// Router for the kind recorded in `state`.
pub fn app_router(state: AppState) -> Router {
    let site = match state.kind() {
        AppKind::News => news::router(),
        AppKind::Notes => notes::router(),
    };
    Router::new()
        .merge(site)
        .merge(users::router())
        .fallback(|| async { WebError::NotFound })
        .layer(axum::middleware::from_fn(request_logging))
        .with_state(state)
}

/// Plain `302 Found`.
pub(crate) fn redirect_found(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => (StatusCode::FOUND, [(LOCATION, value)]).into_response(),
        Err(_) => WebError::Internal(format!("invalid redirect target `{location}`")).into_response(),
    }
}

/// Parses an integer path segment; anything else is a missing page.
pub(crate) fn parse_id(raw: &str) -> Result<i64, WebError> {
    raw.parse::<i64>().map_err(|_| WebError::NotFound)
}
