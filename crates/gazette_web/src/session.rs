//! Cookie sessions and the authentication gate.
//!
//! # Invariants
//! - `CurrentUser` rejects anonymous requests with a `302` to the login page
//!   carrying the full original path in `next`.
//! - Unknown or expired tokens resolve to anonymous.

use crate::error::WebError;
use crate::routes::redirect_found;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, Uri};
use axum::response::{IntoResponse, Response};
use cookie::{Cookie, SameSite};
use gazette_core::repo::session_repo::SqliteSessionRepository;
use gazette_core::repo::user_repo::SqliteUserRepository;
use gazette_core::{AuthService, User};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rusqlite::Connection;

pub const SESSION_COOKIE: &str = "sessionid";
pub const LOGIN_PATH: &str = "/auth/login/";

/// Characters kept literal in the `next` query value.
const NEXT_KEEP: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub type SqliteAuthService<'conn> =
    AuthService<SqliteUserRepository<'conn>, SqliteSessionRepository<'conn>>;

pub fn auth_service<'conn>(conn: &'conn Connection, state: &AppState) -> SqliteAuthService<'conn> {
    AuthService::with_session_ttl(
        SqliteUserRepository::new(conn),
        SqliteSessionRepository::new(conn),
        state.settings().session_ttl(),
    )
}

/// An authenticated requester. Anonymous requests are redirected to login.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// The requester, if authenticated.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<User>);

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = WebError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Ok(Self(None));
        };
        let conn = state.db().await;
        let user = auth_service(&conn, state).current_user(&token)?;
        Ok(Self(user))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await {
            Ok(MaybeUser(Some(user))) => Ok(Self(user)),
            Ok(MaybeUser(None)) => Err(login_redirect(&parts.uri)),
            Err(err) => Err(err.into_response()),
        }
    }
}

/// Reads the `sessionid` cookie value, if present.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// `302` to the login page with `next` set to the request path and query.
pub fn login_redirect(uri: &Uri) -> Response {
    let next = uri
        .path_and_query()
        .map_or_else(|| uri.path(), |value| value.as_str());
    redirect_found(&login_url(next))
}

pub fn login_url(next: &str) -> String {
    format!("{LOGIN_PATH}?next={}", utf8_percent_encode(next, NEXT_KEEP))
}

/// Accepts only local absolute paths as post-login targets.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|value| {
        value.starts_with('/')
            && !value.starts_with("//")
            && !value.contains('\\')
            && value.chars().all(|ch| ch.is_ascii_graphic())
    })
}

pub fn session_cookie(token: &str, max_age_secs: u64) -> Option<HeaderValue> {
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
    let cookie = Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::seconds(max_age))
        .build();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

pub fn expired_session_cookie() -> Option<HeaderValue> {
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(cookie::time::Duration::ZERO)
        .build();
    HeaderValue::from_str(&cookie.to_string()).ok()
}

/// Attaches a `Set-Cookie` header when the value could be built.
pub fn with_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(value) = cookie {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::{login_url, safe_next, session_cookie, session_token, SESSION_COOKIE};
    use axum::http::header::COOKIE;
    use axum::http::{HeaderMap, HeaderValue};

    #[test]
    fn login_url_keeps_slashes_and_escapes_query() {
        assert_eq!(login_url("/edit/test_slug/"), "/auth/login/?next=/edit/test_slug/");
        assert_eq!(login_url("/?page=2"), "/auth/login/?next=/%3Fpage%3D2");
    }

    #[test]
    fn session_token_is_found_among_other_cookies() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; sessionid=abc123; lang=ru"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
        assert!(session_token(&HeaderMap::new()).is_none());
    }

    #[test]
    fn only_local_paths_are_safe_next_targets() {
        assert_eq!(safe_next(Some("/notes/")), Some("/notes/"));
        assert_eq!(safe_next(Some("//evil.example/")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn session_cookie_is_http_only_and_lax() {
        let value = session_cookie("tok", 60).unwrap();
        let text = value.to_str().unwrap();
        assert!(text.starts_with(&format!("{SESSION_COOKIE}=tok")));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("SameSite=Lax"));
        assert!(text.contains("Max-Age=60"));
    }
}
