#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION};
use axum::http::{Method, Request, Response, StatusCode};
use gazette_core::model::news::NewNews;
use gazette_core::model::user::NewUser;
use gazette_core::repo::news_repo::{NewsRepository, SqliteNewsRepository};
use gazette_core::repo::session_repo::SqliteSessionRepository;
use gazette_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use gazette_core::{open_db_in_memory, AuthService, NewsId, Settings, UserId};
use gazette_web::{app_router, AppKind, AppState, SESSION_COOKIE};
use http_body_util::BodyExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use rusqlite::Connection;
use tower::ServiceExt;

/// Builds app state over a fresh in-memory database seeded by `seed`.
pub fn state_with<T>(kind: AppKind, seed: impl FnOnce(&Connection) -> T) -> (AppState, T) {
    let conn = open_db_in_memory().unwrap();
    let seeded = seed(&conn);
    let state = AppState::new(kind, conn, Settings::default()).unwrap();
    (state, seeded)
}

/// Creates a user with an unusable password.
pub fn create_user(conn: &Connection, username: &str) -> UserId {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser {
            username: username.to_string(),
            password_hash: "!".to_string(),
        })
        .unwrap()
        .id
}

/// `Cookie` header value of a fresh session for `user_id`.
pub fn login_cookie(conn: &Connection, user_id: UserId) -> String {
    let grant = AuthService::new(
        SqliteUserRepository::new(conn),
        SqliteSessionRepository::new(conn),
    )
    .start_session(user_id)
    .unwrap();
    format!("{SESSION_COOKIE}={}", grant.token)
}

pub fn create_news(conn: &Connection, title: &str) -> NewsId {
    SqliteNewsRepository::new(conn)
        .create_news(&NewNews::new(title, "Просто текст."))
        .unwrap()
        .id
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    request(Method::GET, uri, cookie, None)
}

pub fn post_form(uri: &str, cookie: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    request(Method::POST, uri, cookie, Some(form_body(fields)))
}

pub fn request(
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    form: Option<String>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    match form {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{key}={}", utf8_percent_encode(value, NON_ALPHANUMERIC)))
        .collect::<Vec<_>>()
        .join("&")
}

pub async fn send(state: &AppState, request: Request<Body>) -> Response<Body> {
    app_router(state.clone()).oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub fn assert_redirect(response: &Response<Body>, expected: &str) {
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], expected);
}

pub fn login_redirect(path: &str) -> String {
    format!("/auth/login/?next={path}")
}

pub async fn count(state: &AppState, table: &str) -> i64 {
    let conn = state.db().await;
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| row.get(0))
        .unwrap()
}
