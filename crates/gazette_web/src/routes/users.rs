//! Login, logout and signup pages, mounted into both sites under `/auth/`.

use super::redirect_found;
use crate::error::WebResult;
use crate::render::{page_context, render};
use crate::session::{
    auth_service, expired_session_cookie, safe_next, session_cookie, session_token, with_cookie,
    MaybeUser, LOGIN_PATH,
};
use crate::state::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use gazette_core::form::auth_forms::{LoginForm, SignupForm};
use gazette_core::{AuthServiceError, FormErrors, User};
use log::info;
use serde::Deserialize;

const HOME_PATH: &str = "/";

pub fn router() -> Router<AppState> {
    Router::new()
        .route(LOGIN_PATH, get(login_page).post(login))
        .route("/auth/logout/", get(logout).post(logout))
        .route("/auth/signup/", get(signup_page).post(signup))
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

async fn login_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
) -> WebResult<Html<String>> {
    let form = LoginForm {
        next: query.next,
        ..LoginForm::default()
    };
    render_login(&state, user.as_ref(), &form, &FormErrors::new())
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> WebResult<Response> {
    let conn = state.db().await;
    match auth_service(&conn, &state).login(&form) {
        Ok(grant) => {
            let target = safe_next(form.next.as_deref()).unwrap_or(HOME_PATH);
            let cookie = session_cookie(&grant.token, state.settings().session_ttl_secs);
            Ok(with_cookie(redirect_found(target), cookie))
        }
        Err(AuthServiceError::Invalid(errors)) => {
            Ok(render_login(&state, None, &form, &errors)?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> WebResult<Response> {
    if let Some(token) = session_token(&headers) {
        let conn = state.db().await;
        auth_service(&conn, &state).logout(&token)?;
    } else {
        info!("event=logout module=auth status=ok removed=false reason=no_session");
    }
    let page = render(&state, "users/logout.html", &page_context(&state, None))?;
    Ok(with_cookie(page.into_response(), expired_session_cookie()))
}

async fn signup_page(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> WebResult<Html<String>> {
    render_signup(&state, user.as_ref(), &SignupForm::default(), &FormErrors::new())
}

async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> WebResult<Response> {
    let conn = state.db().await;
    match auth_service(&conn, &state).signup(&form) {
        Ok(_) => Ok(redirect_found(HOME_PATH)),
        Err(AuthServiceError::Invalid(errors)) => {
            Ok(render_signup(&state, None, &form, &errors)?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

fn render_login(
    state: &AppState,
    user: Option<&User>,
    form: &LoginForm,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    let mut context = page_context(state, user);
    context.insert("form", form);
    context.insert("next", form.next.as_deref().unwrap_or_default());
    context.insert("errors", errors);
    render(state, "users/login.html", &context)
}

fn render_signup(
    state: &AppState,
    user: Option<&User>,
    form: &SignupForm,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    let mut context = page_context(state, user);
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "users/signup.html", &context)
}
