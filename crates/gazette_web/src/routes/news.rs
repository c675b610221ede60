//! News site: home list, detail with comments, comment edit/delete.

use super::{parse_id, redirect_found};
use crate::error::WebResult;
use crate::render::{page_context, render};
use crate::session::{CurrentUser, MaybeUser};
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use gazette_core::form::comment_form::CommentForm;
use gazette_core::repo::news_repo::SqliteNewsRepository;
use gazette_core::{Comment, FormErrors, NewsDetail, NewsId, NewsService, NewsServiceError, User};
use rusqlite::Connection;
use serde::Deserialize;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/news/:id/", get(detail).post(add_comment))
        .route("/edit_comment/:id/", get(edit_page).post(edit_comment))
        .route(
            "/delete_comment/:id/",
            get(delete_page).post(delete_comment).delete(delete_comment),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

fn news_service<'conn>(
    conn: &'conn Connection,
    state: &AppState,
) -> NewsService<SqliteNewsRepository<'conn>> {
    NewsService::with_page_size(
        SqliteNewsRepository::new(conn),
        state.settings().news_per_page,
    )
}

fn comments_anchor(news_id: NewsId) -> String {
    format!("/news/{news_id}/#comments")
}

async fn home(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<PageQuery>,
) -> WebResult<Html<String>> {
    // Unparseable page numbers fall back to the first page.
    let page = query.page.as_deref().and_then(|raw| raw.parse().ok());
    let conn = state.db().await;
    let home = news_service(&conn, &state).home_page(page)?;

    let mut context = page_context(&state, user.as_ref());
    context.insert("object_list", &home.object_list);
    context.insert("page", &home.page);
    context.insert("has_next", &home.has_next);
    render(&state, "news/home.html", &context)
}

async fn detail(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(raw_id): Path<String>,
) -> WebResult<Html<String>> {
    let news_id = parse_id(&raw_id)?;
    let conn = state.db().await;
    let detail = news_service(&conn, &state).detail(news_id, user.as_ref().map(|u| u.id))?;
    render_detail(&state, user.as_ref(), &detail, &CommentForm::default(), &FormErrors::new())
}

async fn add_comment(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<CommentForm>,
) -> WebResult<Response> {
    let news_id = parse_id(&raw_id)?;
    let conn = state.db().await;
    let service = news_service(&conn, &state);

    match service.add_comment(news_id, user.id, &form) {
        Ok(_) => Ok(redirect_found(&comments_anchor(news_id))),
        Err(NewsServiceError::Invalid(errors)) => {
            let detail = service.detail(news_id, Some(user.id))?;
            Ok(render_detail(&state, Some(&user), &detail, &form, &errors)?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn edit_page(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Html<String>> {
    let comment_id = parse_id(&raw_id)?;
    let conn = state.db().await;
    let comment = news_service(&conn, &state).comment_for_author(comment_id, user.id)?;
    let form = CommentForm::new(comment.text.clone());
    render_edit(&state, &user, &comment, &form, &FormErrors::new())
}

async fn edit_comment(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<CommentForm>,
) -> WebResult<Response> {
    let comment_id = parse_id(&raw_id)?;
    let conn = state.db().await;
    let service = news_service(&conn, &state);

    match service.edit_comment(comment_id, user.id, &form) {
        Ok(comment) => Ok(redirect_found(&comments_anchor(comment.news_id))),
        Err(NewsServiceError::Invalid(errors)) => {
            let comment = service.comment_for_author(comment_id, user.id)?;
            Ok(render_edit(&state, &user, &comment, &form, &errors)?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn delete_page(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Html<String>> {
    let comment_id = parse_id(&raw_id)?;
    let conn = state.db().await;
    let comment = news_service(&conn, &state).comment_for_author(comment_id, user.id)?;

    let mut context = page_context(&state, Some(&user));
    context.insert("comment", &comment);
    render(&state, "news/delete.html", &context)
}

async fn delete_comment(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Response> {
    let comment_id = parse_id(&raw_id)?;
    let conn = state.db().await;
    let news_id = news_service(&conn, &state).delete_comment(comment_id, user.id)?;
    Ok(redirect_found(&comments_anchor(news_id)))
}

/// The comment form is only put in the context for authenticated viewers.
fn render_detail(
    state: &AppState,
    user: Option<&User>,
    detail: &NewsDetail,
    form: &CommentForm,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    let mut context = page_context(state, user);
    context.insert("news", &detail.news);
    context.insert("comments", &detail.comments);
    if detail.form_enabled {
        context.insert("form", form);
        context.insert("errors", errors);
    }
    render(state, "news/detail.html", &context)
}

fn render_edit(
    state: &AppState,
    user: &User,
    comment: &Comment,
    form: &CommentForm,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    let mut context = page_context(state, Some(user));
    context.insert("comment", comment);
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "news/edit.html", &context)
}
