//! Notes site. Everything except the home page requires login, and single
//! notes are resolved within the requester's own notes.

use super::redirect_found;
use crate::error::WebResult;
use crate::render::{page_context, render};
use crate::session::{CurrentUser, MaybeUser};
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Form, Router};
use gazette_core::form::note_form::NoteForm;
use gazette_core::repo::note_repo::SqliteNoteRepository;
use gazette_core::{FormErrors, Note, NoteService, NoteServiceError, User};
use rusqlite::Connection;

pub const SUCCESS_PATH: &str = "/done/";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/notes/", get(list))
        .route(SUCCESS_PATH, get(success))
        .route("/add/", get(add_page).post(add_note))
        .route("/note/:slug/", get(detail))
        .route("/edit/:slug/", get(edit_page).post(edit_note))
        .route("/delete/:slug/", get(delete_page).post(delete_note))
}

fn note_service(conn: &Connection) -> NoteService<SqliteNoteRepository<'_>> {
    NoteService::new(SqliteNoteRepository::new(conn))
}

async fn home(State(state): State<AppState>, MaybeUser(user): MaybeUser) -> WebResult<Html<String>> {
    render(&state, "notes/home.html", &page_context(&state, user.as_ref()))
}

async fn list(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> WebResult<Html<String>> {
    let conn = state.db().await;
    let notes = note_service(&conn).list_for_author(user.id)?;

    let mut context = page_context(&state, Some(&user));
    context.insert("object_list", &notes);
    render(&state, "notes/list.html", &context)
}

async fn success(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> WebResult<Html<String>> {
    render(&state, "notes/success.html", &page_context(&state, Some(&user)))
}

async fn add_page(State(state): State<AppState>, CurrentUser(user): CurrentUser) -> WebResult<Html<String>> {
    render_form(&state, &user, None, &NoteForm::default(), &FormErrors::new())
}

async fn add_note(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NoteForm>,
) -> WebResult<Response> {
    let conn = state.db().await;
    match note_service(&conn).create(user.id, &form) {
        Ok(_) => Ok(redirect_found(SUCCESS_PATH)),
        Err(NoteServiceError::Invalid(errors)) => {
            Ok(render_form(&state, &user, None, &form, &errors)?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Html<String>> {
    let conn = state.db().await;
    let note = note_service(&conn).get_for_author(&slug, user.id)?;

    let mut context = page_context(&state, Some(&user));
    context.insert("note", &note);
    render(&state, "notes/detail.html", &context)
}

async fn edit_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Html<String>> {
    let conn = state.db().await;
    let note = note_service(&conn).get_for_author(&slug, user.id)?;
    render_form(&state, &user, Some(&note), &NoteForm::from(&note), &FormErrors::new())
}

async fn edit_note(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<NoteForm>,
) -> WebResult<Response> {
    let conn = state.db().await;
    let service = note_service(&conn);
    match service.update(&slug, user.id, &form) {
        Ok(_) => Ok(redirect_found(SUCCESS_PATH)),
        Err(NoteServiceError::Invalid(errors)) => {
            let note = service.get_for_author(&slug, user.id)?;
            Ok(render_form(&state, &user, Some(&note), &form, &errors)?.into_response())
        }
        Err(err) => Err(err.into()),
    }
}

async fn delete_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Html<String>> {
    let conn = state.db().await;
    let note = note_service(&conn).get_for_author(&slug, user.id)?;

    let mut context = page_context(&state, Some(&user));
    context.insert("note", &note);
    render(&state, "notes/delete.html", &context)
}

async fn delete_note(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    CurrentUser(user): CurrentUser,
) -> WebResult<Response> {
    let conn = state.db().await;
    note_service(&conn).delete(&slug, user.id)?;
    Ok(redirect_found(SUCCESS_PATH))
}

/// Add and edit share one template; `note` is set when editing.
fn render_form(
    state: &AppState,
    user: &User,
    note: Option<&Note>,
    form: &NoteForm,
    errors: &FormErrors,
) -> WebResult<Html<String>> {
    let mut context = page_context(state, Some(user));
    context.insert("note", &note);
    context.insert("form", form);
    context.insert("errors", errors);
    render(state, "notes/form.html", &context)
}
