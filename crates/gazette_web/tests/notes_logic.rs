mod support;

use axum::http::StatusCode;
use gazette_core::form::note_form::{duplicate_slug_message, NoteForm};
use gazette_core::repo::note_repo::SqliteNoteRepository;
use gazette_core::{Note, NoteService};
use gazette_web::{AppKind, AppState};
use support::{
    assert_redirect, body_text, count, create_user, login_cookie, login_redirect, post_form, send,
    state_with,
};

const NEW_TITLE: &str = "Новый заголовок";
const NEW_TEXT: &str = "Новый текст";

struct Seed {
    note: Note,
    author_cookie: String,
    reader_cookie: String,
}

fn seeded() -> (AppState, Seed) {
    state_with(AppKind::Notes, |conn| {
        let author = create_user(conn, "author");
        let reader = create_user(conn, "reader");
        let note = NoteService::new(SqliteNoteRepository::new(conn))
            .create(author, &NoteForm::new("Заголовок", "Текст", "note-slug"))
            .unwrap();
        Seed {
            note,
            author_cookie: login_cookie(conn, author),
            reader_cookie: login_cookie(conn, reader),
        }
    })
}

async fn stored_note(state: &AppState, id: i64) -> (String, String, String) {
    let conn = state.db().await;
    conn.query_row(
        "SELECT title, text, slug FROM notes WHERE id = ?1;",
        [id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
    .unwrap()
}

#[tokio::test]
async fn user_can_create_note() {
    let (state, seed) = seeded();

    let response = send(
        &state,
        post_form(
            "/add/",
            Some(&seed.reader_cookie),
            &[("title", NEW_TITLE), ("text", NEW_TEXT), ("slug", "new-slug")],
        ),
    )
    .await;

    assert_redirect(&response, "/done/");
    assert_eq!(count(&state, "notes").await, 2);
    let conn = state.db().await;
    let (title, slug): (String, String) = conn
        .query_row(
            "SELECT n.title, n.slug FROM notes n JOIN users u ON u.id = n.author_id
             WHERE u.username = 'reader';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(title, NEW_TITLE);
    assert_eq!(slug, "new-slug");
}

#[tokio::test]
async fn anonymous_user_cannot_create_note() {
    let (state, _) = seeded();

    let response = send(
        &state,
        post_form("/add/", None, &[("title", NEW_TITLE), ("text", NEW_TEXT)]),
    )
    .await;

    assert_redirect(&response, &login_redirect("/add/"));
    assert_eq!(count(&state, "notes").await, 1);
}

#[tokio::test]
async fn duplicate_slug_is_rejected() {
    let (state, seed) = seeded();

    let response = send(
        &state,
        post_form(
            "/add/",
            Some(&seed.author_cookie),
            &[("title", NEW_TITLE), ("text", NEW_TEXT), ("slug", &seed.note.slug)],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains(&duplicate_slug_message(&seed.note.slug)));
    assert_eq!(count(&state, "notes").await, 1);
}

#[tokio::test]
async fn empty_slug_is_generated_from_title() {
    let (state, seed) = seeded();

    let response = send(
        &state,
        post_form(
            "/add/",
            Some(&seed.author_cookie),
            &[("title", NEW_TITLE), ("text", NEW_TEXT), ("slug", "")],
        ),
    )
    .await;

    assert_redirect(&response, "/done/");
    assert_eq!(count(&state, "notes").await, 2);
    let conn = state.db().await;
    let slug: String = conn
        .query_row("SELECT slug FROM notes ORDER BY id DESC LIMIT 1;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(slug, "novyij-zagolovok");
}

#[tokio::test]
async fn author_can_edit_note() {
    let (state, seed) = seeded();
    let uri = format!("/edit/{}/", seed.note.slug);

    let response = send(
        &state,
        post_form(
            &uri,
            Some(&seed.author_cookie),
            &[("title", NEW_TITLE), ("text", NEW_TEXT), ("slug", "new-slug")],
        ),
    )
    .await;

    assert_redirect(&response, "/done/");
    assert_eq!(
        stored_note(&state, seed.note.id).await,
        (NEW_TITLE.to_string(), NEW_TEXT.to_string(), "new-slug".to_string())
    );
}

#[tokio::test]
async fn user_cannot_edit_foreign_note() {
    let (state, seed) = seeded();
    let uri = format!("/edit/{}/", seed.note.slug);

    let response = send(
        &state,
        post_form(
            &uri,
            Some(&seed.reader_cookie),
            &[("title", NEW_TITLE), ("text", NEW_TEXT), ("slug", "new-slug")],
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        stored_note(&state, seed.note.id).await,
        (seed.note.title.clone(), seed.note.text.clone(), seed.note.slug.clone())
    );
}

#[tokio::test]
async fn author_can_delete_note() {
    let (state, seed) = seeded();
    let uri = format!("/delete/{}/", seed.note.slug);

    let response = send(&state, post_form(&uri, Some(&seed.author_cookie), &[])).await;

    assert_redirect(&response, "/done/");
    assert_eq!(count(&state, "notes").await, 0);
}

#[tokio::test]
async fn user_cannot_delete_foreign_note() {
    let (state, seed) = seeded();
    let uri = format!("/delete/{}/", seed.note.slug);

    let response = send(&state, post_form(&uri, Some(&seed.reader_cookie), &[])).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(count(&state, "notes").await, 1);
}
