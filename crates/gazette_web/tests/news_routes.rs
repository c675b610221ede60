mod support;

use axum::http::StatusCode;
use gazette_core::form::comment_form::CommentForm;
use gazette_core::repo::news_repo::SqliteNewsRepository;
use gazette_core::NewsService;
use gazette_web::AppKind;
use support::{assert_redirect, create_news, create_user, get, login_cookie, login_redirect, send, state_with};

struct Seed {
    news_id: i64,
    comment_id: i64,
    author_cookie: String,
    reader_cookie: String,
}

fn seeded() -> (gazette_web::AppState, Seed) {
    state_with(AppKind::News, |conn| {
        let news_id = create_news(conn, "Заголовок");
        let author = create_user(conn, "Автор");
        let reader = create_user(conn, "Читатель");
        let comment_id = NewsService::new(SqliteNewsRepository::new(conn))
            .add_comment(news_id, author, &CommentForm::new("Текст комментария"))
            .unwrap()
            .id;
        Seed {
            news_id,
            comment_id,
            author_cookie: login_cookie(conn, author),
            reader_cookie: login_cookie(conn, reader),
        }
    })
}

#[tokio::test]
async fn public_pages_are_available_to_anonymous_users() {
    let (state, seed) = seeded();
    let detail = format!("/news/{}/", seed.news_id);

    for uri in ["/", detail.as_str(), "/auth/login/", "/auth/logout/", "/auth/signup/"] {
        let response = send(&state, get(uri, None)).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }
}

#[tokio::test]
async fn comment_pages_are_available_only_to_the_author() {
    let (state, seed) = seeded();

    for uri in [
        format!("/edit_comment/{}/", seed.comment_id),
        format!("/delete_comment/{}/", seed.comment_id),
    ] {
        let response = send(&state, get(&uri, Some(&seed.author_cookie))).await;
        assert_eq!(response.status(), StatusCode::OK, "author GET {uri}");

        let response = send(&state, get(&uri, Some(&seed.reader_cookie))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "reader GET {uri}");
    }
}

#[tokio::test]
async fn anonymous_users_are_redirected_to_login() {
    let (state, seed) = seeded();

    for uri in [
        format!("/edit_comment/{}/", seed.comment_id),
        format!("/delete_comment/{}/", seed.comment_id),
    ] {
        let response = send(&state, get(&uri, None)).await;
        assert_redirect(&response, &login_redirect(&uri));
    }
}

#[tokio::test]
async fn unknown_or_malformed_ids_are_not_found() {
    let (state, seed) = seeded();

    for uri in ["/news/9999/", "/news/abc/", "/edit_comment/9999/", "/no/such/page/"] {
        let response = send(&state, get(uri, Some(&seed.author_cookie))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");
    }
}

#[tokio::test]
async fn expired_or_forged_session_is_anonymous() {
    let (state, seed) = seeded();
    let uri = format!("/edit_comment/{}/", seed.comment_id);

    let response = send(&state, get(&uri, Some("sessionid=forged"))).await;
    assert_redirect(&response, &login_redirect(&uri));
}
