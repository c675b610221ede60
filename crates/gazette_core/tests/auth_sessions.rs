use gazette_core::db::open_db_in_memory;
use gazette_core::form::auth_forms::{
    LoginForm, SignupForm, DUPLICATE_USERNAME_MESSAGE, INVALID_LOGIN_MESSAGE,
    PASSWORD_MISMATCH_MESSAGE,
};
use gazette_core::model::user::NewUser;
use gazette_core::repo::session_repo::SqliteSessionRepository;
use gazette_core::repo::user_repo::{SqliteUserRepository, UserRepository};
use gazette_core::service::auth_service::{AuthService, AuthServiceError};
use gazette_core::UserId;
use rusqlite::Connection;
use std::time::Duration;

type SqliteAuth<'conn> = AuthService<SqliteUserRepository<'conn>, SqliteSessionRepository<'conn>>;

fn service(conn: &Connection) -> SqliteAuth<'_> {
    AuthService::new(
        SqliteUserRepository::new(conn),
        SqliteSessionRepository::new(conn),
    )
}

fn create_user(conn: &Connection, username: &str) -> UserId {
    SqliteUserRepository::new(conn)
        .create_user(&NewUser {
            username: username.to_string(),
            password_hash: "!".to_string(),
        })
        .unwrap()
        .id
}

fn signup_form(username: &str, password1: &str, password2: &str) -> SignupForm {
    SignupForm {
        username: username.to_string(),
        password1: password1.to_string(),
        password2: password2.to_string(),
    }
}

#[test]
fn signup_then_login_resolves_session_user() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    let user = auth
        .signup(&signup_form("reader", "s3cret-pass", "s3cret-pass"))
        .unwrap();
    assert!(user.password_hash.starts_with("$argon2"));

    let grant = auth
        .login(&LoginForm {
            username: "reader".to_string(),
            password: "s3cret-pass".to_string(),
            next: None,
        })
        .unwrap();
    assert_eq!(grant.user.id, user.id);
    assert_eq!(grant.token.len(), 64);

    let current = auth.current_user(&grant.token).unwrap().unwrap();
    assert_eq!(current.username, "reader");
}

#[test]
fn signup_rejects_taken_username_and_mismatched_passwords() {
    let conn = open_db_in_memory().unwrap();
    create_user(&conn, "reader");
    let auth = service(&conn);

    match auth.signup(&signup_form("reader", "one", "two")) {
        Err(AuthServiceError::Invalid(errors)) => {
            assert_eq!(errors.field("username"), [DUPLICATE_USERNAME_MESSAGE.to_string()]);
            assert_eq!(errors.field("password2"), [PASSWORD_MISMATCH_MESSAGE.to_string()]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn wrong_password_and_unusable_hash_fail_login() {
    let conn = open_db_in_memory().unwrap();
    create_user(&conn, "nopass");
    let auth = service(&conn);

    for (username, password) in [("nopass", "!"), ("ghost", "whatever")] {
        match auth.login(&LoginForm {
            username: username.to_string(),
            password: password.to_string(),
            next: None,
        }) {
            Err(AuthServiceError::Invalid(errors)) => {
                assert_eq!(errors.non_field(), [INVALID_LOGIN_MESSAGE.to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}

#[test]
fn logout_revokes_the_session() {
    let conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "reader");
    let auth = service(&conn);
    let grant = auth.start_session(user_id).unwrap();

    assert!(auth.logout(&grant.token).unwrap());
    assert!(auth.current_user(&grant.token).unwrap().is_none());
    assert!(!auth.logout(&grant.token).unwrap());
}

#[test]
fn expired_and_unknown_tokens_are_anonymous() {
    let conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "reader");
    let auth = AuthService::with_session_ttl(
        SqliteUserRepository::new(&conn),
        SqliteSessionRepository::new(&conn),
        Duration::ZERO,
    );

    let grant = auth.start_session(user_id).unwrap();
    assert!(auth.current_user(&grant.token).unwrap().is_none());
    assert!(auth.current_user("not-a-token").unwrap().is_none());
    assert_eq!(auth.purge_expired_sessions().unwrap(), 1);
}

#[test]
fn starting_a_session_purges_expired_ones() {
    let conn = open_db_in_memory().unwrap();
    let user_id = create_user(&conn, "reader");
    let short_lived = AuthService::with_session_ttl(
        SqliteUserRepository::new(&conn),
        SqliteSessionRepository::new(&conn),
        Duration::ZERO,
    );
    short_lived.start_session(user_id).unwrap();
    short_lived.start_session(user_id).unwrap();

    let grant = service(&conn).start_session(user_id).unwrap();

    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM sessions;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 1);
    assert_eq!(
        service(&conn).current_user(&grant.token).unwrap().unwrap().id,
        user_id
    );
}

#[test]
fn session_for_missing_user_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    assert!(matches!(
        service(&conn).start_session(77),
        Err(AuthServiceError::UserNotFound(77))
    ));
}
