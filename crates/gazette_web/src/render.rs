//! Embedded `tera` templates.

use crate::error::WebResult;
use crate::state::AppState;
use axum::response::Html;
use gazette_core::User;
use tera::{Context, Tera};

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("form_errors.html", include_str!("../templates/form_errors.html")),
    ("news/home.html", include_str!("../templates/news/home.html")),
    ("news/detail.html", include_str!("../templates/news/detail.html")),
    ("news/edit.html", include_str!("../templates/news/edit.html")),
    ("news/delete.html", include_str!("../templates/news/delete.html")),
    ("notes/home.html", include_str!("../templates/notes/home.html")),
    ("notes/list.html", include_str!("../templates/notes/list.html")),
    ("notes/detail.html", include_str!("../templates/notes/detail.html")),
    ("notes/form.html", include_str!("../templates/notes/form.html")),
    ("notes/delete.html", include_str!("../templates/notes/delete.html")),
    ("notes/success.html", include_str!("../templates/notes/success.html")),
    ("users/login.html", include_str!("../templates/users/login.html")),
    ("users/logout.html", include_str!("../templates/users/logout.html")),
    ("users/signup.html", include_str!("../templates/users/signup.html")),
];

pub fn load_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_templates(TEMPLATES.iter().copied())?;
    Ok(tera)
}

/// Context shared by every page: the app flavour and the requester.
pub fn page_context(state: &AppState, user: Option<&User>) -> Context {
    let mut context = Context::new();
    context.insert("app", state.kind().as_str());
    context.insert("user", &user);
    context
}

pub fn render(state: &AppState, template: &str, context: &Context) -> WebResult<Html<String>> {
    Ok(Html(state.templates().render(template, context)?))
}
