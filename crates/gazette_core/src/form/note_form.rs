//! Note add/edit form with slug derivation and uniqueness.

use super::{check_max_chars, clean_required, FormErrors};
use crate::model::note::{
    is_valid_slug, slugify_title, Note, NoteDraft, NOTE_SLUG_MAX_CHARS, NOTE_TITLE_MAX_CHARS,
};
use crate::repo::RepoResult;
use serde::{Deserialize, Serialize};

/// Suffix appended to the colliding slug in the duplicate-slug error.
pub const WARNING: &str = " - такой slug уже существует, придумайте уникальное значение!";
pub const INVALID_SLUG_MESSAGE: &str =
    "Enter a valid “slug” consisting of letters, numbers, underscores or hyphens.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub slug: String,
}

impl NoteForm {
    pub fn new(
        title: impl Into<String>,
        text: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            slug: slug.into(),
        }
    }

    /// Cleans all fields and checks slug uniqueness.
    ///
    /// `slug_taken` is asked whether a slug is used by a note other than the
    /// one being edited. The outer `Result` carries storage failures, the
    /// inner one validation failures.
    pub fn clean(
        &self,
        slug_taken: impl FnOnce(&str) -> RepoResult<bool>,
    ) -> RepoResult<Result<NoteDraft, FormErrors>> {
        let mut errors = FormErrors::new();

        let title = clean_required("title", &self.title, &mut errors);
        let title = check_max_chars("title", title, NOTE_TITLE_MAX_CHARS, &mut errors);
        let text = clean_required("text", &self.text, &mut errors);
        let slug = self.clean_slug(title.as_deref(), &mut errors);

        if let Some(slug) = slug.as_deref() {
            if slug_taken(slug)? {
                errors.add("slug", duplicate_slug_message(slug));
            }
        }

        match (title, text, slug) {
            (Some(title), Some(text), Some(slug)) if errors.is_empty() => {
                Ok(Ok(NoteDraft { title, text, slug }))
            }
            _ => Ok(Err(errors)),
        }
    }

    /// Supplied slug, or one derived from a valid title when left blank.
    fn clean_slug(&self, title: Option<&str>, errors: &mut FormErrors) -> Option<String> {
        let supplied = self.slug.trim();
        let slug = if supplied.is_empty() {
            slugify_title(title?)
        } else {
            check_max_chars("slug", Some(supplied.to_string()), NOTE_SLUG_MAX_CHARS, errors)?
        };

        if !is_valid_slug(&slug) {
            errors.add("slug", INVALID_SLUG_MESSAGE);
            return None;
        }
        Some(slug)
    }
}

impl From<&Note> for NoteForm {
    fn from(note: &Note) -> Self {
        Self::new(note.title.clone(), note.text.clone(), note.slug.clone())
    }
}

/// Error text for a slug already used by another note.
pub fn duplicate_slug_message(slug: &str) -> String {
    format!("{slug}{WARNING}")
}
