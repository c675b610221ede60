//! Note use-case service.
//!
//! # Invariants
//! - Lists contain only the requester's notes.
//! - Detail, edit and delete resolve the slug within the requester's notes;
//!   another user's note is reported as `NoteNotFound`.
//! - A note is only written after `NoteForm::clean` succeeds, including the
//!   slug uniqueness check.

use crate::form::note_form::{duplicate_slug_message, NoteForm};
use crate::form::FormErrors;
use crate::model::note::{Note, NoteDraft};
use crate::model::user::UserId;
use crate::repo::note_repo::NoteRepository;
use crate::repo::{RepoError, RepoResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum NoteServiceError {
    /// Slug is unknown, or belongs to another user.
    NoteNotFound(String),
    Invalid(FormErrors),
    Repo(RepoError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(slug) => write!(f, "note not found: {slug}"),
            Self::Invalid(_) => write!(f, "note form is invalid"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Duplicate { key, .. } => {
                let mut errors = FormErrors::new();
                errors.add("slug", duplicate_slug_message(&key));
                Self::Invalid(errors)
            }
            other => Self::Repo(other),
        }
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_for_author(&self, author_id: UserId) -> Result<Vec<Note>, NoteServiceError> {
        Ok(self.repo.list_notes_for_author(author_id)?)
    }

    pub fn get_for_author(&self, slug: &str, author_id: UserId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note_for_author(slug, author_id)?
            .ok_or_else(|| NoteServiceError::NoteNotFound(slug.to_string()))
    }

    pub fn create(&self, author_id: UserId, form: &NoteForm) -> Result<Note, NoteServiceError> {
        let draft = self.clean(form, None)?;
        let note = self.repo.create_note(author_id, &draft)?;
        info!(
            "event=note_create module=notes status=ok note_id={} author_id={}",
            note.id, author_id
        );
        Ok(note)
    }

    pub fn update(
        &self,
        slug: &str,
        author_id: UserId,
        form: &NoteForm,
    ) -> Result<Note, NoteServiceError> {
        let existing = self.get_for_author(slug, author_id)?;
        let draft = self.clean(form, Some(&existing))?;
        let note = self
            .repo
            .update_note(existing.id, author_id, &draft)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => NoteServiceError::NoteNotFound(slug.to_string()),
                other => other.into(),
            })?;
        info!(
            "event=note_update module=notes status=ok note_id={} author_id={}",
            note.id, author_id
        );
        Ok(note)
    }

    /// Deletes the note and returns its last state.
    pub fn delete(&self, slug: &str, author_id: UserId) -> Result<Note, NoteServiceError> {
        let existing = self.get_for_author(slug, author_id)?;
        self.repo
            .delete_note(existing.id, author_id)
            .map_err(|err| match err {
                RepoError::NotFound { .. } => NoteServiceError::NoteNotFound(slug.to_string()),
                other => other.into(),
            })?;
        info!(
            "event=note_delete module=notes status=ok note_id={} author_id={}",
            existing.id, author_id
        );
        Ok(existing)
    }

    pub fn count_notes(&self) -> RepoResult<u64> {
        self.repo.count_notes()
    }

    fn clean(&self, form: &NoteForm, editing: Option<&Note>) -> Result<NoteDraft, NoteServiceError> {
        let exclude = editing.map(|note| note.id);
        let cleaned = form.clean(|slug| self.repo.slug_taken(slug, exclude))?;
        cleaned.map_err(|errors| {
            info!(
                "event=note_validate module=notes status=rejected fields={}",
                errors_summary(&errors)
            );
            NoteServiceError::Invalid(errors)
        })
    }
}

fn errors_summary(errors: &FormErrors) -> String {
    ["title", "text", "slug"]
        .into_iter()
        .filter(|field| errors.has(field))
        .collect::<Vec<_>>()
        .join(",")
}
