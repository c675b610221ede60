//! Note repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Every author-facing lookup filters by `author_id`.
//! - Note lists are sorted by `id ASC`.
//! - `slug` uniqueness is global; the schema's unique index is the last line
//!   of defense behind `slug_taken`.

use crate::model::note::{Note, NoteDraft, NoteId};
use crate::model::user::UserId;
use crate::repo::news_repo::count_rows;
use crate::repo::{map_unique_violation, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

const NOTE_SELECT_SQL: &str = "SELECT id, title, text, slug, author_id FROM notes";

/// Repository interface for notes.
pub trait NoteRepository {
    fn create_note(&self, author_id: UserId, draft: &NoteDraft) -> RepoResult<Note>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Looks up a note by slug only if `author_id` owns it.
    fn get_note_for_author(&self, slug: &str, author_id: UserId) -> RepoResult<Option<Note>>;
    fn list_notes_for_author(&self, author_id: UserId) -> RepoResult<Vec<Note>>;
    /// Returns whether another note (other than `exclude`) already uses `slug`.
    fn slug_taken(&self, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool>;
    fn update_note(&self, id: NoteId, author_id: UserId, draft: &NoteDraft) -> RepoResult<Note>;
    fn delete_note(&self, id: NoteId, author_id: UserId) -> RepoResult<()>;
    fn count_notes(&self) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, author_id: UserId, draft: &NoteDraft) -> RepoResult<Note> {
        draft.validate()?;

        self.conn
            .execute(
                "INSERT INTO notes (title, text, slug, author_id) VALUES (?1, ?2, ?3, ?4);",
                params![
                    draft.title.as_str(),
                    draft.text.as_str(),
                    draft.slug.as_str(),
                    author_id,
                ],
            )
            .map_err(|err| map_unique_violation(err, "note", &draft.slug))?;

        let id = self.conn.last_insert_rowid();
        self.get_note(id)?
            .ok_or_else(|| RepoError::not_found("note", id))
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    fn get_note_for_author(&self, slug: &str, author_id: UserId) -> RepoResult<Option<Note>> {
        let note = self
            .conn
            .query_row(
                &format!("{NOTE_SELECT_SQL} WHERE slug = ?1 AND author_id = ?2;"),
                params![slug, author_id],
                parse_note_row,
            )
            .optional()?;
        Ok(note)
    }

    fn list_notes_for_author(&self, author_id: UserId) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "{NOTE_SELECT_SQL} WHERE author_id = ?1 ORDER BY id ASC;"
        ))?;
        let rows = stmt.query_map([author_id], parse_note_row)?;

        let mut notes = Vec::new();
        for row in rows {
            notes.push(row?);
        }
        Ok(notes)
    }

    fn slug_taken(&self, slug: &str, exclude: Option<NoteId>) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM notes
                WHERE slug = ?1
                  AND (?2 IS NULL OR id <> ?2)
            );",
            params![slug, exclude],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn update_note(&self, id: NoteId, author_id: UserId, draft: &NoteDraft) -> RepoResult<Note> {
        draft.validate()?;

        let changed = self
            .conn
            .execute(
                "UPDATE notes
                 SET title = ?3, text = ?4, slug = ?5
                 WHERE id = ?1 AND author_id = ?2;",
                params![
                    id,
                    author_id,
                    draft.title.as_str(),
                    draft.text.as_str(),
                    draft.slug.as_str(),
                ],
            )
            .map_err(|err| map_unique_violation(err, "note", &draft.slug))?;

        if changed == 0 {
            return Err(RepoError::not_found("note", id));
        }

        self.get_note(id)?
            .ok_or_else(|| RepoError::not_found("note", id))
    }

    fn delete_note(&self, id: NoteId, author_id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM notes WHERE id = ?1 AND author_id = ?2;",
            params![id, author_id],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("note", id));
        }
        Ok(())
    }

    fn count_notes(&self) -> RepoResult<u64> {
        count_rows(self.conn, "notes")
    }
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: row.get("id")?,
        title: row.get("title")?,
        text: row.get("text")?,
        slug: row.get("slug")?,
        author_id: row.get("author_id")?,
    })
}
