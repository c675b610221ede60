//! Personal note model.
//!
//! # Invariants
//! - `slug` is globally unique, 1..=100 characters of `[-a-zA-Z0-9_]`.
//! - `title` is 1..=100 characters; `text` is non-empty.
//! - Only `author_id` may read the detail page, edit or delete the note.

use super::user::UserId;
use super::{require_max_chars, require_text, ModelValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub type NoteId = i64;

pub const NOTE_TITLE_MAX_CHARS: usize = 100;
pub const NOTE_SLUG_MAX_CHARS: usize = 100;

static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-a-zA-Z0-9_]+$").expect("valid slug regex"));
static AMPERSAND_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"&amp;|&").expect("valid ampersand regex"));
static SEPARATOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[-\s]+").expect("valid separator regex"));

/// Lowercase Cyrillic letters and typographic dashes for derived slugs. Hard
/// and soft signs map to nothing.
const TRANSLIT: &[(char, &str)] = &[
    ('а', "a"),
    ('б', "b"),
    ('в', "v"),
    ('г', "g"),
    ('д', "d"),
    ('е', "e"),
    ('ё', "yo"),
    ('ж', "zh"),
    ('з', "z"),
    ('и', "i"),
    ('й', "j"),
    ('к', "k"),
    ('л', "l"),
    ('м', "m"),
    ('н', "n"),
    ('о', "o"),
    ('п', "p"),
    ('р', "r"),
    ('с', "s"),
    ('т', "t"),
    ('у', "u"),
    ('ф', "f"),
    ('х', "h"),
    ('ц', "ts"),
    ('ч', "ch"),
    ('ш', "sh"),
    ('щ', "sch"),
    ('ъ', ""),
    ('ы', "yi"),
    ('ь', ""),
    ('э', "e"),
    ('ю', "yu"),
    ('я', "ya"),
    ('є', "ye"),
    ('і', "i"),
    ('ї', "yi"),
    ('ґ', "g"),
    ('–', "-"),
    ('—', "-"),
    ('‒', "-"),
    ('−', "-"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    pub slug: String,
    pub author_id: UserId,
}

/// Fully cleaned note fields ready for insert or update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: String,
}

impl NoteDraft {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        require_text("title", &self.title)?;
        require_max_chars("title", &self.title, NOTE_TITLE_MAX_CHARS)?;
        require_text("text", &self.text)?;
        require_max_chars("slug", &self.slug, NOTE_SLUG_MAX_CHARS)?;
        if !is_valid_slug(&self.slug) {
            return Err(ModelValidationError::InvalidSlug(self.slug.clone()));
        }
        Ok(())
    }
}

/// Returns whether `value` is a non-empty URL-safe slug.
pub fn is_valid_slug(value: &str) -> bool {
    SLUG_RE.is_match(value)
}

/// Derives a slug from a title, truncated to the slug column budget.
///
/// The title is lowercased, `&` becomes `and`, runs of whitespace and hyphens
/// collapse to one hyphen, Cyrillic letters are transliterated through
/// `TRANSLIT`, and any other character is dropped.
pub fn slugify_title(title: &str) -> String {
    let lowered = title.to_lowercase();
    let spelled = AMPERSAND_RE.replace_all(&lowered, " and ");
    let hyphenated = SEPARATOR_RE.replace_all(&spelled, "-");

    let mut slug = String::with_capacity(hyphenated.len());
    for ch in hyphenated.chars() {
        if ch.is_ascii_alphanumeric() || ch == '-' {
            slug.push(ch);
        } else if let Some((_, latin)) = TRANSLIT.iter().find(|(letter, _)| *letter == ch) {
            slug.push_str(latin);
        }
    }
    slug.chars().take(NOTE_SLUG_MAX_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::{is_valid_slug, slugify_title, NoteDraft};

    #[test]
    fn slugify_transliterates_cyrillic_title() {
        let slug = slugify_title("Новый заголовок");
        assert_eq!(slug, "novyij-zagolovok");
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn slugify_uses_multi_letter_and_silent_mappings() {
        assert_eq!(slugify_title("Щука ёж"), "schuka-yozh");
        assert_eq!(slugify_title("Объявление"), "obyavlenie");
        assert_eq!(slugify_title("Съешь ещё"), "sesh-eschyo");
        assert_eq!(slugify_title("Чай & Кофе"), "chaj-and-kofe");
    }

    #[test]
    fn slugify_drops_punctuation_and_keeps_ascii() {
        assert_eq!(slugify_title("Rust 2024: итоги!"), "rust-2024-itogi");
        assert_eq!(slugify_title("!!!"), "");
    }

    #[test]
    fn slugify_truncates_to_column_budget() {
        let slug = slugify_title(&"word ".repeat(60));
        assert_eq!(slug.chars().count(), 100);
    }

    #[test]
    fn draft_rejects_slug_with_spaces() {
        let draft = NoteDraft {
            title: "t".to_string(),
            text: "x".to_string(),
            slug: "has space".to_string(),
        };
        assert!(draft.validate().is_err());
    }
}
