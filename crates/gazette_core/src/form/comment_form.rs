//! Comment submission form with the bad-word filter.

use super::{clean_required, FormErrors};
use serde::{Deserialize, Serialize};

/// Words that may not appear anywhere in a comment, matched case-insensitively.
pub const BAD_WORDS: [&str; 2] = ["редиска", "негодяй"];
/// Message attached to `text` when a banned word is found.
pub const WARNING: &str = "Не ругайтесь!";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentForm {
    #[serde(default)]
    pub text: String,
}

impl CommentForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Returns the cleaned comment text.
    pub fn clean(&self) -> Result<String, FormErrors> {
        let mut errors = FormErrors::new();
        let Some(text) = clean_required("text", &self.text, &mut errors) else {
            return Err(errors);
        };

        if contains_bad_word(&text) {
            errors.add("text", WARNING);
            return Err(errors);
        }

        Ok(text)
    }
}

/// Substring check of the lowercased text against `BAD_WORDS`.
pub fn contains_bad_word(text: &str) -> bool {
    let lowered = text.to_lowercase();
    BAD_WORDS.iter().any(|word| lowered.contains(word))
}

#[cfg(test)]
mod tests {
    use super::{contains_bad_word, CommentForm, BAD_WORDS, WARNING};

    #[test]
    fn bad_word_inside_sentence_is_rejected() {
        let form = CommentForm::new(format!("Какой-то текст, {}, еще текст", BAD_WORDS[0]));
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.field("text"), [WARNING.to_string()]);
    }

    #[test]
    fn bad_word_match_ignores_case() {
        assert!(contains_bad_word("Ты НЕГОДЯЙ"));
        assert!(!contains_bad_word("Хороший текст"));
    }

    #[test]
    fn clean_text_is_trimmed() {
        let cleaned = CommentForm::new("  Новый текст \n").clean().unwrap();
        assert_eq!(cleaned, "Новый текст");
    }
}
