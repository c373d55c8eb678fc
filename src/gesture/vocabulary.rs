//! The closed gesture vocabulary.
//!
//! [`GestureVocabulary`] is built once at startup (from `settings.toml` or
//! [`DEFAULT_GESTURES`]) and shared read-only by every request.  Each label
//! corresponds to exactly one clip named `<label>.mp4` in the clip store.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

/// File extension of every gesture clip.
pub const CLIP_EXTENSION: &str = "mp4";

/// Labels of the reference clip store, in prompt order.
pub const DEFAULT_GESTURES: &[&str] = &[
    "понять",
    "вы откуда",
    "очень",
    "кто",
    "хорошо",
    "когда",
    "где",
    "делать",
    "потому что",
    "ты",
    "как",
    "привет",
    "я",
    "мы",
    "он",
    "она",
    "идти",
    "любить",
    "что",
    "нет",
    "и",
    "но",
    "работа",
    "дом",
    "сейчас",
    "здесь",
    "там",
    "сегодня",
    "завтра",
    "почему",
];

// ---------------------------------------------------------------------------
// VocabularyError
// ---------------------------------------------------------------------------

/// Reasons a label list cannot become a vocabulary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VocabularyError {
    #[error("gesture vocabulary is empty")]
    Empty,

    #[error("gesture label at position {0} is blank")]
    BlankLabel(usize),

    #[error("gesture label {0:?} contains a path separator")]
    InvalidLabel(String),

    #[error("gesture label {0:?} is listed more than once")]
    Duplicate(String),
}

// ---------------------------------------------------------------------------
// GestureVocabulary
// ---------------------------------------------------------------------------

/// Ordered set of distinct, lowercase gesture labels.
///
/// Cheap to clone; the labels live behind an `Arc`.
///
/// ```rust
/// use sign_translator::gesture::GestureVocabulary;
///
/// let vocab = GestureVocabulary::new(["Привет", "ты"]).unwrap();
/// assert_eq!(vocab.labels(), &["привет".to_string(), "ты".to_string()]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GestureVocabulary {
    labels: Arc<[String]>,
}

impl GestureVocabulary {
    /// Build a vocabulary, normalising labels to trimmed lowercase.
    ///
    /// # Errors
    ///
    /// Rejects an empty list, blank labels, labels containing `/` or `\`,
    /// and labels that collide after normalisation.
    pub fn new<I, S>(labels: I) -> Result<Self, VocabularyError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut out = Vec::new();

        for (idx, raw) in labels.into_iter().enumerate() {
            let label = raw.as_ref().trim().to_lowercase();
            if label.is_empty() {
                return Err(VocabularyError::BlankLabel(idx));
            }
            if label.contains('/') || label.contains('\\') {
                return Err(VocabularyError::InvalidLabel(label));
            }
            if !seen.insert(label.clone()) {
                return Err(VocabularyError::Duplicate(label));
            }
            out.push(label);
        }

        if out.is_empty() {
            return Err(VocabularyError::Empty);
        }

        Ok(Self { labels: out.into() })
    }

    /// The built-in reference vocabulary.
    pub fn builtin() -> Self {
        Self {
            labels: DEFAULT_GESTURES.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Clip file names (`<label>.mp4`) in vocabulary order.
    pub fn file_names(&self) -> impl Iterator<Item = String> + '_ {
        self.labels.iter().map(|l| clip_file_name(l))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for GestureVocabulary {
    fn default() -> Self {
        Self::builtin()
    }
}

/// `<label>.mp4`
pub fn clip_file_name(label: &str) -> String {
    format!("{label}.{CLIP_EXTENSION}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_matches_default_list() {
        let vocab = GestureVocabulary::builtin();
        assert_eq!(vocab.len(), 30);
        assert_eq!(vocab.labels()[0], "понять");
        assert!(vocab.labels().iter().any(|l| l == "потому что"));
    }

    #[test]
    fn builtin_passes_validation() {
        let validated = GestureVocabulary::new(DEFAULT_GESTURES).unwrap();
        assert_eq!(validated, GestureVocabulary::builtin());
    }

    #[test]
    fn labels_are_normalised() {
        let vocab = GestureVocabulary::new(["  Дом ", "РАБОТА"]).unwrap();
        assert_eq!(vocab.labels(), &["дом".to_string(), "работа".to_string()]);
    }

    #[test]
    fn order_is_preserved() {
        let vocab = GestureVocabulary::new(["я", "ты", "мы"]).unwrap();
        let files: Vec<String> = vocab.file_names().collect();
        assert_eq!(files, vec!["я.mp4", "ты.mp4", "мы.mp4"]);
    }

    #[test]
    fn duplicates_rejected_after_normalisation() {
        let err = GestureVocabulary::new(["дом", "Дом"]).unwrap_err();
        assert_eq!(err, VocabularyError::Duplicate("дом".into()));
    }

    #[test]
    fn blank_and_empty_rejected() {
        assert_eq!(
            GestureVocabulary::new(["я", "  "]).unwrap_err(),
            VocabularyError::BlankLabel(1)
        );
        assert_eq!(
            GestureVocabulary::new(Vec::<String>::new()).unwrap_err(),
            VocabularyError::Empty
        );
    }

    #[test]
    fn path_separators_rejected() {
        assert!(matches!(
            GestureVocabulary::new(["../etc"]),
            Err(VocabularyError::InvalidLabel(_))
        ));
    }
}
