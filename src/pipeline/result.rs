//! Outcome of one pipeline run.

use std::path::PathBuf;

use serde::Serialize;

/// User-facing reason for every failed run.
pub const FAILURE_MESSAGE: &str = "Не удалось создать видео.";

/// Either a reference to a freshly written video or a generic failure.
///
/// Serialises as `{"status": "success", "output_reference": …}` or
/// `{"status": "failure", "reason": …}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TranslationResult {
    Success {
        /// Public reference, e.g. `/media/outputs/user_7_1a2b3c4d.mp4`.
        output_reference: String,
        /// Where the file was written on disk.
        #[serde(skip)]
        output_path: PathBuf,
    },
    Failure { reason: String },
}

impl TranslationResult {
    pub fn failure() -> Self {
        TranslationResult::Failure {
            reason: FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TranslationResult::Success { .. })
    }

    /// The public reference, when the run succeeded.
    pub fn output_reference(&self) -> Option<&str> {
        match self {
            TranslationResult::Success {
                output_reference, ..
            } => Some(output_reference),
            TranslationResult::Failure { .. } => None,
        }
    }
}
