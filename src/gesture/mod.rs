//! Gesture vocabulary and the sequences built from it.
//!
//! * [`GestureVocabulary`] — the closed set of known gesture labels.
//! * [`GestureSequence`] — clip file names picked by the model, in order.

pub mod sequence;
pub mod vocabulary;

pub use sequence::GestureSequence;
pub use vocabulary::{
    clip_file_name, GestureVocabulary, VocabularyError, CLIP_EXTENSION, DEFAULT_GESTURES,
};
