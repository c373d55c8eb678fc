//! Translation pipeline: one phrase in, one video reference (or failure) out.
//!
//! # Architecture
//!
//! ```text
//! phrase
//!   │
//!   ▼
//! PromptBuilder ──▶ TranslationClient ──▶ SequenceParser
//!                                              │
//!                                              ▼
//!                   VideoAssembler ◀── ClipResolver
//!                         │
//!                         ▼
//!                 TranslationResult
//! ```
//!
//! Runs share nothing mutable; callers spawn one tokio task per request.

pub mod result;
pub mod runner;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use result::{TranslationResult, FAILURE_MESSAGE};
pub use runner::{output_file_name, PipelineError, TranslationPipeline};
