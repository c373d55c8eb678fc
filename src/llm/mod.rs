//! Language-model side of the translator.
//!
//! This module provides:
//! * [`PromptBuilder`] — renders the closed-vocabulary translation prompt.
//! * [`TranslationClient`] — async trait implemented by model backends.
//! * [`ApiTranslator`] — OpenAI-compatible REST backend.
//! * [`SequenceParser`] — strict parse of the reply into a gesture sequence.
//! * [`parse_literal`] — the literal-only parser underneath it.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use sign_translator::config::AppConfig;
//! use sign_translator::gesture::GestureVocabulary;
//! use sign_translator::llm::{ApiTranslator, PromptBuilder, SequenceParser, TranslationClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let builder = PromptBuilder::new(GestureVocabulary::builtin());
//!     let client = ApiTranslator::from_config(&config.llm);
//!
//!     let reply = client.translate(&builder.build("привет как ты")).await.unwrap();
//!     let sequence = SequenceParser::parse(&reply);
//!     println!("{:?}", sequence);
//! }
//! ```

pub mod client;
pub mod literal;
pub mod prompt;
pub mod sequence_parser;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use client::{ApiTranslator, TranslateError, TranslationClient};
pub use literal::{parse_literal, Literal, LiteralError};
pub use prompt::{PromptBuilder, SYSTEM_INSTRUCTION};
pub use sequence_parser::{ReplyError, SequenceParser};
