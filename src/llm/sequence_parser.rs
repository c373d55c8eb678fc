//! Turns a raw model reply into a [`GestureSequence`].
//!
//! Only the first line of the (trimmed) reply is considered, and it must be a
//! list literal whose every element is a string.  Anything else yields an
//! empty sequence.  A list spread over several lines is therefore rejected;
//! replies are expected on one line as the prompt's example shows.
//!
//! No vocabulary filtering happens here: unknown names, duplicates and names
//! without the `.mp4` suffix are passed through for the resolver to judge.

use thiserror::Error;

use crate::gesture::GestureSequence;
use crate::llm::literal::{parse_literal, Literal, LiteralError};

/// Why a reply did not produce a sequence.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReplyError {
    #[error("reply is not a literal: {0}")]
    Literal(#[from] LiteralError),

    #[error("reply is a {0}, not a list")]
    NotAList(&'static str),

    #[error("list element {index} is a {kind}, not a string")]
    NonStringElement { index: usize, kind: &'static str },
}

/// Stateless parser for model replies.
pub struct SequenceParser;

impl SequenceParser {
    /// Parse `raw`, returning an empty sequence on any malformed input.
    ///
    /// ```rust
    /// use sign_translator::llm::SequenceParser;
    ///
    /// let seq = SequenceParser::parse("['привет.mp4', 'ты.mp4']\nГотово!");
    /// assert_eq!(seq.as_slice(), &["привет.mp4", "ты.mp4"]);
    /// assert!(SequenceParser::parse("Извините, не могу").is_empty());
    /// ```
    pub fn parse(raw: &str) -> GestureSequence {
        match Self::try_parse(raw) {
            Ok(seq) => seq,
            Err(e) => {
                log::warn!("parser: cannot use model reply ({e}), treating as empty");
                GestureSequence::empty()
            }
        }
    }

    /// Like [`parse`](Self::parse) but reports why a reply was rejected.
    pub fn try_parse(raw: &str) -> Result<GestureSequence, ReplyError> {
        let line = first_line(raw);
        match parse_literal(line)? {
            Literal::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| match item {
                    Literal::Str(s) => Ok(s),
                    other => Err(ReplyError::NonStringElement {
                        index,
                        kind: other.kind(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(GestureSequence::new),
            other => Err(ReplyError::NotAList(other.kind())),
        }
    }
}

/// First line of the trimmed reply.
fn first_line(raw: &str) -> &str {
    raw.trim().split('\n').next().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
