//! Russian phrase → sign-language video translator.
//!
//! A language model maps a phrase onto an ordered list of pre-recorded
//! gesture clips from a closed vocabulary; the clips are then concatenated
//! into one video.
//!
//! * [`gesture`] — vocabulary and sequences.
//! * [`llm`] — prompt, model client, strict reply parsing.
//! * [`video`] — clip resolution and assembly (ffmpeg).
//! * [`pipeline`] — the end-to-end orchestrator.
//! * [`chat`] — request handling and chat history around the pipeline.
//! * [`config`] — TOML settings.

pub mod chat;
pub mod config;
pub mod gesture;
pub mod llm;
pub mod pipeline;
pub mod video;
