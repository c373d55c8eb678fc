//! Clip resolution and video assembly.
//!
//! # Architecture
//!
//! ```text
//! GestureSequence
//!        │
//!        ▼
//! ClipResolver ── ClipLoader (trait) ──▶ FfmpegBackend::load   (ffprobe)
//!        │   (loaded, missing)
//!        ▼
//! VideoAssembler ── VideoEncoder (trait) ──▶ FfmpegBackend::encode (ffmpeg)
//!        │
//!        ▼
//! <outputs>/<file>.mp4
//! ```
//!
//! The traits are the seams tests use to run without ffmpeg installed.

pub mod assembler;
pub mod ffmpeg;
pub mod resolver;

#[cfg(test)]
pub(crate) mod testing;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

pub use assembler::{AssembleError, VideoAssembler};
pub use ffmpeg::FfmpegBackend;
pub use resolver::{ClipResolver, MissingReason, Resolution, ResolvedClip};

// ---------------------------------------------------------------------------
// Clip handles
// ---------------------------------------------------------------------------

/// Stream properties reported by a [`ClipLoader`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClipInfo {
    pub width: u32,
    pub height: u32,
    /// `None` when the container does not report a duration.
    pub duration_secs: Option<f64>,
    pub codec: Option<String>,
}

/// A clip that exists in the store and was successfully probed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipHandle {
    /// Name as it appeared in the gesture sequence.
    pub file_name: String,
    /// Absolute or store-relative path to the clip.
    pub path: PathBuf,
    pub info: ClipInfo,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A clip exists but could not be opened as video.
#[derive(Debug, Clone, Error)]
pub enum ClipError {
    #[error("cannot run probe: {0}")]
    Spawn(String),

    #[error("probe timed out after {0} s")]
    Timeout(u64),

    #[error("probe exited with {status}: {stderr}")]
    Probe { status: i32, stderr: String },

    #[error("probe output unreadable: {0}")]
    InvalidOutput(String),

    #[error("file has no video stream")]
    NoVideoStream,
}

/// Concatenation failed after clips were loaded.
#[derive(Debug, Clone, Error)]
pub enum EncodeError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("cannot run encoder: {0}")]
    Spawn(String),

    #[error("encoding timed out after {0} s")]
    Timeout(u64),

    #[error("encoder exited with {status}: {stderr}")]
    Failed { status: i32, stderr: String },
}

impl From<std::io::Error> for EncodeError {
    fn from(e: std::io::Error) -> Self {
        EncodeError::Io(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Opens a clip file and reports its stream properties.
#[async_trait]
pub trait ClipLoader: Send + Sync {
    async fn load(&self, path: &Path) -> Result<ClipInfo, ClipError>;
}

/// Concatenates clips, in order, into a single silent video at `output`.
///
/// `output` does not exist when this is called; implementations write it in
/// full or return an error.
#[async_trait]
pub trait VideoEncoder: Send + Sync {
    async fn encode(&self, clips: &[ClipHandle], output: &Path) -> Result<(), EncodeError>;
}
