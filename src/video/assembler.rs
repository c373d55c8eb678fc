//! Concatenates loaded clips into one output file.
//!
//! The encoder writes to a hidden `.part` sibling of the requested output;
//! only a successful encode is renamed into place.  A failed encode leaves
//! nothing at the output path and the partial file is removed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::{ClipHandle, EncodeError, VideoEncoder};

/// Fatal assembly outcomes.
#[derive(Debug, Error)]
pub enum AssembleError {
    /// Nothing resolved; no file was written.
    #[error("no clips to assemble")]
    NoClips,

    /// The output path is already taken.
    #[error("output already exists: {0}")]
    OutputExists(PathBuf),

    #[error("encoding failed: {0}")]
    Encode(#[from] EncodeError),
}

/// Writes concatenated videos through a [`VideoEncoder`].
pub struct VideoAssembler {
    encoder: Arc<dyn VideoEncoder>,
}

impl VideoAssembler {
    pub fn new(encoder: Arc<dyn VideoEncoder>) -> Self {
        Self { encoder }
    }

    /// Concatenate `clips` in order into `output`.
    ///
    /// Parent directories are created as needed.  On success the returned
    /// path equals `output`.  The clips are consumed and released on every
    /// path.
    ///
    /// # Errors
    ///
    /// * [`AssembleError::NoClips`] — `clips` is empty; nothing touched.
    /// * [`AssembleError::OutputExists`] — refuses to overwrite.
    /// * [`AssembleError::Encode`] — directory creation, encode or rename
    ///   failed; no file is left at `output`.
    pub async fn assemble(
        &self,
        clips: Vec<ClipHandle>,
        output: &Path,
    ) -> Result<PathBuf, AssembleError> {
        if clips.is_empty() {
            return Err(AssembleError::NoClips);
        }
        if tokio::fs::try_exists(output).await.unwrap_or(false) {
            return Err(AssembleError::OutputExists(output.to_path_buf()));
        }

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(EncodeError::from)?;
        }

        let partial = partial_path(output);
        log::debug!(
            "assembler: encoding {} clips into {}",
            clips.len(),
            partial.display()
        );

        let encoded = self.encoder.encode(&clips, &partial).await;
        drop(clips);

        let result = match encoded {
            Ok(()) => tokio::fs::rename(&partial, output)
                .await
                .map_err(EncodeError::from),
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            remove_if_present(&partial).await;
            log::error!("assembler: {} failed: {e}", output.display());
            return Err(AssembleError::Encode(e));
        }

        log::info!("assembler: video saved to {}", output.display());
        Ok(output.to_path_buf())
    }
}

/// `dir/name.mp4` → `dir/.name.mp4.part`
fn partial_path(output: &Path) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".into());
    output.with_file_name(format!(".{name}.part"))
}

async fn remove_if_present(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => log::warn!("assembler: cannot remove {}: {e}", path.display()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
