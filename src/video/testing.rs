//! Test doubles for the video seams.
//!
//! Clips are plain text files; a clip whose content starts with `corrupt`
//! fails to load.  [`ConcatEncoder`] "encodes" by joining the clip contents
//! with `|`, so tests can assert on order by reading the output file.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{ClipError, ClipHandle, ClipInfo, ClipLoader, EncodeError, VideoEncoder};

pub fn write_clip(dir: &Path, file_name: &str, content: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(file_name), content).unwrap();
}

pub struct FileLoader;

#[async_trait]
impl ClipLoader for FileLoader {
    async fn load(&self, path: &Path) -> Result<ClipInfo, ClipError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ClipError::InvalidOutput(e.to_string()))?;
        if content.starts_with("corrupt") {
            return Err(ClipError::NoVideoStream);
        }
        Ok(ClipInfo {
            width: 640,
            height: 480,
            duration_secs: Some(1.0),
            codec: Some("h264".into()),
        })
    }
}

#[derive(Default)]
pub struct ConcatEncoder {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl ConcatEncoder {
    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoEncoder for ConcatEncoder {
    async fn encode(&self, clips: &[ClipHandle], output: &Path) -> Result<(), EncodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut parts = Vec::with_capacity(clips.len());
        for clip in clips {
            parts.push(tokio::fs::read_to_string(&clip.path).await?);
        }
        // Leave a partial file behind, as a crashed encoder would.
        tokio::fs::write(output, parts.join("|")).await?;
        if self.fail {
            return Err(EncodeError::Failed {
                status: 1,
                stderr: "simulated failure".into(),
            });
        }
        Ok(())
    }
}
