//! Resolution of gesture file names against the clip store.
//!
//! Each name in a [`GestureSequence`] becomes either a loaded [`ClipHandle`]
//! or a missing entry.  Missing covers three cases, all non-fatal:
//!
//! * the name is not a plain file name (`..`, separators, empty);
//! * no such file exists under the store;
//! * the file exists but the [`ClipLoader`] cannot open it.
//!
//! Names are resolved one after another, so the loaded/missing partition for
//! a given sequence and store is always the same.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::gesture::GestureSequence;

use super::{ClipError, ClipHandle, ClipLoader};

// ---------------------------------------------------------------------------
// ResolvedClip
// ---------------------------------------------------------------------------

/// Why a name did not resolve.
#[derive(Debug, Clone)]
pub enum MissingReason {
    /// The name would address something outside the store.
    InvalidName,
    /// No file at the expected path.
    NotFound,
    /// The file exists but is not a playable clip.
    LoadFailed(ClipError),
}

/// Outcome for one sequence entry.
#[derive(Debug, Clone)]
pub enum ResolvedClip {
    Loaded(ClipHandle),
    Missing {
        file_name: String,
        reason: MissingReason,
    },
}

/// Loaded clips and missing names, both in sequence order.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub loaded: Vec<ClipHandle>,
    pub missing: Vec<String>,
}

impl Resolution {
    /// File names of the loaded clips, in order.
    pub fn loaded_names(&self) -> Vec<&str> {
        self.loaded.iter().map(|c| c.file_name.as_str()).collect()
    }
}

impl FromIterator<ResolvedClip> for Resolution {
    fn from_iter<T: IntoIterator<Item = ResolvedClip>>(iter: T) -> Self {
        let mut out = Resolution::default();
        for entry in iter {
            match entry {
                ResolvedClip::Loaded(clip) => out.loaded.push(clip),
                ResolvedClip::Missing { file_name, .. } => out.missing.push(file_name),
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// ClipResolver
// ---------------------------------------------------------------------------

/// Maps gesture file names to clips in a store directory.
pub struct ClipResolver {
    store: PathBuf,
    loader: Arc<dyn ClipLoader>,
}

impl ClipResolver {
    pub fn new(store: impl Into<PathBuf>, loader: Arc<dyn ClipLoader>) -> Self {
        Self {
            store: store.into(),
            loader,
        }
    }

    /// Resolve every entry of `sequence`, in order.
    pub async fn resolve(&self, sequence: &GestureSequence) -> Resolution {
        let mut entries = Vec::with_capacity(sequence.len());
        for file_name in sequence {
            entries.push(self.resolve_one(file_name).await);
        }
        let resolution: Resolution = entries.into_iter().collect();

        if !resolution.missing.is_empty() {
            log::info!(
                "resolver: {} of {} clips unavailable: {:?}",
                resolution.missing.len(),
                sequence.len(),
                resolution.missing
            );
        }
        resolution
    }

    /// Resolve a single file name.
    pub async fn resolve_one(&self, file_name: &str) -> ResolvedClip {
        let missing = |reason| ResolvedClip::Missing {
            file_name: file_name.to_string(),
            reason,
        };

        if !is_plain_file_name(file_name) {
            log::warn!("resolver: rejecting clip name {file_name:?}");
            return missing(MissingReason::InvalidName);
        }

        let path = self.store.join(file_name);
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            log::warn!("resolver: clip not found: {}", path.display());
            return missing(MissingReason::NotFound);
        }

        match self.loader.load(&path).await {
            Ok(info) => {
                log::debug!(
                    "resolver: {file_name} {}x{} {}",
                    info.width,
                    info.height,
                    info.codec.as_deref().unwrap_or("unknown codec")
                );
                ResolvedClip::Loaded(ClipHandle {
                    file_name: file_name.to_string(),
                    path,
                    info,
                })
            }
            Err(e) => {
                log::warn!("resolver: cannot load {}: {e}", path.display());
                missing(MissingReason::LoadFailed(e))
            }
        }
    }
}

/// `true` when `name` is a single normal path component.
fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::testing::{write_clip, FileLoader};
    use tempfile::tempdir;

    fn seq(names: &[&str]) -> GestureSequence {
        GestureSequence::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[tokio::test]
    async fn absent_clip_is_missing() {
        let dir = tempdir().unwrap();
        let resolver = ClipResolver::new(dir.path(), Arc::new(FileLoader));

        let res = resolver.resolve(&seq(&["x.mp4"])).await;
        assert!(res.loaded.is_empty());
        assert_eq!(res.missing, vec!["x.mp4"]);
    }

    #[tokio::test]
    async fn loaded_clips_keep_order_without_placeholders() {
        let dir = tempdir().unwrap();
        write_clip(dir.path(), "привет.mp4", "привет");
        write_clip(dir.path(), "ты.mp4", "ты");
        let resolver = ClipResolver::new(dir.path(), Arc::new(FileLoader));

        let res = resolver
            .resolve(&seq(&["ты.mp4", "кот.mp4", "привет.mp4", "ты.mp4"]))
            .await;

        assert_eq!(res.loaded_names(), vec!["ты.mp4", "привет.mp4", "ты.mp4"]);
        assert_eq!(res.missing, vec!["кот.mp4"]);
        assert_eq!(res.loaded[1].path, dir.path().join("привет.mp4"));
    }

    #[tokio::test]
    async fn load_failure_counts_as_missing() {
        let dir = tempdir().unwrap();
        write_clip(dir.path(), "дом.mp4", "corrupt");
        let resolver = ClipResolver::new(dir.path(), Arc::new(FileLoader));

        match resolver.resolve_one("дом.mp4").await {
            ResolvedClip::Missing {
                file_name,
                reason: MissingReason::LoadFailed(_),
            } => assert_eq!(file_name, "дом.mp4"),
            other => panic!("expected load failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn names_outside_store_are_rejected() {
        let dir = tempdir().unwrap();
        let store = dir.path().join("gestures");
        std::fs::create_dir_all(&store).unwrap();
        write_clip(dir.path(), "secret.mp4", "secret");
        let resolver = ClipResolver::new(&store, Arc::new(FileLoader));

        for name in ["../secret.mp4", "/etc/passwd", "..", ".", "", "a\\b.mp4"] {
            assert!(
                matches!(
                    resolver.resolve_one(name).await,
                    ResolvedClip::Missing {
                        reason: MissingReason::InvalidName,
                        ..
                    }
                ),
                "{name:?} must be rejected"
            );
        }
    }

    #[tokio::test]
    async fn directories_are_not_clips() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("папка.mp4")).unwrap();
        let resolver = ClipResolver::new(dir.path(), Arc::new(FileLoader));

        let res = resolver.resolve(&seq(&["папка.mp4"])).await;
        assert_eq!(res.missing, vec!["папка.mp4"]);
    }

    #[tokio::test]
    async fn name_without_extension_is_not_found() {
        let dir = tempdir().unwrap();
        write_clip(dir.path(), "я.mp4", "я");
        let resolver = ClipResolver::new(dir.path(), Arc::new(FileLoader));

        let res = resolver.resolve(&seq(&["я"])).await;
        assert_eq!(res.missing, vec!["я"]);
    }

    #[tokio::test]
    async fn resolution_is_deterministic() {
        let dir = tempdir().unwrap();
        write_clip(dir.path(), "я.mp4", "я");
        write_clip(dir.path(), "он.mp4", "corrupt");
        let resolver = ClipResolver::new(dir.path(), Arc::new(FileLoader));
        let sequence = seq(&["я.mp4", "он.mp4", "мы.mp4", "я.mp4"]);

        let first = resolver.resolve(&sequence).await;
        for _ in 0..3 {
            let again = resolver.resolve(&sequence).await;
            assert_eq!(again.loaded_names(), first.loaded_names());
            assert_eq!(again.missing, first.missing);
        }
        assert_eq!(first.missing, vec!["он.mp4", "мы.mp4"]);
    }

    #[tokio::test]
    async fn empty_sequence_resolves_to_nothing() {
        let dir = tempdir().unwrap();
        let resolver = ClipResolver::new(dir.path(), Arc::new(FileLoader));
        let res = resolver.resolve(&GestureSequence::empty()).await;
        assert!(res.loaded.is_empty());
        assert!(res.missing.is_empty());
    }
}
