//! Pipeline orchestrator — phrase → prompt → model → sequence → clips → video.
//!
//! # Pipeline flow
//!
//! ```text
//! run(user_id, phrase)
//!   └─▶ PromptBuilder::build
//!         └─▶ TranslationClient::translate          (Err → failure)
//!               └─▶ SequenceParser::parse           (malformed → empty)
//!                     └─▶ ClipResolver::resolve     (missing → logged)
//!                           └─▶ VideoAssembler::assemble
//!                                 ├─ Ok  → Success { reference }
//!                                 └─ Err → failure  (NoClips / Encode)
//! ```
//!
//! Every failure collapses to [`TranslationResult::failure`]; the cause is
//! logged with its stage and never returned to the caller.  The pipeline
//! holds no mutable state, so one instance behind an `Arc` serves any number
//! of concurrent runs.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, MediaConfig};
use crate::gesture::GestureVocabulary;
use crate::llm::{ApiTranslator, PromptBuilder, SequenceParser, TranslateError, TranslationClient};
use crate::video::{
    AssembleError, ClipLoader, ClipResolver, FfmpegBackend, VideoAssembler, VideoEncoder,
};

use super::result::TranslationResult;

// ---------------------------------------------------------------------------
// PipelineError
// ---------------------------------------------------------------------------

/// Internal failure of a run, kept for logging only.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("translation stage: {0}")]
    Translate(#[from] TranslateError),

    #[error("assembly stage: {0}")]
    Assemble(#[from] AssembleError),
}

// ---------------------------------------------------------------------------
// TranslationPipeline
// ---------------------------------------------------------------------------

/// Drives one phrase through the whole translation pipeline.
///
/// ```rust,no_run
/// use sign_translator::config::AppConfig;
/// use sign_translator::pipeline::TranslationPipeline;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = AppConfig::load()?;
/// let pipeline = TranslationPipeline::from_config(&config, config.vocabulary()?);
///
/// let result = pipeline.run("42", "привет как ты").await;
/// println!("{:?}", result.output_reference());
/// # Ok(())
/// # }
/// ```
pub struct TranslationPipeline {
    prompt: PromptBuilder,
    client: Arc<dyn TranslationClient>,
    resolver: ClipResolver,
    assembler: VideoAssembler,
    media: MediaConfig,
}

impl TranslationPipeline {
    /// Assemble a pipeline from explicit parts.
    ///
    /// * `vocabulary` — closed gesture set embedded in every prompt.
    /// * `client`     — model backend (e.g. [`ApiTranslator`]).
    /// * `loader`     — opens clips from `media.clip_store()`.
    /// * `encoder`    — writes outputs under `media.output_dir()`.
    pub fn new(
        vocabulary: GestureVocabulary,
        client: Arc<dyn TranslationClient>,
        loader: Arc<dyn ClipLoader>,
        encoder: Arc<dyn VideoEncoder>,
        media: MediaConfig,
    ) -> Self {
        Self {
            prompt: PromptBuilder::new(vocabulary),
            client,
            resolver: ClipResolver::new(media.clip_store(), loader),
            assembler: VideoAssembler::new(encoder),
            media,
        }
    }

    /// Production wiring: [`ApiTranslator`] + [`FfmpegBackend`].
    pub fn from_config(config: &AppConfig, vocabulary: GestureVocabulary) -> Self {
        let ffmpeg = Arc::new(FfmpegBackend::from_config(&config.video));
        Self::new(
            vocabulary,
            Arc::new(ApiTranslator::from_config(&config.llm)),
            ffmpeg.clone(),
            ffmpeg,
            config.media.clone(),
        )
    }

    pub fn prompt_builder(&self) -> &PromptBuilder {
        &self.prompt
    }

    /// Translate `phrase` for `user_id` into a video.
    pub async fn run(&self, user_id: &str, phrase: &str) -> TranslationResult {
        let file_name = output_file_name(user_id);
        match self.try_run(phrase, &file_name).await {
            Ok(output_path) => {
                let output_reference = self.media.output_reference(&file_name);
                log::info!("pipeline: user {user_id} → {output_reference}");
                TranslationResult::Success {
                    output_reference,
                    output_path,
                }
            }
            Err(e) => {
                match &e {
                    PipelineError::Assemble(AssembleError::NoClips) => {
                        log::warn!("pipeline: user {user_id}: no clips for {phrase:?}")
                    }
                    _ => log::error!("pipeline: user {user_id}: {e}"),
                }
                TranslationResult::failure()
            }
        }
    }

    async fn try_run(&self, phrase: &str, file_name: &str) -> Result<PathBuf, PipelineError> {
        // ── 1. Prompt + model ────────────────────────────────────────────
        let prompt = self.prompt.build(phrase);
        let raw = self.client.translate(&prompt).await?;
        log::debug!("pipeline: raw model reply = {raw:?}");

        // ── 2. Parse ─────────────────────────────────────────────────────
        let sequence = SequenceParser::parse(&raw);
        log::debug!("pipeline: sequence = {:?}", sequence.as_slice());

        // ── 3. Resolve ───────────────────────────────────────────────────
        let resolution = self.resolver.resolve(&sequence).await;
        let seconds: f64 = resolution
            .loaded
            .iter()
            .filter_map(|clip| clip.info.duration_secs)
            .sum();
        log::debug!(
            "pipeline: clips = {:?} (~{seconds:.1} s)",
            resolution.loaded_names()
        );

        // ── 4. Assemble ──────────────────────────────────────────────────
        let output = self.media.output_dir().join(file_name);
        Ok(self.assembler.assemble(resolution.loaded, &output).await?)
    }
}

/// Longest user-id part kept in an output file name.
const MAX_USER_ID_CHARS: usize = 64;

/// `user_<id>_<8 hex chars>.mp4`, unique per call.
///
/// Characters of `user_id` outside `[A-Za-z0-9_-]` become `_`, and the id
/// part is cut to 64 characters.
pub fn output_file_name(user_id: &str) -> String {
    let safe: String = user_id
        .chars()
        .take(MAX_USER_ID_CHARS)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("user_{safe}_{}.mp4", &token[..8])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::testing::{write_clip, ConcatEncoder, FileLoader};
    use crate::pipeline::result::FAILURE_MESSAGE;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::path::Path;
    use tempfile::TempDir;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Replies with a fixed string.
    struct FixedReply(String);

    #[async_trait]
    impl TranslationClient for FixedReply {
        async fn translate(&self, _prompt: &str) -> Result<String, TranslateError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails like an unreachable backend.
    struct Unreachable;

    #[async_trait]
    impl TranslationClient for Unreachable {
        async fn translate(&self, _prompt: &str) -> Result<String, TranslateError> {
            Err(TranslateError::Timeout)
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn media_in(dir: &Path) -> MediaConfig {
        MediaConfig {
            root: dir.to_path_buf(),
            ..MediaConfig::default()
        }
    }

    fn seeded_media() -> (TempDir, MediaConfig) {
        let dir = tempfile::tempdir().unwrap();
        let media = media_in(dir.path());
        for label in ["привет", "как", "ты"] {
            write_clip(&media.clip_store(), &format!("{label}.mp4"), label);
        }
        (dir, media)
    }

    fn pipeline(
        media: &MediaConfig,
        client: Arc<dyn TranslationClient>,
        encoder: Arc<ConcatEncoder>,
    ) -> TranslationPipeline {
        TranslationPipeline::new(
            GestureVocabulary::builtin(),
            client,
            Arc::new(FileLoader),
            encoder,
            media.clone(),
        )
    }

    fn output_files(media: &MediaConfig) -> Vec<PathBuf> {
        match std::fs::read_dir(media.output_dir()) {
            Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn three_known_gestures_produce_video_in_order() {
        let (_dir, media) = seeded_media();
        let reply = "['привет.mp4', 'как.mp4', 'ты.mp4']";
        let p = pipeline(
            &media,
            Arc::new(FixedReply(reply.into())),
            Arc::new(ConcatEncoder::default()),
        );

        let result = p.run("7", "привет как ты").await;

        match &result {
            TranslationResult::Success {
                output_reference,
                output_path,
            } => {
                assert!(output_reference.starts_with("/media/outputs/user_7_"));
                assert!(output_reference.ends_with(".mp4"));
                assert_eq!(
                    std::fs::read_to_string(output_path).unwrap(),
                    "привет|как|ты"
                );
                assert_eq!(output_path.parent().unwrap(), media.output_dir());
            }
            other => panic!("expected success, got {other:?}"),
        }
        assert_eq!(output_files(&media).len(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_fails_without_output() {
        let (_dir, media) = seeded_media();
        let encoder = Arc::new(ConcatEncoder::default());
        let p = pipeline(
            &media,
            Arc::new(FixedReply("Конечно! Вот жесты: привет, как, ты".into())),
            encoder.clone(),
        );

        let result = p.run("7", "привет как ты").await;

        assert_eq!(
            result,
            TranslationResult::Failure {
                reason: FAILURE_MESSAGE.into()
            }
        );
        assert!(output_files(&media).is_empty());
        assert_eq!(encoder.calls(), 0);
    }

    #[tokio::test]
    async fn unknown_gestures_only_is_failure() {
        let (_dir, media) = seeded_media();
        let p = pipeline(
            &media,
            Arc::new(FixedReply("['кот.mp4', 'собака.mp4']".into())),
            Arc::new(ConcatEncoder::default()),
        );

        assert_eq!(p.run("1", "кот и собака").await, TranslationResult::failure());
        assert!(output_files(&media).is_empty());
    }

    #[tokio::test]
    async fn missing_clips_are_skipped() {
        let (_dir, media) = seeded_media();
        let p = pipeline(
            &media,
            Arc::new(FixedReply("['привет.mp4', 'кот.mp4', 'ты.mp4']".into())),
            Arc::new(ConcatEncoder::default()),
        );

        let result = p.run("1", "привет кот").await;
        let TranslationResult::Success { output_path, .. } = result else {
            panic!("expected success");
        };
        assert_eq!(std::fs::read_to_string(output_path).unwrap(), "привет|ты");
    }

    #[tokio::test]
    async fn backend_failure_is_generic_failure() {
        let (_dir, media) = seeded_media();
        let p = pipeline(
            &media,
            Arc::new(Unreachable),
            Arc::new(ConcatEncoder::default()),
        );

        assert_eq!(p.run("1", "привет").await, TranslationResult::failure());
    }

    #[tokio::test]
    async fn encode_failure_is_generic_failure_without_output() {
        let (_dir, media) = seeded_media();
        let p = pipeline(
            &media,
            Arc::new(FixedReply("['привет.mp4']".into())),
            Arc::new(ConcatEncoder::failing()),
        );

        assert_eq!(p.run("1", "привет").await, TranslationResult::failure());
        assert!(output_files(&media).is_empty());
    }

    #[tokio::test]
    async fn repeated_runs_write_distinct_files() {
        let (_dir, media) = seeded_media();
        let p = Arc::new(pipeline(
            &media,
            Arc::new(FixedReply("['ты.mp4']".into())),
            Arc::new(ConcatEncoder::default()),
        ));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let p = Arc::clone(&p);
            handles.push(tokio::spawn(async move { p.run("5", "ты").await }));
        }

        let mut refs = HashSet::new();
        for h in handles {
            let result = h.await.unwrap();
            refs.insert(result.output_reference().unwrap().to_string());
        }
        assert_eq!(refs.len(), 4);
        assert_eq!(output_files(&media).len(), 4);
    }

    #[test]
    fn output_file_name_shape() {
        let name = output_file_name("42");
        assert!(name.starts_with("user_42_"));
        assert!(name.ends_with(".mp4"));
        let token = &name["user_42_".len()..name.len() - ".mp4".len()];
        assert_eq!(token.len(), 8);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn output_file_name_sanitises_user_id() {
        let name = output_file_name("../bob@example");
        assert!(name.starts_with("user____bob_example_"));
        assert!(!name.contains('/'));
    }

    #[test]
    fn output_file_name_caps_long_user_id() {
        let long_id = "я".repeat(10_000);
        let name = output_file_name(&long_id);

        let id_part = &name["user_".len()..name.len() - "_12345678.mp4".len()];
        assert_eq!(id_part, "_".repeat(MAX_USER_ID_CHARS));
        assert!(name.len() < 255);
    }

    #[tokio::test]
    async fn long_user_id_still_produces_video() {
        let (_dir, media) = seeded_media();
        let p = pipeline(
            &media,
            Arc::new(FixedReply("['я.mp4']".into())),
            Arc::new(ConcatEncoder::default()),
        );
        write_clip(&media.clip_store(), "я.mp4", "я");

        let result = p.run(&"x".repeat(1_000), "я").await;
        assert!(result.is_success());
    }
}
