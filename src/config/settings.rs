//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//! Every section is `#[serde(default)]`, so a settings file only needs the
//! keys it wants to override.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use super::AppPaths;
use crate::gesture::{GestureVocabulary, DEFAULT_GESTURES};

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the language-model backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API endpoint.
    ///
    /// - Ollama default: `http://localhost:11434`
    /// - OpenAI: `https://api.openai.com`
    pub base_url: String,
    /// API key — `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4"`).
    pub model: String,
    /// Sampling temperature (0.0 – 1.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a reply before timing out.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".into(),
            api_key: None,
            model: "gpt-4".into(),
            temperature: 0.2,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// MediaConfig
// ---------------------------------------------------------------------------

/// Clip store and output locations.
///
/// ```text
/// <root>/<gestures_dir>/<label>.mp4     read-only clip store
/// <root>/<outputs_dir>/<generated>.mp4  assembled videos
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Media root directory.
    pub root: PathBuf,
    /// Sub-directory of `root` holding one clip per gesture.
    pub gestures_dir: String,
    /// Sub-directory of `root` receiving assembled videos.
    pub outputs_dir: String,
    /// URL prefix under which `root` is served (e.g. `"/media"`).
    pub base_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("media"),
            gestures_dir: "gestures".into(),
            outputs_dir: "outputs".into(),
            base_url: "/media".into(),
        }
    }
}

impl MediaConfig {
    /// Directory holding the gesture clips.
    pub fn clip_store(&self) -> PathBuf {
        self.root.join(&self.gestures_dir)
    }

    /// Directory receiving assembled videos.
    pub fn output_dir(&self) -> PathBuf {
        self.root.join(&self.outputs_dir)
    }

    /// Public reference for an output file, e.g. `/media/outputs/x.mp4`.
    pub fn output_reference(&self, file_name: &str) -> String {
        format!(
            "{}/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.outputs_dir.trim_matches('/'),
            file_name
        )
    }
}

// ---------------------------------------------------------------------------
// VideoConfig
// ---------------------------------------------------------------------------

/// Settings for probing and encoding clips with ffmpeg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// `ffmpeg` executable name or path.
    pub ffmpeg_bin: String,
    /// `ffprobe` executable name or path.
    pub ffprobe_bin: String,
    /// Video codec passed to `-c:v`.
    pub codec: String,
    /// Frame rate every clip is normalised to before concatenation.
    pub frame_rate: u32,
    /// Maximum seconds a single concatenation may take.
    pub encode_timeout_secs: u64,
    /// Maximum seconds a single clip probe may take.
    pub probe_timeout_secs: u64,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: "ffmpeg".into(),
            ffprobe_bin: "ffprobe".into(),
            codec: "libx264".into(),
            frame_rate: 25,
            encode_timeout_secs: 120,
            probe_timeout_secs: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryConfig
// ---------------------------------------------------------------------------

/// Where chat history is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// JSON-lines history file.
    pub path: PathBuf,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: AppPaths::new().history_file,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use sign_translator::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// let vocabulary = config.vocabulary().unwrap();
/// assert!(!vocabulary.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Language-model backend.
    pub llm: LlmConfig,
    /// Clip store / output layout.
    pub media: MediaConfig,
    /// ffmpeg settings.
    pub video: VideoConfig,
    /// Chat history storage.
    pub history: HistoryConfig,
    /// Ordered gesture labels, one clip `<label>.mp4` per entry.
    pub vocabulary: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            media: MediaConfig::default(),
            video: VideoConfig::default(),
            history: HistoryConfig::default(),
            vocabulary: DEFAULT_GESTURES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    ///
    /// The result is [`validate`](Self::validate)d, so a bad settings file is
    /// rejected at startup rather than on the first request.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(config)
    }

    /// Reject values that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.llm.timeout_secs > 0, "llm.timeout_secs must be positive");
        ensure!(self.video.frame_rate > 0, "video.frame_rate must be positive");
        ensure!(
            self.video.encode_timeout_secs > 0,
            "video.encode_timeout_secs must be positive"
        );
        ensure!(
            self.video.probe_timeout_secs > 0,
            "video.probe_timeout_secs must be positive"
        );
        self.vocabulary()?;
        Ok(())
    }

    /// Save configuration to the platform-appropriate `settings.toml`.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Build the immutable vocabulary from the configured labels.
    pub fn vocabulary(&self) -> Result<GestureVocabulary> {
        Ok(GestureVocabulary::new(self.vocabulary.iter().cloned())?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
