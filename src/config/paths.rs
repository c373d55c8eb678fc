//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout:
//!
//! Config dir (settings):
//!   Windows: %APPDATA%\sign-translator\
//!   macOS:   ~/Library/Application Support/sign-translator/
//!   Linux:   ~/.config/sign-translator/
//!
//! Data dir (chat history):
//!   Windows: %LOCALAPPDATA%\sign-translator\
//!   macOS:   ~/Library/Application Support/sign-translator/
//!   Linux:   ~/.local/share/sign-translator/

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Default location of the JSON-lines chat history.
    pub history_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "sign-translator";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let history_file = data_dir.join("chat-history.jsonl");

        Self {
            config_dir,
            settings_file,
            history_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}
