//! Chat history persistence.
//!
//! The pipeline side only ever needs [`ChatRepository::save`].  Two
//! implementations are provided:
//!
//! * [`JsonlChatHistory`] — append-only JSON-lines file, one record per line.
//! * [`MemoryChatHistory`] — in-process, for tests and embedding.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

// ---------------------------------------------------------------------------
// ChatRecord
// ---------------------------------------------------------------------------

/// One message/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRecord {
    pub user_id: String,
    pub message: String,
    pub response: String,
    pub created_at: DateTime<Utc>,
}

impl ChatRecord {
    /// Record stamped with the current time.
    pub fn now(user_id: &str, message: &str, response: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            message: message.to_string(),
            response: response.to_string(),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// HistoryError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("history record could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// ChatRepository
// ---------------------------------------------------------------------------

/// Narrow persistence interface used by the chat service.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    async fn save(&self, record: &ChatRecord) -> Result<(), HistoryError>;
}

// ---------------------------------------------------------------------------
// JsonlChatHistory
// ---------------------------------------------------------------------------

/// Appends records as JSON lines to a file.
///
/// Appends are serialised through an internal lock so concurrent requests
/// never interleave partial lines.
pub struct JsonlChatHistory {
    path: PathBuf,
    write_lock: tokio::sync::Mutex<()>,
}

impl JsonlChatHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// All records of `user_id`, oldest first.
    ///
    /// A missing file is an empty history.  Lines that do not decode are
    /// skipped with a warning.
    pub async fn load_for_user(&self, user_id: &str) -> Result<Vec<ChatRecord>, HistoryError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ChatRecord>(line) {
                Ok(record) if record.user_id == user_id => records.push(record),
                Ok(_) => {}
                Err(e) => log::warn!(
                    "history: skipping line {} of {}: {e}",
                    idx + 1,
                    self.path.display()
                ),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl ChatRepository for JsonlChatHistory {
    async fn save(&self, record: &ChatRecord) -> Result<(), HistoryError> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryChatHistory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryChatHistory {
    records: Mutex<Vec<ChatRecord>>,
}

impl MemoryChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything saved so far.
    pub fn records(&self) -> Vec<ChatRecord> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatRepository for MemoryChatHistory {
    async fn save(&self, record: &ChatRecord) -> Result<(), HistoryError> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(record.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
