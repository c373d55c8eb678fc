//! Entry point consumed by a chat front-end.
//!
//! [`ChatService::handle`] takes `{user_id, message}`, runs the translation
//! pipeline, renders the reply and stores the pair in chat history.

use std::sync::Arc;

use serde::Serialize;

use crate::pipeline::{TranslationPipeline, TranslationResult};

use super::history::{ChatRecord, ChatRepository};

/// `{message, response}` returned to the front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatReply {
    pub message: String,
    pub response: String,
}

/// Embeddable markup for a successful run, or the fixed failure text.
pub fn render_response(result: &TranslationResult) -> String {
    match result {
        TranslationResult::Success {
            output_reference, ..
        } => format!(
            "<video controls width='320'><source src='{output_reference}' type='video/mp4'></video>"
        ),
        TranslationResult::Failure { reason } => reason.clone(),
    }
}

pub struct ChatService {
    pipeline: Arc<TranslationPipeline>,
    history: Arc<dyn ChatRepository>,
}

impl ChatService {
    pub fn new(pipeline: Arc<TranslationPipeline>, history: Arc<dyn ChatRepository>) -> Self {
        Self { pipeline, history }
    }

    /// Translate `message` and record the exchange.
    ///
    /// A history write failure is logged; the reply is still returned.
    pub async fn handle(&self, user_id: &str, message: &str) -> ChatReply {
        let result = self.pipeline.run(user_id, message).await;
        let response = render_response(&result);

        let record = ChatRecord::now(user_id, message, &response);
        if let Err(e) = self.history.save(&record).await {
            log::error!("chat: cannot save history for user {user_id}: {e}");
        }

        ChatReply {
            message: message.to_string(),
            response,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::history::{HistoryError, MemoryChatHistory};
    use crate::config::MediaConfig;
    use crate::gesture::GestureVocabulary;
    use crate::llm::{TranslateError, TranslationClient};
    use crate::pipeline::FAILURE_MESSAGE;
    use crate::video::testing::{write_clip, ConcatEncoder, FileLoader};
    use async_trait::async_trait;
    use std::path::PathBuf;

    struct FixedReply(&'static str);

    #[async_trait]
    impl TranslationClient for FixedReply {
        async fn translate(&self, _prompt: &str) -> Result<String, TranslateError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenHistory;

    #[async_trait]
    impl ChatRepository for BrokenHistory {
        async fn save(&self, _record: &ChatRecord) -> Result<(), HistoryError> {
            Err(HistoryError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    fn service(
        root: &std::path::Path,
        reply: &'static str,
        history: Arc<dyn ChatRepository>,
    ) -> ChatService {
        let media = MediaConfig {
            root: root.to_path_buf(),
            ..MediaConfig::default()
        };
        write_clip(&media.clip_store(), "привет.mp4", "привет");
        let pipeline = TranslationPipeline::new(
            GestureVocabulary::builtin(),
            Arc::new(FixedReply(reply)),
            Arc::new(FileLoader),
            Arc::new(ConcatEncoder::default()),
            media,
        );
        ChatService::new(Arc::new(pipeline), history)
    }

    #[test]
    fn render_success_as_video_tag() {
        let result = TranslationResult::Success {
            output_reference: "/media/outputs/user_1_aa.mp4".into(),
            output_path: PathBuf::from("x"),
        };
        assert_eq!(
            render_response(&result),
            "<video controls width='320'><source src='/media/outputs/user_1_aa.mp4' \
             type='video/mp4'></video>"
        );
    }

    #[test]
    fn render_failure_as_fixed_text() {
        assert_eq!(render_response(&TranslationResult::failure()), FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn success_is_rendered_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let history = Arc::new(MemoryChatHistory::new());
        let svc = service(dir.path(), "['привет.mp4']", history.clone());

        let reply = svc.handle("3", "привет").await;

        assert_eq!(reply.message, "привет");
        assert!(reply.response.starts_with("<video controls"));
        assert!(reply.response.contains("/media/outputs/user_3_"));

        let saved = history.records();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].user_id, "3");
        assert_eq!(saved[0].message, "привет");
        assert_eq!(saved[0].response, reply.response);
    }

    #[tokio::test]
    async fn failure_is_rendered_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let history = Arc::new(MemoryChatHistory::new());
        let svc = service(dir.path(), "не знаю", history.clone());

        let reply = svc.handle("3", "абракадабра").await;

        assert_eq!(reply.response, FAILURE_MESSAGE);
        assert_eq!(history.records()[0].response, FAILURE_MESSAGE);
    }

    #[tokio::test]
    async fn history_failure_does_not_hide_reply() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(dir.path(), "['привет.mp4']", Arc::new(BrokenHistory));

        let reply = svc.handle("3", "привет").await;
        assert!(reply.response.starts_with("<video"));
    }

    #[test]
    fn reply_serialises_as_message_and_response() {
        let reply = ChatReply {
            message: "m".into(),
            response: "r".into(),
        };
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            serde_json::json!({ "message": "m", "response": "r" })
        );
    }
}
