//! Chat front: request handling and history storage around the pipeline.

pub mod history;
pub mod service;

pub use history::{ChatRecord, ChatRepository, HistoryError, JsonlChatHistory, MemoryChatHistory};
pub use service::{render_response, ChatReply, ChatService};
