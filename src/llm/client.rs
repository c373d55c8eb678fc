//! Core `TranslationClient` trait and `ApiTranslator` implementation.
//!
//! `ApiTranslator` calls any OpenAI-compatible `/v1/chat/completions` endpoint
//! (Ollama in OpenAI mode, OpenAI, Groq, LM Studio, vLLM, ...).
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use thiserror::Error;

use crate::config::LlmConfig;
use crate::llm::prompt::SYSTEM_INSTRUCTION;

// ---------------------------------------------------------------------------
// TranslateError
// ---------------------------------------------------------------------------

/// Errors that can occur while asking the model for a gesture sequence.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// HTTP transport or connection error.
    #[error("HTTP request failed: {0}")]
    Network(String),

    /// The request did not complete within the configured timeout.
    #[error("LLM request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("LLM backend returned {status}: {body}")]
    Backend { status: u16, body: String },

    /// The response body was not a chat-completion payload.
    #[error("unexpected LLM response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TranslateError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TranslateError::Timeout
        } else {
            TranslateError::Network(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// TranslationClient trait
// ---------------------------------------------------------------------------

/// Sends a rendered prompt to a language model and returns the raw reply.
///
/// Implementations must not interpret the reply; that is the sequence
/// parser's job.  They must be `Send + Sync` so they can live behind an
/// `Arc<dyn TranslationClient>` shared by concurrent requests.
#[async_trait]
pub trait TranslationClient: Send + Sync {
    async fn translate(&self, prompt: &str) -> Result<String, TranslateError>;
}

// ---------------------------------------------------------------------------
// ApiTranslator
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint.
///
/// One request per call, no retries.  The system message is always
/// [`SYSTEM_INSTRUCTION`]; the prompt is sent as the user message.
pub struct ApiTranslator {
    client: reqwest::Client,
    config: LlmConfig,
}

impl ApiTranslator {
    /// Build an `ApiTranslator` from application config.
    ///
    /// The HTTP client carries the per-request timeout from
    /// `config.timeout_secs`.  A default client is used if the builder fails.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": SYSTEM_INSTRUCTION },
                { "role": "user",   "content": prompt }
            ],
            "stream":      false,
            "temperature": self.config.temperature
        })
    }
}

/// Pull `choices[0].message.content` out of a chat-completion payload.
fn first_choice_content(json: &serde_json::Value) -> Result<String, TranslateError> {
    json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| TranslateError::InvalidResponse("missing choices[0].message.content".into()))
}

#[async_trait]
impl TranslationClient for ApiTranslator {
    /// The `Authorization: Bearer …` header is attached only when
    /// `config.api_key` is a non-empty string.
    async fn translate(&self, prompt: &str) -> Result<String, TranslateError> {
        let mut req = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(prompt));

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TranslateError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TranslateError::InvalidResponse(e.to_string()))?;

        first_choice_content(&json)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
