//! LLM driver trait and the OpenAI-compatible implementation.
//!
//! The policy agent talks to its model through [`LlmDriver`], which streams
//! [`NormalizedEvent`]s. [`complete`] folds such a stream into a single reply,
//! which is all the agent graph needs.
//!
//! Ollama serves the OpenAI Chat Completions API under `/v1`, so the same
//! [`ChatCompletionsDriver`] covers a local Ollama and hosted providers.
//!
//! # Example
//!
//! ```rust,ignore
//! use policy_chat::llm::{ChatCompletionsDriver, LlmSettings, Message, complete};
//!
//! let driver = ChatCompletionsDriver::new(LlmSettings {
//!     base_url: "http://localhost:11434".to_string(),
//!     api_key: None,
//!     model: "llama3.2:3b".to_string(),
//!     timeout: Some(Duration::from_secs(120)),
//! })?;
//! let reply = complete(&driver, vec![Message::user("Hello")]).await?;
//! ```

pub mod chat_completions;

pub use chat_completions::ChatCompletionsDriver;

use std::pin::Pin;
use std::time::Duration;

use futures::{Stream, StreamExt};

use crate::normalized::NormalizedEvent;

/// LLM connection and model settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL of the API (e.g., `http://localhost:11434`).
    pub base_url: String,
    /// Optional API key, sent as a bearer token.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `llama3.2:3b`).
    pub model: String,
    /// Whole-request timeout; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User (human) message.
    User,
    /// Assistant response.
    Assistant,
}

/// A prompt message.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request to an LLM driver.
#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// Conversation messages, oldest first.
    pub messages: Vec<Message>,
}

/// Boxed stream of normalized events.
pub type EventStream = Pin<Box<dyn Stream<Item = anyhow::Result<NormalizedEvent>> + Send>>;

/// Trait for LLM streaming drivers.
#[async_trait::async_trait]
pub trait LlmDriver: Send + Sync {
    /// Stream a response from the LLM.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the connection is interrupted.
    async fn stream(&self, req: LlmRequest) -> anyhow::Result<EventStream>;
}

/// Run `messages` through `driver` and return the concatenated reply text.
pub async fn complete(driver: &dyn LlmDriver, messages: Vec<Message>) -> anyhow::Result<String> {
    let request_id = uuid::Uuid::new_v4().to_string();
    tracing::debug!(
        request_id = %request_id,
        message_count = messages.len(),
        "Starting completion"
    );

    let mut stream = driver.stream(LlmRequest { messages }).await?;
    let mut content = String::new();

    while let Some(event) = stream.next().await {
        match event? {
            NormalizedEvent::MessageDelta { text } => content.push_str(&text),
            NormalizedEvent::Error { message, code } => {
                tracing::error!(request_id = %request_id, error = %message, code = ?code, "LLM stream error");
                anyhow::bail!("LLM error: {message}");
            }
            NormalizedEvent::Done => break,
        }
    }

    tracing::debug!(
        request_id = %request_id,
        content_length = content.len(),
        "Completion finished"
    );
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedDriver(Vec<NormalizedEvent>);

    #[async_trait::async_trait]
    impl LlmDriver for CannedDriver {
        async fn stream(&self, _req: LlmRequest) -> anyhow::Result<EventStream> {
            let events: Vec<anyhow::Result<NormalizedEvent>> =
                self.0.iter().cloned().map(Ok).collect();
            Ok(Box::pin(futures::stream::iter(events)))
        }
    }

    #[tokio::test]
    async fn test_complete_concatenates_deltas() {
        let driver = CannedDriver(vec![
            NormalizedEvent::MessageDelta { text: "Hel".into() },
            NormalizedEvent::MessageDelta { text: "lo".into() },
            NormalizedEvent::Done,
            NormalizedEvent::MessageDelta { text: "ignored".into() },
        ]);
        let reply = complete(&driver, vec![Message::user("hi")]).await.unwrap();
        assert_eq!(reply, "Hello");
    }

    #[tokio::test]
    async fn test_complete_surfaces_stream_error() {
        let driver = CannedDriver(vec![NormalizedEvent::Error {
            message: "model not found".into(),
            code: Some("404".into()),
        }]);
        let err = complete(&driver, vec![]).await.unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn test_message_serializes_role() {
        let json = serde_json::to_value(Message::system("be brief")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "be brief"}));
    }
}
