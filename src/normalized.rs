//! Normalized events produced by LLM drivers.
//!
//! Drivers translate their wire protocol into this small event model so that
//! callers can collect a reply without knowing which API produced it.
//!
//! # Example
//!
//! ```rust
//! use policy_chat::normalized::NormalizedEvent;
//!
//! let event = NormalizedEvent::MessageDelta {
//!     text: "Hello".to_string(),
//! };
//! let json = serde_json::to_string(&event).unwrap();
//! assert!(json.contains("message.delta"));
//! ```

use serde::{Deserialize, Serialize};

/// Streaming events emitted by an [`LlmDriver`](crate::llm::LlmDriver).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum NormalizedEvent {
    /// Incremental text from the assistant.
    #[serde(rename = "message.delta")]
    MessageDelta {
        /// The text fragment to append.
        text: String,
    },

    /// The provider reported an error inside the stream.
    #[serde(rename = "error")]
    Error {
        /// Human-readable description.
        message: String,
        /// Provider error code, when given.
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },

    /// The response is complete.
    #[serde(rename = "done")]
    Done,
}
