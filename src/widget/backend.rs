//! Network side of the widget: one JSON POST per send.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Why a send failed. Rendered verbatim into the error bubble.
#[derive(Error, Debug)]
pub enum SendError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Reply text or raw body returned by the server.
        message: String,
    },

    /// The body was not valid JSON.
    #[error("Malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The body was JSON but carried no `reply` string.
    #[error("Malformed response: missing reply field")]
    MissingReply,

    /// The backend ran in-process and failed.
    #[error("{0}")]
    Backend(String),
}

/// Request body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Response body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

impl ChatReply {
    /// Parse a response body, treating an absent or non-string `reply` as an error.
    pub fn from_body(body: &str) -> Result<Self, SendError> {
        let value: serde_json::Value = serde_json::from_str(body)?;
        value
            .get("reply")
            .and_then(serde_json::Value::as_str)
            .map(|reply| Self {
                reply: reply.to_string(),
            })
            .ok_or(SendError::MissingReply)
    }
}

/// Anything the widget can hand a message to and get a reply from.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Deliver `message` and return the reply text.
    async fn send(&self, message: &str) -> Result<String, SendError>;
}

/// Default transport timeout for widget requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// `ChatBackend` that talks to a `/chat` endpoint over HTTP.
#[derive(Debug, Clone)]
pub struct HttpChatBackend {
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpChatBackend {
    /// Create a backend for the given endpoint URL (e.g. `http://127.0.0.1:3000/chat`).
    pub fn new(endpoint: impl AsRef<str>) -> anyhow::Result<Self> {
        Self::with_timeout(endpoint, DEFAULT_TIMEOUT)
    }

    /// Create a backend whose requests give up after `timeout`.
    pub fn with_timeout(endpoint: impl AsRef<str>, timeout: Duration) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref())?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, http })
    }

    /// The endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ChatBackend for HttpChatBackend {
    async fn send(&self, message: &str) -> Result<String, SendError> {
        let req = ChatRequest {
            message: message.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&req)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // The bundled server reports failures as {"reply": "Error: ..."}.
            let message = ChatReply::from_body(&body).map_or(body, |r| r.reply);
            return Err(SendError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(ChatReply::from_body(&body)?.reply)
    }
}
