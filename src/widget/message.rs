//! Chat message records held by the widget.

use serde::{Deserialize, Serialize};

/// Who a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Outgoing message typed by the user.
    User,
    /// Incoming reply from the backend.
    Bot,
    /// A failed send.
    Error,
}

impl Sender {
    /// CSS class used for the rendered bubble.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "user-message",
            Self::Bot => "bot-message",
            Self::Error => "error-message",
        }
    }

    /// Label used by the terminal projection.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Bot => "Bot",
            Self::Error => "Error",
        }
    }
}

/// A single chat message. Never persisted; lives as long as its widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body as displayed.
    pub text: String,
    /// Originator of the message.
    pub sender: Sender,
    /// Formatted `HH:MM` time of creation.
    pub timestamp: String,
}

impl Message {
    pub fn new(sender: Sender, text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender,
            timestamp: timestamp.into(),
        }
    }

    pub fn user(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::new(Sender::User, text, timestamp)
    }

    pub fn bot(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::new(Sender::Bot, text, timestamp)
    }

    pub fn error(text: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self::new(Sender::Error, text, timestamp)
    }
}
