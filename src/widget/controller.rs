//! The widget controller: owns the transcript and the transient UI flags.

use std::sync::Arc;

use tracing::{debug, warn};

use super::backend::{ChatBackend, SendError};
use super::clock::{Clock, SystemClock, format_time_at};
use super::message::Message;

/// Presentation theme of the widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Class applied to the root container, if any.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::Light => "",
            Self::Dark => "dark-mode",
        }
    }
}

/// A send whose outgoing bubble is on screen and whose reply is outstanding.
///
/// Obtained from [`ChatWidget::begin_send`] and consumed by
/// [`ChatWidget::complete_send`].
#[derive(Debug)]
#[must_use = "a pending send keeps the typing indicator visible until completed"]
pub struct PendingSend {
    id: u64,
    message: String,
}

impl PendingSend {
    /// Sequence number of this send within its widget.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The trimmed text that was sent.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Chat widget state. Rendering is a projection of this struct.
pub struct ChatWidget {
    input: String,
    messages: Vec<Message>,
    pending: usize,
    next_send_id: u64,
    scroll: usize,
    theme: Theme,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for ChatWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatWidget")
            .field("input", &self.input)
            .field("messages", &self.messages)
            .field("pending", &self.pending)
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl Default for ChatWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatWidget {
    /// Empty widget reading the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Empty widget reading the given clock.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            input: String::new(),
            messages: Vec::new(),
            pending: 0,
            next_send_id: 0,
            scroll: 0,
            theme: Theme::default(),
            clock,
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Input field
    // ─────────────────────────────────────────────────────────────────────

    /// Replace the content of the input field.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Current content of the input field.
    pub fn input(&self) -> &str {
        &self.input
    }

    // ─────────────────────────────────────────────────────────────────────
    // Read-only state
    // ─────────────────────────────────────────────────────────────────────

    /// All bubbles in display order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether the typing indicator is shown.
    pub fn is_typing(&self) -> bool {
        self.pending > 0
    }

    /// Number of sends awaiting a reply.
    pub fn pending_sends(&self) -> usize {
        self.pending
    }

    /// Number of bubbles the view has scrolled past; equals the message
    /// count right after any bubble is appended.
    pub fn scroll_position(&self) -> usize {
        self.scroll
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Current time formatted for a bubble.
    pub fn format_time(&self) -> String {
        format_time_at(&self.clock.now())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────

    /// Flip between light and dark. Returns the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        debug!(theme = ?self.theme, "Theme toggled");
        self.theme
    }

    /// Render the outgoing bubble for the current input and show the typing
    /// indicator.
    ///
    /// Returns `None` without touching any state when the trimmed input is
    /// empty.
    pub fn begin_send(&mut self) -> Option<PendingSend> {
        let text = self.input.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();

        let timestamp = self.format_time();
        self.push(Message::user(text.clone(), timestamp));
        self.input.clear();

        self.pending += 1;
        let id = self.next_send_id;
        self.next_send_id += 1;

        debug!(send_id = id, pending = self.pending, "Send started");
        Some(PendingSend { id, message: text })
    }

    /// Render the outcome of a pending send and return the new bubble.
    ///
    /// The typing indicator stays visible while other sends are outstanding.
    pub fn complete_send(
        &mut self,
        pending: PendingSend,
        result: Result<String, SendError>,
    ) -> &Message {
        self.pending = self.pending.saturating_sub(1);
        let timestamp = self.format_time();

        let message = match result {
            Ok(reply) => {
                debug!(send_id = pending.id, "Reply received");
                Message::bot(reply, timestamp)
            }
            Err(e) => {
                warn!(send_id = pending.id, error = %e, "Send failed");
                Message::error(e.to_string(), timestamp)
            }
        };
        self.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Send the current input through `backend`.
    ///
    /// Returns the reply or error bubble, or `None` if the input was blank
    /// (in which case the backend is not called).
    pub async fn send(&mut self, backend: &dyn ChatBackend) -> Option<&Message> {
        let pending = self.begin_send()?;
        let result = backend.send(pending.message()).await;
        Some(self.complete_send(pending, result))
    }

    fn push(&mut self, message: Message) {
        self.messages.push(message);
        self.scroll = self.messages.len();
    }
}
