//! Chat widget: transcript, typing indicator, theme, and the send flow.
//!
//! The [`ChatWidget`] owns all widget state as plain data; the browser page and
//! the terminal client are projections of it produced by [`render`].
//!
//! # Send flow
//!
//! 1. Blank (after trimming) input is ignored.
//! 2. The outgoing bubble is appended, the input cleared and the typing
//!    indicator shown.
//! 3. The message is POSTed as `{"message": ...}`; the `reply` field of the
//!    response becomes a bot bubble, any failure becomes an error bubble.
//!
//! # Example
//!
//! ```rust,no_run
//! use policy_chat::widget::{ChatWidget, HttpChatBackend};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let backend = HttpChatBackend::new("http://127.0.0.1:3000/chat")?;
//! let mut widget = ChatWidget::new();
//! widget.set_input("What is the sum insured on P1234A?");
//! if let Some(bubble) = widget.send(&backend).await {
//!     println!("{}", bubble.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod clock;
pub mod controller;
pub mod message;
pub mod render;

pub use backend::{ChatBackend, ChatReply, ChatRequest, HttpChatBackend, SendError};
pub use clock::{Clock, SystemClock, format_time, format_time_at};
pub use controller::{ChatWidget, PendingSend, Theme};
pub use message::{Message, Sender};
