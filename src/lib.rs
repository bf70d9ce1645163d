//! Policy Chat
//!
//! A chat widget for an insurance-policy assistant, the backend it talks to,
//! and a terminal front end.
//!
//! # Architecture
//!
//! - **Widget**: owned transcript + typing/theme state, one JSON POST per send
//! - **Server**: Axum app serving the widget page and `POST /chat`
//! - **Agent**: router / policy lookup / finish graph over an LLM
//! - **LLM**: OpenAI-compatible streaming driver (works against Ollama)
//!
//! # Modules
//!
//! - [`widget`]: chat widget controller, backend client and renderers
//! - [`agent`]: policy chatbot graph and legacy lookup
//! - [`llm`]: LLM driver trait and implementation
//! - [`normalized`]: driver event model
//! - [`server`]: HTTP routes
//! - [`terminal`]: console chat loop

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]

pub mod agent;
pub mod config;
pub mod llm;
pub mod normalized;
pub mod server;
pub mod telemetry;
pub mod terminal;
pub mod widget;

use std::sync::Arc;

use crate::agent::PolicyAgent;
use crate::config::AppConfig;

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Agent answering `/chat` requests.
    pub agent: PolicyAgent,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
