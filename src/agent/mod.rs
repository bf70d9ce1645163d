//! Insurance policy chatbot agent.
//!
//! A three-node graph decides whether a question needs the legacy policy
//! system, looks the policy up when it does, and phrases the answer with the
//! LLM.
//!
//! ```text
//! router ──"yes"──▶ policy_agent ──▶ finish
//!    └────────────────────────────────▲
//! ```
//!
//! - [`graph`]: agent state, nodes and routing
//! - [`legacy`]: policy record lookup

pub mod graph;
pub mod legacy;

pub use graph::{AgentState, NO_POLICY_NUMBER_REPLY, PolicyAgent, Route, extract_policy_number};
pub use legacy::{Coverage, DummyLegacyApi, PolicyLookup, PolicyRecord};

use crate::widget::{ChatBackend, SendError};

/// Lets the terminal client talk to the agent without an HTTP hop.
#[async_trait::async_trait]
impl ChatBackend for PolicyAgent {
    async fn send(&self, message: &str) -> Result<String, SendError> {
        self.answer(message)
            .await
            .map_err(|e| SendError::Backend(format!("Error: {e}")))
    }
}
