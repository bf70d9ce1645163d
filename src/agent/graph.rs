//! The policy agent graph: `router -> policy_agent? -> finish`.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::{debug, info};

use crate::llm::{LlmDriver, Message, complete};

use super::legacy::PolicyLookup;

/// Reply used when the policy branch finds no policy number.
pub const NO_POLICY_NUMBER_REPLY: &str = "Sorry, I couldn't find a policy number in your request.";

static POLICY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([A-Z0-9]{6})\b").unwrap_or_else(|e| panic!("invalid policy regex: {e}"))
});

/// First standalone six-character alphanumeric token containing a digit,
/// upper-cased.
#[must_use]
pub fn extract_policy_number(text: &str) -> Option<String> {
    POLICY_NUMBER
        .captures_iter(text)
        .map(|c| c[1].to_ascii_uppercase())
        .find(|token| token.bytes().any(|b| b.is_ascii_digit()))
}

/// Data flowing through the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentState {
    pub user_message: String,
    /// Pretty-printed record from the last legacy lookup.
    pub last_api_result: Option<String>,
    pub answer: Option<String>,
}

impl AgentState {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ..Self::default()
        }
    }
}

/// Next node after the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    PolicyAgent,
    Finish,
}

/// Routing rule: any verdict mentioning "yes" needs the legacy system.
#[must_use]
pub fn route(verdict: &str) -> Route {
    if verdict.to_lowercase().contains("yes") {
        Route::PolicyAgent
    } else {
        Route::Finish
    }
}

/// Policy chatbot agent.
#[derive(Clone)]
pub struct PolicyAgent {
    llm: Arc<dyn LlmDriver>,
    legacy: Arc<dyn PolicyLookup>,
}

impl std::fmt::Debug for PolicyAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyAgent").finish_non_exhaustive()
    }
}

impl PolicyAgent {
    pub fn new(llm: Arc<dyn LlmDriver>, legacy: Arc<dyn PolicyLookup>) -> Self {
        Self { llm, legacy }
    }

    /// Run the graph for one user message and return the final state.
    pub async fn invoke(&self, user_message: impl Into<String>) -> anyhow::Result<AgentState> {
        let mut state = AgentState::new(user_message);

        self.router(&mut state).await?;
        let verdict = state.answer.take().unwrap_or_default();
        let next = route(&verdict);
        info!(name: "agent.routed", route = ?next, "Router decided");

        if next == Route::PolicyAgent {
            self.policy_agent(&mut state).await?;
        }
        self.finish(&mut state).await?;
        Ok(state)
    }

    /// Run the graph and return only the answer.
    pub async fn answer(&self, user_message: impl Into<String>) -> anyhow::Result<String> {
        let state = self.invoke(user_message).await?;
        Ok(state.answer.unwrap_or_default())
    }

    async fn router(&self, state: &mut AgentState) -> anyhow::Result<()> {
        let prompt = format!(
            "You are a routing assistant for a policy chatbot.\n\
             User said: \"{}\"\n\
             Do we need to call the legacy policy system to answer this? Answer yes or no.",
            state.user_message
        );
        let verdict = complete(self.llm.as_ref(), vec![Message::user(prompt)]).await?;
        debug!(verdict = %verdict.trim(), "Router verdict");
        state.answer = Some(verdict.trim().to_lowercase());
        Ok(())
    }

    async fn policy_agent(&self, state: &mut AgentState) -> anyhow::Result<()> {
        let Some(policy_no) = extract_policy_number(&state.user_message) else {
            state.answer = Some(NO_POLICY_NUMBER_REPLY.to_string());
            return Ok(());
        };

        let record = self.legacy.lookup(&policy_no).await?;
        let record_json = serde_json::to_string_pretty(&record)?;
        state.last_api_result = Some(record_json.clone());

        let messages = vec![
            Message::system(format!(
                "Below is a JSON record for a policy. The user asked: {}. \
                 Return only the requested information, nothing else.",
                state.user_message
            )),
            Message::user(format!("Policy JSON:\n{record_json}")),
        ];
        let answer = complete(self.llm.as_ref(), messages).await?;
        state.answer = Some(answer.trim().to_string());
        Ok(())
    }

    async fn finish(&self, state: &mut AgentState) -> anyhow::Result<()> {
        if state.answer.is_some() {
            return Ok(());
        }
        let messages = vec![
            Message::system("You are a friendly insurance chatbot."),
            Message::user(state.user_message.clone()),
        ];
        let answer = complete(self.llm.as_ref(), messages).await?;
        state.answer = Some(answer.trim().to_string());
        Ok(())
    }
}
