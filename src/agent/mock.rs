//! Mock backend returning canned responses in a fixed order

use crate::agent::{AgentError, AgentExecutor, AgentResponse};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// First canned response, consumed by the researcher step
pub const RESEARCH_RESPONSE: &str =
    "Autonomous agents use LLMs to plan and execute tasks independently.";

/// Second canned response, consumed by the writer step
pub const SUMMARY_RESPONSE: &str =
    "Summary: AI agents are independent systems driven by LLM reasoning.";

/// Agent that replays a list of responses regardless of the prompt
///
/// Responses are handed out in order and wrap around to the first one once
/// the list is exhausted. Clones share the same position.
#[derive(Debug, Clone)]
pub struct MockAgent {
    responses: Arc<Vec<String>>,
    index: Arc<AtomicUsize>,
}

impl MockAgent {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(responses),
            index: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// The researcher/writer pair of canned responses
    pub fn canned() -> Self {
        Self::new(default_responses())
    }

    /// Number of prompts answered so far
    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }
}

/// Default canned responses, in the order the steps consume them
pub fn default_responses() -> Vec<String> {
    vec![RESEARCH_RESPONSE.to_string(), SUMMARY_RESPONSE.to_string()]
}

#[async_trait]
impl AgentExecutor for MockAgent {
    fn name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        if self.responses.is_empty() {
            return Err(AgentError::Internal(
                "mock agent has no responses configured".to_string(),
            ));
        }

        let call = self.index.fetch_add(1, Ordering::SeqCst);
        let response = &self.responses[call % self.responses.len()];

        debug!(
            "[MockAgent] call {} answered with {} bytes (prompt: {} bytes)",
            call + 1,
            response.len(),
            prompt.len()
        );

        Ok(AgentResponse::new(response.clone()))
    }
}
