//! Step executor - runs individual steps with the agent

use crate::{
    agent::{AgentError, AgentExecutor},
    core::{PipelineState, StateError, Step},
};
use thiserror::Error;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// Why a single step attempt failed
#[derive(Debug, Error)]
pub enum StepError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Agent(#[from] AgentError),
}

impl StepError {
    /// State errors are programming mistakes and never retried
    pub fn is_retryable(&self) -> bool {
        match self {
            StepError::State(_) => false,
            StepError::Agent(err) => err.is_retryable(),
        }
    }
}

/// Executes a single step
pub struct StepExecutor<A> {
    agent: A,
}

impl<A: AgentExecutor> StepExecutor<A> {
    pub fn new(agent: A) -> Self {
        Self { agent }
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// Run one attempt of a step and return the model's answer
    ///
    /// The state is only read here; recording the answer is up to the caller.
    pub async fn execute(&self, step: &Step, state: &PipelineState) -> Result<String, StepError> {
        info!("Executing step: {} via {}", step.id, self.agent.name());

        let prompt = step.prompt_for(state)?;
        debug!("Prompt for step {}: {}", step.id, prompt);

        let timeout_duration = Duration::from_secs(step.timeout_secs);
        let response = match timeout(timeout_duration, self.agent.execute(&prompt)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!("Agent error for step {}: {}", step.id, e);
                return Err(e.into());
            }
            Err(_) => {
                warn!("Timeout for step {} after {}s", step.id, step.timeout_secs);
                return Err(AgentError::Timeout(step.timeout_secs).into());
            }
        };

        debug!("Agent response for step {}: {}", step.id, response.content);
        if let Some(usage) = &response.usage {
            debug!(
                "Step {} used {} prompt + {} completion tokens",
                step.id, usage.prompt_tokens, usage.completion_tokens
            );
        }

        Ok(response.content)
    }
}
