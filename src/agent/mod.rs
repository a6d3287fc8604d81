//! Language model backends for agent steps

pub mod client;
pub mod mock;
pub mod openai;
pub mod response;

use crate::core::config::{Credentials, RunConfig};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub use client::AgentClientConfig;
pub use mock::MockAgent;
pub use openai::OpenAiClient;
pub use response::{AgentError, AgentResponse, TokenUsage};

/// Trait for agent execution - allows for different implementations
#[async_trait]
pub trait AgentExecutor: Send + Sync {
    /// Short backend label used in logs
    fn name(&self) -> &str;

    /// Send a prompt and wait for the full response
    async fn execute(&self, prompt: &str) -> Result<AgentResponse, AgentError>;
}

#[async_trait]
impl<T: AgentExecutor + ?Sized> AgentExecutor for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn execute(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        (**self).execute(prompt).await
    }
}

/// Build the model backend selected by the run configuration
///
/// Mock mode returns a fresh [`MockAgent`] over the configured canned
/// responses, so every run starts from the first response. Live mode talks to
/// an OpenAI-compatible endpoint; the credential is optional there because
/// local servers accept unauthenticated requests.
pub fn build_agent(
    config: &RunConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn AgentExecutor>, AgentError> {
    if config.mock {
        info!("Using mock backend with {} canned responses", config.mock_responses.len());
        return Ok(Arc::new(MockAgent::new(config.mock_responses.clone())));
    }

    let client_config = config.agent_client_config();
    info!("Using live backend {} at {}", client_config.model, client_config.base_url());
    let client = OpenAiClient::new(client_config, credentials.api_key().map(str::to_string))?;
    Ok(Arc::new(client))
}
