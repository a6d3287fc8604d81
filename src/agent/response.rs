//! Agent response types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for agent operations
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentError {
    /// Whether another attempt could plausibly succeed
    ///
    /// Rate limits, server errors, timeouts and broken connections are
    /// transient. Client errors such as a rejected key are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            AgentError::Api { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            AgentError::Timeout(_) | AgentError::Transport(_) | AgentError::InvalidResponse(_) => {
                true
            }
            AgentError::MissingCredential(_) | AgentError::Internal(_) => false,
        }
    }
}

/// Response from the agent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The response content
    pub content: String,

    /// Model that produced the response (if reported)
    pub model: Option<String>,

    /// Token usage information (if available)
    pub usage: Option<TokenUsage>,
}

impl AgentResponse {
    /// Create a new agent response
    pub fn new(content: String) -> Self {
        Self {
            content,
            model: None,
            usage: None,
        }
    }
}

/// Token usage information
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}
