//! OpenAI-compatible chat completions client

use crate::agent::{AgentClientConfig, AgentError, AgentExecutor, AgentResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Client for a chat completions endpoint
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: Client,
    config: AgentClientConfig,
    api_key: Option<String>,
}

impl OpenAiClient {
    /// Create a new client
    ///
    /// `api_key` is sent as a bearer token when present.
    pub fn new(config: AgentClientConfig, api_key: Option<String>) -> Result<Self, AgentError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &AgentClientConfig {
        &self.config
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url())
    }

    fn request_body<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        }
    }

    fn transport_error(&self, e: reqwest::Error) -> AgentError {
        if e.is_timeout() {
            AgentError::Timeout(self.config.timeout_secs)
        } else {
            AgentError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl AgentExecutor for OpenAiClient {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn execute(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        debug!(
            "Sending prompt ({} bytes) to {} model {}",
            prompt.len(),
            self.config.base_url(),
            self.config.model
        );

        let mut request = self
            .http
            .post(self.completions_url())
            .json(&self.request_body(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = api_error(status, &body);
            warn!("Chat completion failed: {}", err);
            return Err(err);
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("failed to decode completion: {e}")))?;

        into_agent_response(parsed)
    }
}

/// Map a non-success status and its body to an [`AgentError`]
fn api_error(status: StatusCode, body: &str) -> AgentError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                trimmed.to_string()
            }
        });

    AgentError::Api {
        status: status.as_u16(),
        message,
    }
}

fn into_agent_response(parsed: ChatResponse) -> Result<AgentResponse, AgentError> {
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AgentError::InvalidResponse("completion has no message content".to_string()))?;

    debug!("Received completion with {} bytes", content.len());

    Ok(AgentResponse {
        content,
        model: parsed.model,
        usage: parsed.usage,
    })
}
