//! Agent client configuration

/// Base URL used when no endpoint override is configured
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Configuration for the live agent client
#[derive(Debug, Clone, PartialEq)]
pub struct AgentClientConfig {
    /// Base URL of an OpenAI-compatible API
    ///
    /// If not provided, defaults to [`DEFAULT_BASE_URL`].
    pub endpoint: Option<String>,

    /// Chat model name
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Timeout for requests in seconds
    pub timeout_secs: u64,
}

impl Default for AgentClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: "gpt-4o".to_string(),
            temperature: 0.0,
            timeout_secs: 60,
        }
    }
}

impl AgentClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Effective base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.endpoint
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
    }
}
