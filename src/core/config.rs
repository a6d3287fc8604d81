//! Run configuration from defaults, YAML, and the environment

use crate::agent::{mock, AgentClientConfig};
use crate::core::{retry::RetryPolicy, step::StepDefaults};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Query used by the built-in QA scenario
pub const DEFAULT_QUERY: &str = "How do autonomous agents work?";

/// Overrides the mock/live switch (`true`/`false`)
pub const MOCK_ENV: &str = "AGENT_QA_MOCK";

/// Credential for the live backend and the relevance judge
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Overrides the live backend base URL
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid value for {name}: {value:?}")]
    InvalidEnv { name: String, value: String },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for one scenario run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Use canned responses instead of a live model
    pub mock: bool,

    /// Query fed to the researcher
    pub query: String,

    /// Responses replayed in mock mode, in order
    pub mock_responses: Vec<String>,

    pub model: ModelConfig,

    pub retry: RetryConfig,

    pub evaluation: EvaluationConfig,
}

/// Live model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub name: String,
    pub temperature: f32,
    /// Base URL of an OpenAI-compatible API (None = OpenAI)
    pub endpoint: Option<String>,
    /// Per-call timeout
    pub timeout_secs: u64,
}

/// Retry settings applied to every step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub initial_interval_ms: u64,
    pub backoff_factor: f64,
    pub max_interval_ms: u64,
}

/// Relevance evaluation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Minimum passing relevance score
    pub threshold: f64,
    /// Judge model (None = same as the pipeline model)
    pub model: Option<String>,
    /// Any score below 1.0 counts as 0.0
    pub strict: bool,
    /// Ask the judge to explain the score
    pub include_reason: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mock: true,
            query: DEFAULT_QUERY.to_string(),
            mock_responses: mock::default_responses(),
            model: ModelConfig::default(),
            retry: RetryConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        let client = AgentClientConfig::default();
        Self {
            name: client.model,
            temperature: client.temperature,
            endpoint: None,
            timeout_secs: client.timeout_secs,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_interval_ms: policy.initial_interval.as_millis() as u64,
            backoff_factor: policy.backoff_factor,
            max_interval_ms: policy.max_interval.as_millis() as u64,
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            model: None,
            strict: false,
            include_reason: true,
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string; missing keys take defaults
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.mock && self.mock_responses.is_empty() {
            return Err(ConfigError::Invalid(
                "mock mode needs at least one mock response".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if !(self.retry.backoff_factor >= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "retry.backoff_factor must be >= 1.0, got {}",
                self.retry.backoff_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.evaluation.threshold) {
            return Err(ConfigError::Invalid(format!(
                "evaluation.threshold must be within 0.0..=1.0, got {}",
                self.evaluation.threshold
            )));
        }
        Ok(())
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(MOCK_ENV) {
            self.mock = parse_bool(&value).ok_or_else(|| ConfigError::InvalidEnv {
                name: MOCK_ENV.to_string(),
                value: value.clone(),
            })?;
        }

        if let Some(url) = lookup(BASE_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.model.endpoint = Some(url);
        }

        Ok(())
    }

    /// Client settings for the pipeline model
    pub fn agent_client_config(&self) -> AgentClientConfig {
        let mut config = AgentClientConfig::new()
            .with_model(self.model.name.clone())
            .with_temperature(self.model.temperature)
            .with_timeout(self.model.timeout_secs);
        if let Some(endpoint) = &self.model.endpoint {
            config = config.with_endpoint(endpoint.clone());
        }
        config
    }

    /// Client settings for the relevance judge
    pub fn judge_client_config(&self) -> AgentClientConfig {
        let config = self.agent_client_config();
        match &self.evaluation.model {
            Some(model) => config.with_model(model.clone()),
            None => config,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            initial_interval: Duration::from_millis(self.retry.initial_interval_ms),
            backoff_factor: self.retry.backoff_factor,
            max_interval: Duration::from_millis(self.retry.max_interval_ms),
        }
    }

    pub fn step_defaults(&self) -> StepDefaults {
        StepDefaults {
            timeout_secs: self.model.timeout_secs,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Secrets read from the environment, never serialized
#[derive(Clone, Default)]
pub struct Credentials {
    openai_api_key: Option<String>,
}

impl Credentials {
    pub fn new(openai_api_key: Option<String>) -> Self {
        Self {
            openai_api_key: openai_api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var(API_KEY_ENV).ok())
    }

    /// The API key, if set and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}
