//! agent-qa - a research-and-write agent pipeline with an answer relevance check

pub mod agent;
pub mod cli;
pub mod core;
pub mod evaluation;
pub mod execution;
pub mod scenario;

// Re-export commonly used types
pub use agent::{AgentClientConfig, AgentError, AgentExecutor, AgentResponse, MockAgent, OpenAiClient};
pub use crate::core::config::{Credentials, RunConfig};
pub use crate::core::{ExecutionStatus, Pipeline, PipelineRun, PipelineState, RetryPolicy, Step};
pub use evaluation::{AnswerRelevancyMetric, EvaluationDecision, EvaluationError, SkipReason};
pub use execution::{ExecutionEngine, ExecutionError, ExecutionEvent};
pub use scenario::{EvaluationStatus, FailureReport, ScenarioError, ScenarioReport, ScenarioRunner};
