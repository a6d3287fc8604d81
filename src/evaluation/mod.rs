//! Post-run answer quality checks

pub mod gate;
pub mod metric;

use crate::agent::{AgentError, AgentExecutor, OpenAiClient};
use crate::core::config::{Credentials, RunConfig, API_KEY_ENV};
use std::sync::Arc;

pub use gate::{EvaluationDecision, SkipReason};
pub use metric::{
    AnswerRelevancyMetric, EvaluationError, EvaluationResult, RelevanceCase, StatementVerdict,
};

/// Build the judge model used by the relevance metric
///
/// The judge always talks to the live backend, so it needs a credential.
pub fn build_judge(
    config: &RunConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn AgentExecutor>, AgentError> {
    let api_key = credentials
        .api_key()
        .ok_or_else(|| AgentError::MissingCredential(API_KEY_ENV.to_string()))?;

    let client = OpenAiClient::new(config.judge_client_config(), Some(api_key.to_string()))?;
    Ok(Arc::new(client))
}
