//! Test utilities for agent-qa scenarios

#![allow(dead_code)]

use agent_qa::agent::{AgentError, AgentExecutor, AgentResponse};
use agent_qa::core::config::RunConfig;
use agent_qa::core::{Pipeline, PipelineRun};
use agent_qa::execution::{ExecutionEngine, ExecutionError};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One scripted answer from a [`ScriptedAgent`]
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Status(u16),
    Transport,
}

impl Reply {
    pub fn text(s: &str) -> Self {
        Reply::Text(s.to_string())
    }
}

/// Agent that plays back a script and records every prompt it receives
///
/// Clones share the script position and the prompt log.
#[derive(Clone)]
pub struct ScriptedAgent {
    replies: Arc<Vec<Reply>>,
    index: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedAgent {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Arc::new(replies),
            index: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Reply::text(r)).collect())
    }

    pub fn calls(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentExecutor for ScriptedAgent {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn execute(&self, prompt: &str) -> Result<AgentResponse, AgentError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let idx = self.index.fetch_add(1, Ordering::SeqCst);

        match self.replies.get(idx) {
            Some(Reply::Text(text)) => Ok(AgentResponse::new(text.clone())),
            Some(Reply::Status(status)) => Err(AgentError::Api {
                status: *status,
                message: format!("scripted status {status}"),
            }),
            Some(Reply::Transport) => Err(AgentError::Transport("connection reset".to_string())),
            None => Err(AgentError::Internal(format!(
                "ScriptedAgent: No response available for request {}",
                idx + 1
            ))),
        }
    }
}

/// Judge script that rates every statement relevant
pub fn relevant_judge() -> ScriptedAgent {
    ScriptedAgent::texts(&[
        r#"{"statements": ["AI agents are independent systems.", "They are driven by LLM reasoning."]}"#,
        r#"{"verdicts": [{"verdict": "yes"}, {"verdict": "yes"}]}"#,
        r#"{"reason": "The answer explains how agents work."}"#,
    ])
}

/// Judge script that rates every statement irrelevant
pub fn irrelevant_judge() -> ScriptedAgent {
    ScriptedAgent::texts(&[
        r#"```json
{"statements": ["Bananas are yellow."]}
```"#,
        r#"{"verdicts": [{"verdict": "no", "reason": "Fruit has nothing to do with agents."}]}"#,
        r#"{"reason": "The answer talks about fruit."}"#,
    ])
}

/// Default config with backoff delays removed
pub fn fast_config() -> RunConfig {
    let mut config = RunConfig::default();
    config.retry.initial_interval_ms = 0;
    config
}

/// Live-mode variant of [`fast_config`]
pub fn live_config() -> RunConfig {
    RunConfig {
        mock: false,
        ..fast_config()
    }
}

/// Run the research-and-write pipeline with the given agent
pub async fn run_pipeline_with_agent<A: AgentExecutor>(
    agent: A,
    query: &str,
) -> Result<PipelineRun, ExecutionError> {
    let config = fast_config();
    let pipeline = Pipeline::research_and_write(&config.step_defaults());
    let engine = ExecutionEngine::new(agent, config.retry_policy());
    engine.execute(&pipeline, query).await
}
