//! The QA scenario: run the research-and-write pipeline, then check the answer

use crate::{
    agent::{self, AgentError, AgentExecutor},
    core::{
        config::{Credentials, RunConfig, API_KEY_ENV},
        Pipeline, PipelineRun,
    },
    evaluation::{
        self, AnswerRelevancyMetric, EvaluationDecision, EvaluationError, EvaluationResult,
        RelevanceCase, SkipReason,
    },
    execution::{EventHandler, ExecutionEngine, ExecutionError, ExecutionEvent},
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Shown when a run produced no draft
pub const NO_OUTPUT: &str = "No output generated";

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to set up model backend: {0}")]
    Setup(#[from] AgentError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("QA check failed: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// What happened to the relevance check
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EvaluationStatus {
    Skipped { reason: SkipReason },
    Passed { result: EvaluationResult },
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub mock: bool,
    pub run: PipelineRun,
    pub evaluation: EvaluationStatus,
}

impl ScenarioReport {
    pub fn final_output(&self) -> &str {
        final_output(&self.run)
    }
}

/// Where a failed scenario stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Setup,
    Pipeline,
    Evaluation,
}

/// Machine-readable account of a failed scenario
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename = "failed")]
pub struct FailureReport {
    pub mock: bool,
    pub stage: FailureStage,
    pub error: String,
}

impl FailureReport {
    pub fn new(mock: bool, err: &ScenarioError) -> Self {
        let stage = match err {
            ScenarioError::Setup(_) => FailureStage::Setup,
            ScenarioError::Execution(_) => FailureStage::Pipeline,
            ScenarioError::Evaluation(_) => FailureStage::Evaluation,
        };

        Self {
            mock,
            stage,
            error: err.to_string(),
        }
    }
}

/// The final draft of a run, or a placeholder if there is none
pub fn final_output(run: &PipelineRun) -> &str {
    run.state.final_draft.as_deref().unwrap_or(NO_OUTPUT)
}

/// Runs one scenario from a resolved configuration
pub struct ScenarioRunner {
    config: RunConfig,
    credentials: Credentials,
    event_handlers: Vec<EventHandler>,
}

impl ScenarioRunner {
    pub fn new(config: RunConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
            event_handlers: Vec::new(),
        }
    }

    /// Forward pipeline events to a handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn decision(&self) -> EvaluationDecision {
        EvaluationDecision::for_run(self.config.mock, &self.credentials)
    }

    /// Backend for the pipeline steps
    pub fn build_agent(&self) -> Result<Arc<dyn AgentExecutor>, ScenarioError> {
        Ok(agent::build_agent(&self.config, &self.credentials)?)
    }

    /// Judge for the relevance check, if the check will run
    pub fn build_judge(&self) -> Result<Option<Arc<dyn AgentExecutor>>, ScenarioError> {
        if !self.decision().should_run() {
            return Ok(None);
        }
        Ok(Some(evaluation::build_judge(&self.config, &self.credentials)?))
    }

    /// Run the whole scenario with backends built from the configuration
    pub async fn run(&self) -> Result<ScenarioReport, ScenarioError> {
        let agent = self.build_agent()?;
        let judge = self.build_judge()?;
        self.run_with(agent, judge).await
    }

    /// Run the whole scenario with the given backends
    pub async fn run_with<A: AgentExecutor>(
        &self,
        agent: A,
        judge: Option<Arc<dyn AgentExecutor>>,
    ) -> Result<ScenarioReport, ScenarioError> {
        let run = self.run_pipeline(agent).await?;
        let evaluation = self.evaluate(&run, judge).await?;

        Ok(ScenarioReport {
            mock: self.config.mock,
            run,
            evaluation,
        })
    }

    /// Run the research-and-write pipeline on the configured query
    pub async fn run_pipeline<A: AgentExecutor>(&self, agent: A) -> Result<PipelineRun, ScenarioError> {
        let pipeline = Pipeline::research_and_write(&self.config.step_defaults());

        let mut engine = ExecutionEngine::new(agent, self.config.retry_policy());
        for handler in &self.event_handlers {
            let handler = Arc::clone(handler);
            engine.add_event_handler(move |event| handler(event));
        }

        Ok(engine.execute(&pipeline, self.config.query.clone()).await?)
    }

    /// Check the run's answer against its query, unless the gate skips it
    pub async fn evaluate(
        &self,
        run: &PipelineRun,
        judge: Option<Arc<dyn AgentExecutor>>,
    ) -> Result<EvaluationStatus, ScenarioError> {
        if let EvaluationDecision::Skip(reason) = self.decision() {
            info!("Skipping relevance check: {}", reason);
            return Ok(EvaluationStatus::Skipped { reason });
        }

        let judge = judge.ok_or_else(|| AgentError::MissingCredential(API_KEY_ENV.to_string()))?;
        let metric = AnswerRelevancyMetric::from_config(judge, &self.config.evaluation);
        let case = RelevanceCase::new(run.state.query.clone(), final_output(run));

        let result = metric.assert_passes(&case).await?;
        Ok(EvaluationStatus::Passed { result })
    }
}
