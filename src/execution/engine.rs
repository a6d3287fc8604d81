//! Main execution engine - drives a pipeline from start to end

use crate::{
    agent::AgentExecutor,
    core::{ExecutionStatus, Pipeline, PipelineRun, PipelineState, RetryPolicy, Step, StepRecord},
    execution::{StepError, StepExecutor},
};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during pipeline execution
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        pipeline_name: String,
        query: String,
    },
    StepStarted {
        step_id: String,
        /// 1-based position in the pipeline
        step_number: usize,
        description: String,
        attempt: usize,
    },
    StepRetrying {
        step_id: String,
        attempt: usize,
        max_attempts: usize,
        delay: Duration,
        error: String,
    },
    StepOutput {
        step_id: String,
        output: String,
    },
    StepCompleted {
        step_id: String,
        attempts: usize,
    },
    StepFailed {
        step_id: String,
        attempts: usize,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("step '{step_id}' failed after {attempts} attempt(s): {source}")]
    StepFailed {
        step_id: String,
        attempts: usize,
        #[source]
        source: StepError,
    },
}

/// Runs the steps of a pipeline in order, retrying failed model calls
pub struct ExecutionEngine<A> {
    executor: StepExecutor<A>,
    retry: RetryPolicy,
    event_handlers: Vec<EventHandler>,
}

impl<A: AgentExecutor> ExecutionEngine<A> {
    pub fn new(agent: A, retry: RetryPolicy) -> Self {
        Self {
            executor: StepExecutor::new(agent),
            retry,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.add_event_handler(handler);
        self
    }

    pub fn agent(&self) -> &A {
        self.executor.agent()
    }

    fn emit(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    /// Execute the entire pipeline for one query
    ///
    /// The query is not validated; an empty query runs like any other.
    pub async fn execute(
        &self,
        pipeline: &Pipeline,
        query: impl Into<String>,
    ) -> Result<PipelineRun, ExecutionError> {
        let run_id = Uuid::new_v4();
        let query = query.into();

        info!("Starting pipeline execution: {} ({})", pipeline.name, run_id);
        if query.trim().is_empty() {
            warn!("Query is empty; running pipeline anyway");
        }

        self.emit(ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name: pipeline.name.clone(),
            query: query.clone(),
        });

        let mut state = PipelineState::new(query);
        let mut records = Vec::with_capacity(pipeline.steps().len());

        for (index, step) in pipeline.steps().iter().enumerate() {
            match self.execute_step(index + 1, step, state).await {
                Ok((next_state, record)) => {
                    state = next_state;
                    records.push(record);
                }
                Err(err) => {
                    error!("Pipeline {} failed: {}", pipeline.name, err);
                    self.emit(ExecutionEvent::PipelineCompleted {
                        run_id,
                        status: ExecutionStatus::Failed,
                    });
                    return Err(err);
                }
            }
        }

        info!(
            "Pipeline execution finished: {} - {:?}",
            pipeline.name,
            ExecutionStatus::Completed
        );
        self.emit(ExecutionEvent::PipelineCompleted {
            run_id,
            status: ExecutionStatus::Completed,
        });

        Ok(PipelineRun {
            run_id,
            pipeline_name: pipeline.name.clone(),
            status: ExecutionStatus::Completed,
            state,
            steps: records,
        })
    }

    /// Execute a single step, retrying per the policy
    async fn execute_step(
        &self,
        step_number: usize,
        step: &Step,
        state: PipelineState,
    ) -> Result<(PipelineState, StepRecord), ExecutionError> {
        let started_at = Utc::now();
        let mut attempt = 1;

        loop {
            self.emit(ExecutionEvent::StepStarted {
                step_id: step.id.clone(),
                step_number,
                description: step.description.clone(),
                attempt,
            });

            match self.executor.execute(step, &state).await {
                Ok(output) => {
                    let state = state
                        .record(step.output, output.clone())
                        .map_err(|e| self.fail(step, attempt, e.into()))?;

                    self.emit(ExecutionEvent::StepOutput {
                        step_id: step.id.clone(),
                        output,
                    });
                    self.emit(ExecutionEvent::StepCompleted {
                        step_id: step.id.clone(),
                        attempts: attempt,
                    });
                    info!("Step {} completed after {} attempt(s)", step.id, attempt);

                    let record = StepRecord {
                        step_id: step.id.clone(),
                        attempts: attempt,
                        started_at,
                        completed_at: Utc::now(),
                    };
                    return Ok((state, record));
                }
                Err(err) if err.is_retryable() && self.retry.allows_retry_after(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    warn!(
                        "Step {} attempt {}/{} failed: {}; retrying in {:?}",
                        step.id, attempt, self.retry.max_attempts, err, delay
                    );
                    self.emit(ExecutionEvent::StepRetrying {
                        step_id: step.id.clone(),
                        attempt,
                        max_attempts: self.retry.max_attempts,
                        delay,
                        error: err.to_string(),
                    });

                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(self.fail(step, attempt, err)),
            }
        }
    }

    fn fail(&self, step: &Step, attempts: usize, source: StepError) -> ExecutionError {
        error!("Step {} failed after {} attempt(s): {}", step.id, attempts, source);
        self.emit(ExecutionEvent::StepFailed {
            step_id: step.id.clone(),
            attempts,
            error: source.to_string(),
        });

        ExecutionError::StepFailed {
            step_id: step.id.clone(),
            attempts,
            source,
        }
    }
}
