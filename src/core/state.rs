//! Pipeline state and run records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// How a pipeline run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Every step finished
    Completed,
    /// A step gave up
    Failed,
}

/// A named slot in [`PipelineState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateField {
    Query,
    ResearchNotes,
    FinalDraft,
}

impl StateField {
    /// Variable name used in prompt templates
    pub fn as_str(&self) -> &'static str {
        match self {
            StateField::Query => "query",
            StateField::ResearchNotes => "research_notes",
            StateField::FinalDraft => "final_draft",
        }
    }
}

impl fmt::Display for StateField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from reading or writing state fields
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    #[error("state field '{0}' has not been produced yet")]
    MissingField(StateField),

    #[error("state field '{0}' is already set")]
    AlreadySet(StateField),
}

/// The data flowing through a run: query, then notes, then draft
///
/// Fields are only ever added. Once a field is recorded it cannot be
/// replaced or cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineState {
    pub query: String,
    pub research_notes: Option<String>,
    pub final_draft: Option<String>,
}

impl PipelineState {
    /// Create a fresh state for one run
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            research_notes: None,
            final_draft: None,
        }
    }

    /// Read a field, failing if no earlier step produced it
    pub fn get(&self, field: StateField) -> Result<&str, StateError> {
        match field {
            StateField::Query => Some(self.query.as_str()),
            StateField::ResearchNotes => self.research_notes.as_deref(),
            StateField::FinalDraft => self.final_draft.as_deref(),
        }
        .ok_or(StateError::MissingField(field))
    }

    /// Whether a field holds a value
    pub fn has(&self, field: StateField) -> bool {
        self.get(field).is_ok()
    }

    /// Record a step output, consuming and returning the state
    pub fn record(mut self, field: StateField, value: String) -> Result<Self, StateError> {
        let slot = match field {
            StateField::Query => return Err(StateError::AlreadySet(field)),
            StateField::ResearchNotes => &mut self.research_notes,
            StateField::FinalDraft => &mut self.final_draft,
        };

        if slot.is_some() {
            return Err(StateError::AlreadySet(field));
        }
        *slot = Some(value);

        Ok(self)
    }
}

/// Timing and attempt count for one finished step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub step_id: String,
    pub attempts: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Outcome of one pipeline execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineRun {
    /// Unique execution ID
    pub run_id: Uuid,

    pub pipeline_name: String,

    pub status: ExecutionStatus,

    /// Final state after the last step
    pub state: PipelineState,

    /// Finished steps in execution order
    pub steps: Vec<StepRecord>,
}

impl PipelineRun {
    /// Attempts used by a step, if it finished
    pub fn attempts(&self, step_id: &str) -> Option<usize> {
        self.steps
            .iter()
            .find(|record| record.step_id == step_id)
            .map(|record| record.attempts)
    }
}
