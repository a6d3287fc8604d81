//! Pipeline domain model

use crate::core::{
    state::StateField,
    step::{Step, StepDefaults},
};
use std::collections::HashSet;
use thiserror::Error;

/// Errors found while assembling a pipeline
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    #[error("pipeline '{0}' has no steps")]
    Empty(String),

    #[error("duplicate step ID: {0}")]
    DuplicateStep(String),

    #[error("step '{step}' reads '{field}' before any earlier step produces it")]
    UnsatisfiedInput { step: String, field: StateField },

    #[error("step '{step}' writes '{field}', which is already produced")]
    DuplicateOutput { step: String, field: StateField },
}

/// A linear sequence of agent steps, start to end
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    steps: Vec<Step>,
}

impl Pipeline {
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// researcher → writer
    pub fn research_and_write(defaults: &StepDefaults) -> Self {
        Self {
            name: "research-and-write".to_string(),
            steps: vec![Step::researcher(defaults), Step::writer(defaults)],
        }
    }

    /// Steps in execution order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get a step by ID
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Step IDs in execution order
    pub fn execution_order(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }
}

pub struct PipelineBuilder {
    name: String,
    steps: Vec<Step>,
}

impl PipelineBuilder {
    /// Append a step after the current last one
    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Validate the chain and build the pipeline
    ///
    /// Every step must read the query or a field written by an earlier step,
    /// and each field is written at most once.
    pub fn build(self) -> Result<Pipeline, PipelineError> {
        if self.steps.is_empty() {
            return Err(PipelineError::Empty(self.name));
        }

        let mut seen_ids = HashSet::new();
        let mut produced = HashSet::from([StateField::Query]);

        for step in &self.steps {
            if !seen_ids.insert(step.id.as_str()) {
                return Err(PipelineError::DuplicateStep(step.id.clone()));
            }

            if !produced.contains(&step.input) {
                return Err(PipelineError::UnsatisfiedInput {
                    step: step.id.clone(),
                    field: step.input,
                });
            }

            if !produced.insert(step.output) {
                return Err(PipelineError::DuplicateOutput {
                    step: step.id.clone(),
                    field: step.output,
                });
            }
        }

        Ok(Pipeline {
            name: self.name,
            steps: self.steps,
        })
    }
}
