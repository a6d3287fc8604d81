//! Step domain model

use crate::core::state::{PipelineState, StateError, StateField};
use std::collections::HashMap;

/// Step id of the researcher
pub const RESEARCHER: &str = "researcher";

/// Step id of the writer
pub const WRITER: &str = "writer";

/// A single agent step in a pipeline
#[derive(Debug, Clone)]
pub struct Step {
    /// Unique step identifier
    pub id: String,

    /// Human-readable description shown when the step starts
    pub description: String,

    /// Prompt template with `{{ name }}` placeholders
    pub prompt_template: String,

    /// State field the step consumes
    pub input: StateField,

    /// State field the step produces
    pub output: StateField,

    /// Timeout in seconds for one model call
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct StepDefaults {
    pub timeout_secs: u64,
}

impl Default for StepDefaults {
    fn default() -> Self {
        Self { timeout_secs: 120 }
    }
}

impl Step {
    pub fn new(
        id: impl Into<String>,
        prompt_template: impl Into<String>,
        input: StateField,
        output: StateField,
        defaults: &StepDefaults,
    ) -> Self {
        let id = id.into();
        Self {
            description: id.clone(),
            id,
            prompt_template: prompt_template.into(),
            input,
            output,
            timeout_secs: defaults.timeout_secs,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Reads the query, writes research notes
    pub fn researcher(defaults: &StepDefaults) -> Self {
        Step::new(
            RESEARCHER,
            "Facts about: {{ query }}",
            StateField::Query,
            StateField::ResearchNotes,
            defaults,
        )
        .with_description("Researcher agent gathering data")
    }

    /// Reads research notes, writes the final draft
    pub fn writer(defaults: &StepDefaults) -> Self {
        Step::new(
            WRITER,
            "Summarize: {{ research_notes }}",
            StateField::ResearchNotes,
            StateField::FinalDraft,
            defaults,
        )
        .with_description("Writer agent synthesizing summary")
    }

    /// Render the prompt with variable substitution
    pub fn render_prompt(&self, variables: &HashMap<String, String>) -> String {
        let mut prompt = self.prompt_template.clone();

        // Replace variables in the form {{ variable_name }}
        for (key, value) in variables {
            let placeholder = format!("{{{{ {} }}}}", key);
            prompt = prompt.replace(&placeholder, value);
        }

        prompt
    }

    /// Build the prompt for this step from the current state
    ///
    /// Only the step's input is substituted. Fails if the input has not been
    /// produced yet.
    pub fn prompt_for(&self, state: &PipelineState) -> Result<String, StateError> {
        let value = state.get(self.input)?;
        let variables = HashMap::from([(self.input.as_str().to_string(), value.to_string())]);
        Ok(self.render_prompt(&variables))
    }
}
