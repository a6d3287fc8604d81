//! Decides whether the relevance check runs for a scenario

use crate::core::config::Credentials;
use serde::Serialize;
use std::fmt;

/// Why the relevance check did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MockMode,
    MissingCredential,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MockMode => f.write_str("mock mode"),
            SkipReason::MissingCredential => f.write_str("missing API key"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationDecision {
    Run,
    Skip(SkipReason),
}

impl EvaluationDecision {
    /// Mock mode always skips, even when a credential is present
    pub fn for_run(mock: bool, credentials: &Credentials) -> Self {
        if mock {
            EvaluationDecision::Skip(SkipReason::MockMode)
        } else if !credentials.has_api_key() {
            EvaluationDecision::Skip(SkipReason::MissingCredential)
        } else {
            EvaluationDecision::Run
        }
    }

    pub fn should_run(&self) -> bool {
        matches!(self, EvaluationDecision::Run)
    }
}
