//! Answer relevancy metric scored by a judge model
//!
//! The judge splits the answer into statements, then rules on each one:
//! `yes` (relevant to the input), `no` (irrelevant) or `idk` (supporting
//! detail). The score is the share of statements not ruled irrelevant.

use crate::agent::{AgentError, AgentExecutor};
use crate::core::config::EvaluationConfig;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("judge call failed: {0}")]
    Agent(#[from] AgentError),

    #[error("judge returned malformed {stage} output: {message}")]
    MalformedJudgeOutput { stage: &'static str, message: String },

    #[error("relevance score {score:.2} is below threshold {threshold:.2}{}", reason_suffix(.reason))]
    BelowThreshold {
        score: f64,
        threshold: f64,
        reason: Option<String>,
    },
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(": {r}"))
        .unwrap_or_default()
}

/// The question asked and the answer produced for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceCase {
    pub input: String,
    pub actual_output: String,
}

impl RelevanceCase {
    pub fn new(input: impl Into<String>, actual_output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            actual_output: actual_output.into(),
        }
    }
}

/// Judge ruling on one statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementVerdict {
    /// `yes`, `no` or `idk`
    pub verdict: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl StatementVerdict {
    pub fn is_irrelevant(&self) -> bool {
        self.verdict.trim().eq_ignore_ascii_case("no")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub score: f64,
    pub threshold: f64,
    pub success: bool,
    pub reason: Option<String>,
    pub statements: Vec<String>,
    pub verdicts: Vec<StatementVerdict>,
}

#[derive(Deserialize)]
struct StatementsReply {
    statements: Vec<String>,
}

#[derive(Deserialize)]
struct VerdictsReply {
    verdicts: Vec<StatementVerdict>,
}

#[derive(Debug, Deserialize)]
struct ReasonReply {
    reason: String,
}

/// Scores how well an answer addresses its question
pub struct AnswerRelevancyMetric<J> {
    judge: J,
    threshold: f64,
    strict: bool,
    include_reason: bool,
}

impl<J: AgentExecutor> AnswerRelevancyMetric<J> {
    pub fn new(judge: J, threshold: f64) -> Self {
        Self {
            judge,
            threshold,
            strict: false,
            include_reason: true,
        }
    }

    pub fn from_config(judge: J, config: &EvaluationConfig) -> Self {
        Self::new(judge, config.threshold)
            .with_strict(config.strict)
            .with_include_reason(config.include_reason)
    }

    /// Strict mode requires a perfect score
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_include_reason(mut self, include_reason: bool) -> Self {
        self.include_reason = include_reason;
        self
    }

    pub fn threshold(&self) -> f64 {
        if self.strict {
            1.0
        } else {
            self.threshold
        }
    }

    /// Score the case without judging pass or fail
    pub async fn measure(&self, case: &RelevanceCase) -> Result<EvaluationResult, EvaluationError> {
        info!("Measuring answer relevancy with judge {}", self.judge.name());

        let statements = self
            .ask::<StatementsReply>("statements", &statements_prompt(&case.actual_output))
            .await?
            .statements;
        debug!("Judge extracted {} statements", statements.len());

        let verdicts = if statements.is_empty() {
            Vec::new()
        } else {
            let verdicts = self
                .ask::<VerdictsReply>("verdicts", &verdicts_prompt(&case.input, &statements)?)
                .await?
                .verdicts;
            if verdicts.len() != statements.len() {
                warn!(
                    "Judge returned {} verdicts for {} statements",
                    verdicts.len(),
                    statements.len()
                );
            }
            verdicts
        };

        let score = score_verdicts(&verdicts, self.strict);
        let threshold = self.threshold();

        let reason = if self.include_reason {
            let prompt = reason_prompt(&case.input, score, &verdicts);
            Some(self.ask::<ReasonReply>("reason", &prompt).await?.reason)
        } else {
            None
        };

        info!("Answer relevancy score: {:.2} (threshold {:.2})", score, threshold);

        Ok(EvaluationResult {
            score,
            threshold,
            success: score >= threshold,
            reason,
            statements,
            verdicts,
        })
    }

    /// Score the case and fail if it falls below the threshold
    pub async fn assert_passes(
        &self,
        case: &RelevanceCase,
    ) -> Result<EvaluationResult, EvaluationError> {
        let result = self.measure(case).await?;
        if result.success {
            Ok(result)
        } else {
            Err(EvaluationError::BelowThreshold {
                score: result.score,
                threshold: result.threshold,
                reason: result.reason,
            })
        }
    }

    async fn ask<T: DeserializeOwned>(
        &self,
        stage: &'static str,
        prompt: &str,
    ) -> Result<T, EvaluationError> {
        let response = self.judge.execute(prompt).await?;
        debug!("Judge {} output: {}", stage, response.content);
        parse_judge_json(stage, &response.content)
    }
}

/// Share of verdicts that are not `no`; an answer with no statements scores 1.0
pub fn score_verdicts(verdicts: &[StatementVerdict], strict: bool) -> f64 {
    if verdicts.is_empty() {
        return 1.0;
    }

    let relevant = verdicts.iter().filter(|v| !v.is_irrelevant()).count();
    let score = relevant as f64 / verdicts.len() as f64;

    if strict && score < 1.0 {
        0.0
    } else {
        score
    }
}

/// Strip a Markdown code fence around judge output, if there is one
fn strip_code_fence(text: &str) -> &str {
    static FENCED_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?s)```(?:json)?\s*(.*?)```").expect("valid regex")
    });

    FENCED_RE
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(text)
}

/// Decode the first JSON object of the expected shape in judge output
///
/// Each `{` is tried in order and only one value is read from it, so prose
/// or further objects after the match are ignored.
fn parse_judge_json<T: DeserializeOwned>(
    stage: &'static str,
    text: &str,
) -> Result<T, EvaluationError> {
    let body = strip_code_fence(text);
    let mut first_error = None;

    for (start, _) in body.match_indices('{') {
        let mut values = serde_json::Deserializer::from_str(&body[start..]).into_iter::<T>();
        match values.next() {
            Some(Ok(value)) => return Ok(value),
            Some(Err(e)) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
            None => {}
        }
    }

    Err(EvaluationError::MalformedJudgeOutput {
        stage,
        message: first_error.unwrap_or_else(|| "no JSON object found".to_string()),
    })
}

fn statements_prompt(actual_output: &str) -> String {
    format!(
        "Break the following text into a list of standalone statements. \
Drop fragments that carry no meaning on their own.\n\n\
Return only JSON of the form {{\"statements\": [\"...\"]}}.\n\n\
Text:\n{actual_output}"
    )
}

fn verdicts_prompt(input: &str, statements: &[String]) -> Result<String, EvaluationError> {
    let listed = serde_json::to_string_pretty(statements).map_err(|e| {
        EvaluationError::MalformedJudgeOutput {
            stage: "statements",
            message: e.to_string(),
        }
    })?;

    Ok(format!(
        "For each statement, decide whether it is relevant to answering the input. \
Use \"yes\" when it is relevant, \"no\" when it is irrelevant and \"idk\" when it is \
supporting detail that is neither. Give a reason for every \"no\".\n\n\
Return only JSON of the form {{\"verdicts\": [{{\"verdict\": \"yes\", \"reason\": null}}]}} \
with exactly one verdict per statement, in order.\n\n\
Input:\n{input}\n\nStatements:\n{listed}"
    ))
}

fn reason_prompt(input: &str, score: f64, verdicts: &[StatementVerdict]) -> String {
    let irrelevant: Vec<&str> = verdicts
        .iter()
        .filter(|v| v.is_irrelevant())
        .filter_map(|v| v.reason.as_deref())
        .collect();

    format!(
        "An answer to the input below scored {score:.2} for relevancy (0 to 1). \
Explain the score in one sentence, citing the irrelevant statements if any.\n\n\
Return only JSON of the form {{\"reason\": \"...\"}}.\n\n\
Input:\n{input}\n\nReasons statements were irrelevant:\n{}",
        if irrelevant.is_empty() {
            "(none)".to_string()
        } else {
            irrelevant.join("\n")
        }
    )
}
