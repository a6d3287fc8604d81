//! Test: Evaluation gate - the relevance check only runs live with a key

use crate::helpers::*;
use agent_qa::agent::{AgentExecutor, MockAgent};
use agent_qa::core::config::Credentials;
use agent_qa::evaluation::{EvaluationError, SkipReason};
use agent_qa::scenario::{EvaluationStatus, ScenarioError, ScenarioRunner};
use std::sync::Arc;

fn with_key() -> Credentials {
    Credentials::new(Some("sk-test".to_string()))
}

/// Mock mode skips the check even with a key, and never calls the judge
#[tokio::test]
async fn test_mock_mode_skips_with_key() {
    let judge = relevant_judge();
    let runner = ScenarioRunner::new(fast_config(), with_key());

    let report = runner
        .run_with(MockAgent::canned(), Some(Arc::new(judge.clone()) as Arc<dyn AgentExecutor>))
        .await
        .unwrap();

    assert_eq!(
        report.evaluation,
        EvaluationStatus::Skipped {
            reason: SkipReason::MockMode
        }
    );
    assert_eq!(judge.calls(), 0);
}

/// Live mode without a key still runs the pipeline but skips the check
#[tokio::test]
async fn test_live_without_key_skips() {
    let agent = ScriptedAgent::texts(&["notes", "draft"]);
    let runner = ScenarioRunner::new(live_config(), Credentials::new(Some(String::new())));

    assert!(runner.build_judge().unwrap().is_none());
    let report = runner.run_with(agent, None).await.unwrap();

    assert!(!report.mock);
    assert_eq!(report.final_output(), "draft");
    assert_eq!(
        report.evaluation,
        EvaluationStatus::Skipped {
            reason: SkipReason::MissingCredential
        }
    );
}

/// Live mode with a key scores the final draft against the query
#[tokio::test]
async fn test_live_with_key_passes() {
    let judge = relevant_judge();
    let agent = ScriptedAgent::texts(&[
        "Agents plan with LLMs.",
        "Summary: AI agents are independent systems driven by LLM reasoning.",
    ]);
    let runner = ScenarioRunner::new(live_config(), with_key());

    let report = runner
        .run_with(agent, Some(Arc::new(judge.clone()) as Arc<dyn AgentExecutor>))
        .await
        .unwrap();

    let EvaluationStatus::Passed { result } = report.evaluation else {
        panic!("expected the relevance check to run");
    };
    assert_eq!(result.score, 1.0);
    assert_eq!(result.threshold, 0.5);
    assert!(result.success);

    let prompts = judge.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("Summary: AI agents are independent systems"));
    assert!(prompts[1].contains("How do autonomous agents work?"));
}

/// An irrelevant answer fails the run
#[tokio::test]
async fn test_irrelevant_answer_fails() {
    let agent = ScriptedAgent::texts(&["notes", "Bananas are yellow."]);
    let runner = ScenarioRunner::new(live_config(), with_key());

    let err = runner
        .run_with(agent, Some(Arc::new(irrelevant_judge()) as Arc<dyn AgentExecutor>))
        .await
        .unwrap_err();

    match err {
        ScenarioError::Evaluation(EvaluationError::BelowThreshold {
            score,
            threshold,
            reason,
        }) => {
            assert_eq!(score, 0.0);
            assert_eq!(threshold, 0.5);
            assert_eq!(reason.as_deref(), Some("The answer talks about fruit."));
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// A higher threshold turns a partial score into a failure
#[tokio::test]
async fn test_threshold_from_config() {
    let judge = ScriptedAgent::texts(&[
        r#"{"statements": ["a", "b"]}"#,
        r#"{"verdicts": [{"verdict": "yes"}, {"verdict": "no", "reason": "off topic"}]}"#,
    ]);
    let mut config = live_config();
    config.evaluation.threshold = 0.75;
    config.evaluation.include_reason = false;
    let runner = ScenarioRunner::new(config, with_key());

    let err = runner
        .run_with(
            ScriptedAgent::texts(&["notes", "draft"]),
            Some(Arc::new(judge) as Arc<dyn AgentExecutor>),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScenarioError::Evaluation(EvaluationError::BelowThreshold { score, .. }) if score == 0.5
    ));
}
