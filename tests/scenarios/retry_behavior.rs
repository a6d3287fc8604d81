//! Test: Retry behavior - transient failures are retried with backoff

use crate::helpers::*;
use agent_qa::agent::AgentError;
use agent_qa::core::step::{RESEARCHER, WRITER};
use agent_qa::core::{Pipeline, RetryPolicy};
use agent_qa::execution::{ExecutionEngine, ExecutionError, ExecutionEvent, StepError};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Two rate limits then success finishes the step on its third attempt
#[tokio::test]
async fn test_succeeds_on_third_attempt() {
    let agent = ScriptedAgent::new(vec![
        Reply::Status(429),
        Reply::Transport,
        Reply::text("notes"),
        Reply::text("draft"),
    ]);

    let run = run_pipeline_with_agent(agent.clone(), "q").await.unwrap();

    assert_eq!(run.attempts(RESEARCHER), Some(3));
    assert_eq!(run.attempts(WRITER), Some(1));
    assert_eq!(run.state.final_draft.as_deref(), Some("draft"));
    assert_eq!(agent.calls(), 4);
}

/// Three server errors exhaust the default policy
#[tokio::test]
async fn test_exhausts_max_attempts() {
    let agent = ScriptedAgent::new(vec![
        Reply::Status(500),
        Reply::Status(502),
        Reply::Status(503),
        Reply::text("never reached"),
    ]);

    let err = run_pipeline_with_agent(agent.clone(), "q").await.unwrap_err();

    let ExecutionError::StepFailed {
        step_id,
        attempts,
        source,
    } = err;
    assert_eq!(step_id, RESEARCHER);
    assert_eq!(attempts, 3);
    assert!(matches!(
        source,
        StepError::Agent(AgentError::Api { status: 503, .. })
    ));
    assert_eq!(agent.calls(), 3);
}

/// Client errors other than 408 and 429 fail at once
#[tokio::test]
async fn test_auth_error_is_not_retried() {
    let agent = ScriptedAgent::new(vec![Reply::Status(401), Reply::text("notes")]);

    let err = run_pipeline_with_agent(agent.clone(), "q").await.unwrap_err();

    let ExecutionError::StepFailed { attempts, .. } = err;
    assert_eq!(attempts, 1);
    assert_eq!(agent.calls(), 1);
}

/// A writer failure after research stops the run at the writer
#[tokio::test]
async fn test_writer_failure_reports_writer() {
    let agent = ScriptedAgent::new(vec![Reply::text("notes"), Reply::Status(400)]);

    let err = run_pipeline_with_agent(agent.clone(), "q").await.unwrap_err();

    let ExecutionError::StepFailed { step_id, .. } = err;
    assert_eq!(step_id, WRITER);
    assert_eq!(agent.prompts()[1], "Summarize: notes");
}

/// Retry events carry the exponential backoff delays
#[tokio::test]
async fn test_retry_events_report_backoff() {
    let delays = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&delays);

    let policy = RetryPolicy {
        max_attempts: 3,
        initial_interval: Duration::from_millis(1),
        backoff_factor: 2.0,
        max_interval: Duration::from_secs(1),
    };
    let agent = ScriptedAgent::new(vec![
        Reply::Status(429),
        Reply::Status(429),
        Reply::text("notes"),
        Reply::text("draft"),
    ]);
    let pipeline = Pipeline::research_and_write(&fast_config().step_defaults());
    let engine = ExecutionEngine::new(agent, policy).with_event_handler(move |event| {
        if let ExecutionEvent::StepRetrying { attempt, delay, .. } = event {
            sink.lock().unwrap().push((*attempt, *delay));
        }
    });

    engine.execute(&pipeline, "q").await.unwrap();

    assert_eq!(
        *delays.lock().unwrap(),
        vec![
            (1, Duration::from_millis(1)),
            (2, Duration::from_millis(2)),
        ]
    );
}

/// A single-attempt policy never retries
#[tokio::test]
async fn test_no_retry_policy() {
    let agent = ScriptedAgent::new(vec![Reply::Status(429), Reply::text("notes")]);
    let pipeline = Pipeline::research_and_write(&fast_config().step_defaults());
    let engine = ExecutionEngine::new(agent.clone(), RetryPolicy::no_retry());

    let err = engine.execute(&pipeline, "q").await.unwrap_err();

    let ExecutionError::StepFailed { attempts, .. } = err;
    assert_eq!(attempts, 1);
    assert_eq!(agent.calls(), 1);
}
