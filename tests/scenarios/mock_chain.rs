//! Test: Mock chain - researcher then writer over canned responses

use crate::helpers::*;
use agent_qa::agent::{mock, MockAgent};
use agent_qa::core::config::{Credentials, DEFAULT_QUERY};
use agent_qa::core::step::{RESEARCHER, WRITER};
use agent_qa::core::ExecutionStatus;
use agent_qa::execution::ExecutionEvent;
use agent_qa::scenario::{EvaluationStatus, ScenarioRunner};
use agent_qa::evaluation::SkipReason;
use std::sync::{Arc, Mutex};

/// The default scenario ends with the second canned response
#[tokio::test]
async fn test_default_scenario_final_draft() {
    let runner = ScenarioRunner::new(fast_config(), Credentials::default());

    let report = runner.run().await.unwrap();

    assert_eq!(report.run.state.query, DEFAULT_QUERY);
    assert_eq!(
        report.final_output(),
        "Summary: AI agents are independent systems driven by LLM reasoning."
    );
    assert_eq!(report.run.status, ExecutionStatus::Completed);
}

/// Mock output does not depend on the query
#[tokio::test]
async fn test_any_query_gets_canned_summary() {
    for query in ["What is Rust?", "Explain tokio", "x"] {
        let run = run_pipeline_with_agent(MockAgent::canned(), query)
            .await
            .unwrap();

        assert_eq!(run.state.research_notes.as_deref(), Some(mock::RESEARCH_RESPONSE));
        assert_eq!(run.state.final_draft.as_deref(), Some(mock::SUMMARY_RESPONSE));
    }
}

/// Writer sees the researcher's notes, never the raw query
#[tokio::test]
async fn test_writer_runs_on_research_notes() {
    let agent = ScriptedAgent::texts(&["notes about agents", "short summary"]);

    let run = run_pipeline_with_agent(agent.clone(), "How do autonomous agents work?")
        .await
        .unwrap();

    assert_eq!(
        agent.prompts(),
        vec![
            "Facts about: How do autonomous agents work?".to_string(),
            "Summarize: notes about agents".to_string(),
        ]
    );
    assert_eq!(run.state.final_draft.as_deref(), Some("short summary"));
    let order: Vec<&str> = run.steps.iter().map(|s| s.step_id.as_str()).collect();
    assert_eq!(order, vec![RESEARCHER, WRITER]);
}

/// Step records are stamped in execution order
#[tokio::test]
async fn test_step_records_are_ordered() {
    let run = run_pipeline_with_agent(MockAgent::canned(), "q").await.unwrap();

    assert_eq!(run.steps.len(), 2);
    assert!(run.steps[0].started_at <= run.steps[0].completed_at);
    assert!(run.steps[0].completed_at <= run.steps[1].started_at);
}

/// An empty query is not rejected
#[tokio::test]
async fn test_empty_query_still_runs() {
    let agent = ScriptedAgent::texts(&["notes", "draft"]);

    let run = run_pipeline_with_agent(agent.clone(), "").await.unwrap();

    assert_eq!(run.status, ExecutionStatus::Completed);
    assert_eq!(agent.prompts()[0], "Facts about: ");
    assert_eq!(run.state.final_draft.as_deref(), Some("draft"));
}

/// The canned responses cycle when more calls are made than responses exist
#[tokio::test]
async fn test_mock_cycles_across_runs() {
    let agent = MockAgent::canned();

    run_pipeline_with_agent(agent.clone(), "first").await.unwrap();
    let second = run_pipeline_with_agent(agent.clone(), "second").await.unwrap();

    assert_eq!(agent.calls(), 4);
    assert_eq!(second.state.research_notes.as_deref(), Some(mock::RESEARCH_RESPONSE));
    assert_eq!(second.state.final_draft.as_deref(), Some(mock::SUMMARY_RESPONSE));
}

/// Runner forwards step headers to its event handlers
#[tokio::test]
async fn test_runner_reports_step_headers() {
    let headers = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&headers);

    let runner = ScenarioRunner::new(fast_config(), Credentials::default()).with_event_handler(
        move |event| {
            if let ExecutionEvent::StepStarted {
                step_number,
                description,
                ..
            } = event
            {
                sink.lock().unwrap().push(format!("{step_number}: {description}"));
            }
        },
    );

    let report = runner.run().await.unwrap();

    assert_eq!(
        report.evaluation,
        EvaluationStatus::Skipped {
            reason: SkipReason::MockMode
        }
    );
    assert_eq!(
        *headers.lock().unwrap(),
        vec![
            "1: Researcher agent gathering data".to_string(),
            "2: Writer agent synthesizing summary".to_string(),
        ]
    );
}
