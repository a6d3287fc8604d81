//! CLI output formatting

use crate::{
    core::ExecutionStatus,
    evaluation::{EvaluationResult, SkipReason},
    execution::ExecutionEvent,
    scenario::EvaluationStatus,
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Width of the rule under the test header
const RULE_WIDTH: usize = 40;

/// Banner naming the backend in use
pub fn mode_banner(mock: bool, model: &str) -> String {
    if mock {
        format!(
            "{}{}",
            INFO,
            style("MOCK MODE: Simulating LLM responses (Free)").yellow()
        )
    } else {
        format!(
            "{}{} ({})",
            ROCKET,
            style("PRODUCTION MODE: Connecting to OpenAI").green(),
            style(model).dim()
        )
    }
}

/// Header printed before the pipeline starts
pub fn test_header(query: &str) -> String {
    format!(
        "\n{} Query: {}\n{}",
        style("[TEST START]").bold(),
        query,
        "=".repeat(RULE_WIDTH)
    )
}

pub fn format_final_output(output: &str) -> String {
    format!("\n{} {}", style("FINAL AGENT OUTPUT:").bold(), output)
}

pub fn validation_header() -> String {
    format!("\n--- {}Validating Accuracy ---", CHECK)
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::PipelineStarted {
            run_id,
            pipeline_name,
            ..
        } => format!(
            "{} Starting pipeline {} ({})",
            ROCKET,
            style(pipeline_name).bold(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::StepStarted {
            step_id,
            step_number,
            description,
            attempt,
        } => {
            if *attempt > 1 {
                format!(
                    "{} {} (attempt {})",
                    SPINNER,
                    style(step_id).cyan(),
                    style(attempt).dim()
                )
            } else {
                format!("\n--- Step {}: {} ---", step_number, description)
            }
        }
        ExecutionEvent::StepRetrying {
            step_id,
            attempt,
            max_attempts,
            delay,
            error,
        } => format!(
            "{} {} attempt {}/{} failed: {} (retrying in {:.1}s)",
            WARN,
            style(step_id).yellow(),
            attempt,
            max_attempts,
            style(error).dim(),
            delay.as_secs_f64()
        ),
        ExecutionEvent::StepOutput { step_id, output } => {
            format!(
                "{} Output from {}:\n{}",
                INFO,
                style(step_id).dim(),
                format_output(output, 5)
            )
        }
        ExecutionEvent::StepCompleted { step_id, attempts } => {
            if *attempts > 1 {
                format!(
                    "{} {} ({} attempts)",
                    CHECK,
                    style(step_id).green(),
                    attempts
                )
            } else {
                format!("{} {}", CHECK, style(step_id).green())
            }
        }
        ExecutionEvent::StepFailed {
            step_id,
            attempts,
            error,
        } => format!(
            "{} {} after {} attempt(s): {}",
            CROSS,
            style(step_id).red(),
            attempts,
            style(error).dim()
        ),
        ExecutionEvent::PipelineCompleted { run_id, status } => format!(
            "{} Pipeline ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(*status)
        ),
    }
}

/// Result line of the relevance check
pub fn format_qa_status(status: &EvaluationStatus) -> String {
    match status {
        EvaluationStatus::Skipped { reason } => format_qa_skipped(*reason),
        EvaluationStatus::Passed { result } => format_qa_passed(result),
    }
}

fn format_qa_skipped(reason: SkipReason) -> String {
    format!(
        "\n{}QA Check: {} ({})",
        INFO,
        style("Skipped").yellow(),
        reason
    )
}

fn format_qa_passed(result: &EvaluationResult) -> String {
    let mut line = format!(
        "{}QA Check: {} (relevancy {:.2} >= {:.2})",
        CHECK,
        style("PASSED").green().bold(),
        result.score,
        result.threshold
    );
    if let Some(reason) = &result.reason {
        line.push_str(&format!("\n   {}", style(reason).dim()));
    }
    line
}

pub fn format_qa_failed(error: &impl std::fmt::Display) -> String {
    format!("{}QA Check: {} {}", CROSS, style("FAILED").red().bold(), error)
}

/// Format step output with truncation
pub fn format_output(output: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = output.lines().collect();

    if lines.len() <= max_lines {
        output.to_string()
    } else {
        let truncated = lines[..max_lines].join("\n");
        format!(
            "{}\n{}... ({} more lines)",
            truncated,
            style("[truncated]").dim(),
            lines.len() - max_lines
        )
    }
}
