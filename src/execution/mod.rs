//! Pipeline execution engine

pub mod engine;
pub mod executor;

pub use engine::{EventHandler, ExecutionEngine, ExecutionError, ExecutionEvent};
pub use executor::{StepError, StepExecutor};
