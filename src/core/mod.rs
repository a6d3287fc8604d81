//! Core domain models for the agent pipeline
//!
//! This module defines the state carried through a run, the steps that
//! transform it, and the configuration a run is built from.

pub mod config;
pub mod pipeline;
pub mod retry;
pub mod state;
pub mod step;

pub use pipeline::*;
pub use retry::RetryPolicy;
pub use state::*;
pub use step::*;
