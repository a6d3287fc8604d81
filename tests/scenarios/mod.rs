//! Scenario-based tests for agent-qa

mod config_layers;
mod evaluation_gate;
mod mock_chain;
mod retry_behavior;
