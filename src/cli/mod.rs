//! Command-line interface

pub mod output;

use crate::core::config::RunConfig;
use clap::{Args, Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

/// Runs a two-step research-and-write agent pipeline and checks the answer
#[derive(Debug, Parser, Clone)]
#[command(name = "agent-qa")]
#[command(version)]
#[command(about = "Run a research-and-write agent pipeline and check its answer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a YAML run configuration
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub overrides: RunOverrides,
}

/// Available commands
#[derive(Debug, Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the scenario (default)
    Run,

    /// Print the effective configuration as YAML
    Config,
}

/// Flags that override the configuration file and environment
#[derive(Debug, Args, Clone, Default)]
pub struct RunOverrides {
    /// Call the live model instead of canned responses
    #[arg(long, global = true, conflicts_with = "mock")]
    pub live: bool,

    /// Use canned responses
    #[arg(long, global = true)]
    pub mock: bool,

    /// Query for the researcher
    #[arg(short, long, global = true)]
    pub query: Option<String>,

    /// Live model name
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Minimum passing relevance score
    #[arg(long, global = true)]
    pub threshold: Option<f64>,
}

impl RunOverrides {
    pub fn apply(&self, config: &mut RunConfig) {
        if self.live {
            config.mock = false;
        }
        if self.mock {
            config.mock = true;
        }
        if let Some(query) = &self.query {
            config.query = query.clone();
        }
        if let Some(model) = &self.model {
            config.model.name = model.clone();
        }
        if let Some(threshold) = self.threshold {
            config.evaluation.threshold = threshold;
        }
    }
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// The subcommand to run; no subcommand runs the scenario
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}
