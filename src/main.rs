use agent_qa::{
    cli::{output::*, Cli, Command},
    core::config::{Credentials, RunConfig},
    scenario::{self, FailureReport, ScenarioError, ScenarioReport, ScenarioRunner},
};
use anyhow::{Context, Result};
use tracing::{debug, error, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Read .env before anything looks at the environment
    let dotenv = dotenvy::dotenv();

    let cli = Cli::from_args();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match dotenv {
        Ok(path) => debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("Ignoring unreadable .env file: {}", e),
    }

    let config = load_config(&cli)?;

    match cli.command() {
        Command::Run => run_scenario(config, cli.json).await?,
        Command::Config => print_config(&config)?,
    }

    Ok(())
}

/// Defaults, then the YAML file, then the environment, then CLI flags
fn load_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => RunConfig::default(),
    };

    config
        .apply_env()
        .context("Failed to apply environment overrides")?;
    cli.overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    Ok(config)
}

fn print_config(config: &RunConfig) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config")?;
    print!("{}", yaml);
    Ok(())
}

async fn run_scenario(config: RunConfig, json: bool) -> Result<()> {
    let mock = config.mock;
    let mut runner = ScenarioRunner::new(config, Credentials::from_env());

    if !json {
        let config = runner.config();
        println!("{}", mode_banner(config.mock, &config.model.name));
        println!("{}", test_header(&config.query));
        runner = runner.with_event_handler(|event| {
            println!("{}", format_execution_event(event));
        });
    }

    let agent = runner.build_agent().unwrap_or_else(|e| fail(&e, json, mock));
    let judge = runner.build_judge().unwrap_or_else(|e| fail(&e, json, mock));

    let run = match runner.run_pipeline(agent).await {
        Ok(run) => run,
        Err(e) => fail(&e, json, mock),
    };

    if !json {
        println!("{}", format_final_output(scenario::final_output(&run)));
        if runner.decision().should_run() {
            println!("{}", validation_header());
        }
    }

    let evaluation = match runner.evaluate(&run, judge).await {
        Ok(evaluation) => evaluation,
        Err(e) => {
            if !json {
                println!("{}", format_qa_failed(&e));
            }
            fail(&e, json, mock)
        }
    };

    if json {
        let report = ScenarioReport {
            mock,
            run,
            evaluation,
        };
        let output = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", output);
    } else {
        println!("{}", format_qa_status(&evaluation));
    }

    Ok(())
}

/// Log the failure, print a JSON failure report in `--json` mode, and exit 1
fn fail(err: &ScenarioError, json: bool, mock: bool) -> ! {
    error!("{}", err);

    if json {
        match serde_json::to_string_pretty(&FailureReport::new(mock, err)) {
            Ok(output) => println!("{}", output),
            Err(e) => error!("Failed to serialize failure report: {}", e),
        }
    }

    std::process::exit(1);
}
