//! Test: Config layers - YAML, then environment, then CLI flags

use agent_qa::cli::Cli;
use agent_qa::core::config::{RunConfig, BASE_URL_ENV, MOCK_ENV};
use std::collections::HashMap;
use std::time::Duration;

#[test]
fn test_yaml_then_env_then_flags() {
    let yaml = r#"
mock: true
query: "From the file"
model:
  name: "gpt-4o-mini"
  timeout_secs: 30
retry:
  max_attempts: 5
  initial_interval_ms: 100
"#;
    let mut config = RunConfig::from_yaml(yaml).unwrap();

    let env = HashMap::from([(MOCK_ENV, "false"), (BASE_URL_ENV, "http://localhost:8080/v1/")]);
    config
        .apply_env_from(|name| env.get(name).map(|v| v.to_string()))
        .unwrap();

    let cli = Cli::try_parse_from(["agent-qa", "--query", "From the flag"]).unwrap();
    cli.overrides.apply(&mut config);
    config.validate().unwrap();

    assert!(!config.mock);
    assert_eq!(config.query, "From the flag");
    assert_eq!(config.model.name, "gpt-4o-mini");
    assert_eq!(config.step_defaults().timeout_secs, 30);

    let client = config.agent_client_config();
    assert_eq!(client.base_url(), "http://localhost:8080/v1");
    assert_eq!(client.timeout_secs, 30);

    let policy = config.retry_policy();
    assert_eq!(policy.max_attempts, 5);
    assert_eq!(policy.delay_for(1), Duration::from_millis(100));
}

#[test]
fn test_mock_flag_wins_over_env() {
    let mut config = RunConfig::default();
    config
        .apply_env_from(|name| (name == MOCK_ENV).then(|| "0".to_string()))
        .unwrap();
    assert!(!config.mock);

    let cli = Cli::try_parse_from(["agent-qa", "--mock"]).unwrap();
    cli.overrides.apply(&mut config);
    assert!(config.mock);
}

#[test]
fn test_effective_config_round_trips_through_yaml() {
    let config = RunConfig::default();
    let yaml = serde_yaml::to_string(&config).unwrap();

    assert_eq!(RunConfig::from_yaml(&yaml).unwrap(), config);
}
