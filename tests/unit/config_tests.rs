/// Unit tests for configuration loading
///
/// Environment access goes through a map so tests never touch the process
/// environment.
use std::collections::HashMap;
use std::path::PathBuf;

use clap::Parser;
use validate_address::{AppEnv, Cli, Config, ConfigError, ConfigManager, RateLimitConfig};

fn env(vars: &[(&str, &str)]) -> HashMap<String, String> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["validate-address"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[tokio::test]
async fn test_test_mode_needs_no_api_key() {
    let vars = env(&[("APP_ENV", "test")]);
    let config = ConfigManager::load_config_with(&vars, &cli(&[]))
        .await
        .unwrap();

    assert_eq!(config.app_env, AppEnv::Test);
    assert_eq!(config.files.csv_dir, PathBuf::from("test_csv"));
    assert!(!config.rate_limit.is_enabled());
}

#[tokio::test]
async fn test_production_requires_api_key() {
    let vars = env(&[("APP_ENV", "production")]);
    let result = ConfigManager::load_config_with(&vars, &cli(&[])).await;

    match result {
        Err(ConfigError::Validation(message)) => assert!(message.contains("VALIDATOR_API_KEY")),
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_csv_dir_wins_over_test_default() {
    let vars = env(&[("APP_ENV", "test"), ("CSV_DIR", "fixtures")]);
    let config = ConfigManager::load_config_with(&vars, &cli(&[]))
        .await
        .unwrap();

    assert_eq!(config.files.csv_dir, PathBuf::from("fixtures"));
}

#[tokio::test]
async fn test_cli_rate_limit_overrides_environment() {
    let vars = env(&[
        ("VALIDATOR_API_KEY", "secret"),
        ("RATE_LIMIT", "100"),
        ("RATE_LIMIT_SECONDS", "60"),
    ]);
    let config = ConfigManager::load_config_with(&vars, &cli(&["--rate-limit", "1"]))
        .await
        .unwrap();

    assert_eq!(config.rate_limit, RateLimitConfig::new(1, 60));
}

#[tokio::test]
async fn test_negative_rate_limit_rejected() {
    let vars = env(&[("VALIDATOR_API_KEY", "secret"), ("RATE_LIMIT", "-1")]);
    let result = ConfigManager::load_config_with(&vars, &cli(&[])).await;

    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_invalid_app_env() {
    let vars = env(&[("APP_ENV", "staging")]);
    let result = ConfigManager::apply_environment_overrides_with(&vars, Config::default());

    match result {
        Err(ConfigError::Environment(message)) => assert!(message.contains("staging")),
        other => panic!("Expected environment error, got {:?}", other),
    }
}

#[test]
fn test_cache_environment_settings() {
    let vars = env(&[
        ("CACHE_ENABLED", "false"),
        ("CACHE_MEMORY_ENTRIES", "50"),
        ("VALIDATOR_BASE_URL", "http://localhost:8080/verify"),
        ("VALIDATOR_TIMEOUT", "3"),
    ]);
    let config =
        ConfigManager::apply_environment_overrides_with(&vars, Config::default()).unwrap();

    assert!(!config.cache.enabled);
    assert_eq!(config.cache.max_memory_entries, 50);
    assert_eq!(config.api.base_url, "http://localhost:8080/verify");
    assert_eq!(config.api.timeout_seconds, 3);
}

#[test]
fn test_config_serializes_to_toml() {
    let mut config = Config::default();
    config.api.api_key = "secret".to_string();
    config.rate_limit = RateLimitConfig::new(10, 60);

    let text = toml::to_string(&config).unwrap();
    let parsed: Config = toml::from_str(&text).unwrap();
    assert_eq!(parsed, config);
}
