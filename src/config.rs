use crate::cache::CacheConfig;
use crate::cli::{Cli, VerbosityLevel};
use crate::error::AddressError;
use crate::http_client::HttpClientConfig;
use crate::rate_limiter::RateLimitConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Trait for abstracting environment variable access
pub trait EnvProvider {
    fn get(&self, key: &str) -> Option<String>;
}

/// System environment variable provider for production use
pub struct SystemEnvProvider;

impl EnvProvider for SystemEnvProvider {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvProvider for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::HashMap::get(self, key).cloned()
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("JSON parsing error: {0}")]
    JsonParsing(#[from] serde_json::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),

    #[error("Environment variable error: {0}")]
    Environment(String),

    #[error("Unsupported configuration file format: {0}")]
    UnsupportedFormat(String),
}

impl From<ConfigError> for AddressError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation(message) => AddressError::Config(message),
            other => AddressError::Config(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Deployment environment, from `APP_ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Production,
    Development,
    Test,
}

impl AppEnv {
    pub fn is_test(&self) -> bool {
        matches!(self, AppEnv::Test)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "production" => Some(AppEnv::Production),
            "development" => Some(AppEnv::Development),
            "test" => Some(AppEnv::Test),
            _ => None,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub app_env: AppEnv,
    pub api: HttpClientConfig,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub files: FileConfig,
    pub output: OutputConfig,
}

impl Config {
    pub fn verbosity(&self) -> VerbosityLevel {
        if self.output.quiet {
            VerbosityLevel::Quiet
        } else if self.output.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// File location configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileConfig {
    /// Directory holding input and output CSV files
    pub csv_dir: PathBuf,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("csv"),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Verbose output
    pub verbose: bool,
    /// Quiet mode (errors only)
    pub quiet: bool,
}

/// Configuration manager for loading and merging configurations
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration with precedence: file -> environment -> CLI
    pub async fn load_config(cli: &Cli) -> Result<Config> {
        Self::load_config_with(&SystemEnvProvider, cli).await
    }

    /// Load configuration reading the environment through `env`
    pub async fn load_config_with(env: &impl EnvProvider, cli: &Cli) -> Result<Config> {
        let mut config = Config::default();

        if let Some(config_path) = &cli.config {
            config = Self::load_from_file(config_path).await?;
        } else if let Some(found_config) = Self::find_config_file().await? {
            config = found_config;
        }

        config = Self::apply_environment_overrides_with(env, config)?;
        config = Self::merge_with_cli(config, cli);

        Self::validate_config(&config)?;

        Ok(config)
    }

    /// Load configuration from a file (TOML or JSON)
    pub async fn load_from_file(path: &Path) -> Result<Config> {
        let content = tokio::fs::read_to_string(path).await?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(toml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat(ext.to_string())),
            None => {
                if let Ok(config) = toml::from_str::<Config>(&content) {
                    Ok(config)
                } else {
                    Ok(serde_json::from_str(&content)?)
                }
            }
        }
    }

    /// Find configuration file in standard locations
    pub async fn find_config_file() -> Result<Option<Config>> {
        let config_names = [
            "validate-address.toml",
            "validate-address.json",
            ".validate-address.toml",
            ".validate-address.json",
        ];

        for name in &config_names {
            let path = PathBuf::from(name);
            if path.exists() {
                return Ok(Some(Self::load_from_file(&path).await?));
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let app_config_dir = config_dir.join("validate-address");
            for name in &config_names {
                let path = app_config_dir.join(name);
                if path.exists() {
                    return Ok(Some(Self::load_from_file(&path).await?));
                }
            }
        }

        Ok(None)
    }

    /// Apply environment variable overrides with a custom environment provider
    pub fn apply_environment_overrides_with(
        env: &impl EnvProvider,
        mut config: Config,
    ) -> Result<Config> {
        if let Some(app_env) = env.get("APP_ENV") {
            config.app_env = AppEnv::parse(&app_env).ok_or_else(|| {
                ConfigError::Environment(format!("Invalid APP_ENV value: {}", app_env))
            })?;
            if config.app_env.is_test() && env.get("CSV_DIR").is_none() {
                config.files.csv_dir = PathBuf::from("test_csv");
            }
        }

        // API settings
        if let Some(api_key) = env.get("VALIDATOR_API_KEY") {
            config.api.api_key = api_key;
        }

        if let Some(base_url) = env.get("VALIDATOR_BASE_URL") {
            config.api.base_url = base_url;
        }

        if let Some(timeout) = env.get("VALIDATOR_TIMEOUT") {
            config.api.timeout_seconds = parse_var("VALIDATOR_TIMEOUT", &timeout)?;
        }

        // Rate limit settings
        if let Some(limit) = env.get("RATE_LIMIT") {
            config.rate_limit.limit = parse_var("RATE_LIMIT", &limit)?;
        }

        if let Some(seconds) = env.get("RATE_LIMIT_SECONDS") {
            config.rate_limit.window_seconds = parse_var("RATE_LIMIT_SECONDS", &seconds)?;
        }

        // Cache settings
        if let Some(cache_dir) = env.get("CACHE_DIR") {
            config.cache.directory = PathBuf::from(cache_dir);
        }

        if let Some(enabled) = env.get("CACHE_ENABLED") {
            config.cache.enabled = parse_var("CACHE_ENABLED", &enabled)?;
        }

        if let Some(timeout) = env.get("CACHE_TIMEOUT") {
            config.cache.timeout_seconds = parse_var("CACHE_TIMEOUT", &timeout)?;
        }

        if let Some(entries) = env.get("CACHE_MEMORY_ENTRIES") {
            config.cache.max_memory_entries = parse_var("CACHE_MEMORY_ENTRIES", &entries)?;
        }

        // File settings
        if let Some(csv_dir) = env.get("CSV_DIR") {
            config.files.csv_dir = PathBuf::from(csv_dir);
        }

        Ok(config)
    }

    /// Merge CLI arguments with configuration (CLI takes precedence)
    pub fn merge_with_cli(mut config: Config, cli: &Cli) -> Config {
        config.rate_limit = config
            .rate_limit
            .with_overrides(&cli.rate_limit_overrides());

        if let Some(csv_dir) = &cli.csv_dir {
            config.files.csv_dir = csv_dir.clone();
        }

        if cli.no_cache {
            config.cache.enabled = false;
        }

        if cli.verbose {
            config.output.verbose = true;
            config.output.quiet = false;
        }
        if cli.quiet {
            config.output.quiet = true;
            config.output.verbose = false;
        }

        config
    }

    /// Validate configuration values
    pub fn validate_config(config: &Config) -> Result<()> {
        if !config.app_env.is_test() && config.api.api_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "API key must be provided via VALIDATOR_API_KEY".to_string(),
            ));
        }

        if config.api.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "API timeout must be greater than 0".to_string(),
            ));
        }

        if config.rate_limit.limit < 0 {
            return Err(ConfigError::Validation(
                "Rate limit must not be negative".to_string(),
            ));
        }

        if config.rate_limit.is_enabled() && config.rate_limit.window_seconds == 0 {
            return Err(ConfigError::Validation(
                "Rate limit window must be greater than 0 when a rate limit is set".to_string(),
            ));
        }

        if config.cache.enabled && config.cache.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "Cache timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Environment(format!("Invalid {} value: {}", name, value)))
}
