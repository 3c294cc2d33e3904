//! # validate-address Library
//!
//! Validates CSV files of postal addresses against a third-party address
//! validation API, with a persistent result cache, a rolling-window rate limit
//! and concurrent per-row dispatch.

pub mod address;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod file_discovery;
pub mod http_client;
pub mod orchestrator;
pub mod output;
pub mod rate_limiter;
pub mod validator;

pub use address::{
    AddressKey, AddressRow, COUNTRY_CODE, EXPECTED_HEADER, INVALID_ADDRESS, OUTPUT_HEADER,
    ResultPair, ValidationResult,
};
pub use cache::{AddressCache, CacheConfig, DiskCache, MemoryCache, NullCache, connect_cache};
pub use cli::{Cli, VerbosityLevel};
pub use config::{AppEnv, Config, ConfigError, ConfigManager, EnvProvider, SystemEnvProvider};
pub use error::{AddressError, INVALID_INPUT_EXTENSION, MISSING_INPUT_FILE};
pub use file_discovery::FileDiscovery;
pub use http_client::{AddressApi, ApiResponse, AsyncHttpClient, HttpClientConfig};
pub use orchestrator::{BatchOrchestrator, check_header};
pub use output::{BatchResults, BatchSummary, Output, write_results_csv};
pub use rate_limiter::{RateLimitConfig, RateLimitOverrides, RateLimiter};
pub use validator::{AddressValidator, StatsSnapshot};
