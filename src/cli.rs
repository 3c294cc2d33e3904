use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::rate_limiter::RateLimitOverrides;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Only show critical errors
    Quiet,
    /// Show standard information
    #[default]
    Normal,
    /// Show detailed information
    Verbose,
}

impl VerbosityLevel {
    /// Default log filter directive for this verbosity
    pub fn log_directive(&self) -> &'static str {
        match self {
            VerbosityLevel::Quiet => "error",
            VerbosityLevel::Normal => "warn",
            VerbosityLevel::Verbose => "debug",
        }
    }
}

/// Validate postal addresses in CSV files against an address validation API
#[derive(Parser, Debug, Clone)]
#[command(name = "validate-address")]
#[command(about = "Validate CSV files of postal addresses with caching and rate limiting")]
#[command(version)]
pub struct Cli {
    /// Input CSV, relative to the CSV directory (default: every CSV in it)
    #[arg(help = "Input CSV file name; all CSV files in the CSV directory when omitted")]
    pub filename: Option<String>,

    /// Output CSV, relative to the CSV directory
    #[arg(short = 'o', long = "output")]
    pub output_filename: Option<String>,

    /// Requests allowed per rate limit window (0 disables limiting)
    #[arg(long = "rate-limit")]
    pub rate_limit: Option<i64>,

    /// Rate limit window length in seconds
    #[arg(long = "rate-limit-seconds")]
    pub rate_limit_seconds: Option<u64>,

    /// Directory holding input and output CSV files
    #[arg(long = "csv-dir")]
    pub csv_dir: Option<PathBuf>,

    /// Configuration file (TOML or JSON)
    #[arg(long = "config")]
    pub config: Option<PathBuf>,

    /// Run without the address cache
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", help = "Enable verbose output")]
    pub verbose: bool,

    /// Enable quiet mode (errors only)
    #[arg(
        short = 'q',
        long = "quiet",
        help = "Quiet mode",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Requested input file; an empty name means "all files"
    pub fn input_filename(&self) -> Option<&str> {
        self.filename.as_deref().filter(|name| !name.trim().is_empty())
    }

    pub fn output_filename(&self) -> Option<&str> {
        self.output_filename
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    pub fn rate_limit_overrides(&self) -> RateLimitOverrides {
        RateLimitOverrides {
            rate_limit: self.rate_limit,
            rate_limit_seconds: self.rate_limit_seconds,
        }
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        if self.quiet {
            VerbosityLevel::Quiet
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else {
            VerbosityLevel::Normal
        }
    }
}
