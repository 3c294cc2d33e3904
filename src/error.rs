use std::path::PathBuf;

use thiserror::Error;

/// Fixed message for an input file (or input directory) that cannot be found
pub const MISSING_INPUT_FILE: &str = "Could not find input file";

/// Fixed message for an input file without a `.csv` extension
pub const INVALID_INPUT_EXTENSION: &str = "Input file must have a .csv extension";

/// Main application error type that encompasses all possible failure modes
#[derive(Error, Debug)]
pub enum AddressError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status error: {status} for {url} - {message}")]
    HttpStatus {
        url: String,
        status: u16,
        message: String,
    },

    #[error("Request timeout: {url} after {timeout_seconds} seconds")]
    Timeout { url: String, timeout_seconds: u64 },

    #[error("Unparseable validation response: {details}")]
    ResponseParse { details: String },

    #[error("{}", MISSING_INPUT_FILE)]
    MissingInputFile,

    #[error("{}", INVALID_INPUT_EXTENSION)]
    InvalidExtension,

    #[error("Input heading has {found} columns, expected {expected}")]
    HeaderLength { expected: usize, found: usize },

    #[error("Input heading \"{found}\" does not match expected heading \"{expected}\"")]
    HeaderMismatch { found: String, expected: String },

    #[error("Malformed row in {file} at line {line}: {reason}")]
    MalformedRow {
        file: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AddressError {
    /// Whether the error aborts the whole invocation rather than a single row
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            AddressError::Http(_)
                | AddressError::HttpStatus { .. }
                | AddressError::Timeout { .. }
                | AddressError::ResponseParse { .. }
                | AddressError::Cache(_)
        )
    }
}

impl From<serde_json::Error> for AddressError {
    fn from(err: serde_json::Error) -> Self {
        AddressError::ResponseParse {
            details: err.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AddressError>;
