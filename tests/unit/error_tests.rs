/// Unit tests for error classification and messages
use std::path::PathBuf;

use validate_address::{AddressError, ConfigError, INVALID_INPUT_EXTENSION, MISSING_INPUT_FILE};

#[test]
fn test_fixed_messages_match_constants() {
    assert_eq!(AddressError::MissingInputFile.to_string(), MISSING_INPUT_FILE);
    assert_eq!(
        AddressError::InvalidExtension.to_string(),
        INVALID_INPUT_EXTENSION
    );
}

#[test]
fn test_row_failures_are_not_fatal() {
    let errors = vec![
        AddressError::HttpStatus {
            url: "http://localhost".to_string(),
            status: 503,
            message: "HTTP 503: Service Unavailable".to_string(),
        },
        AddressError::Timeout {
            url: "http://localhost".to_string(),
            timeout_seconds: 30,
        },
        AddressError::ResponseParse {
            details: "expected value".to_string(),
        },
        AddressError::Cache("unreachable".to_string()),
    ];

    for error in errors {
        assert!(!error.is_fatal(), "{} should not be fatal", error);
    }
}

#[test]
fn test_input_failures_are_fatal() {
    let errors = vec![
        AddressError::MissingInputFile,
        AddressError::InvalidExtension,
        AddressError::HeaderLength {
            expected: 3,
            found: 4,
        },
        AddressError::HeaderMismatch {
            found: "Zip".to_string(),
            expected: "Postal Code".to_string(),
        },
        AddressError::MalformedRow {
            file: PathBuf::from("input.csv"),
            line: 2,
            reason: "\"City\" is empty".to_string(),
        },
        AddressError::Config("API key must be provided via VALIDATOR_API_KEY".to_string()),
    ];

    for error in errors {
        assert!(error.is_fatal(), "{} should be fatal", error);
    }
}

#[test]
fn test_malformed_row_message() {
    let error = AddressError::MalformedRow {
        file: PathBuf::from("input.csv"),
        line: 4,
        reason: "postal code \"abc\" is not an integer".to_string(),
    };
    assert_eq!(
        error.to_string(),
        "Malformed row in input.csv at line 4: postal code \"abc\" is not an integer"
    );
}

#[test]
fn test_config_validation_error_keeps_message() {
    let error: AddressError =
        ConfigError::Validation("Rate limit must not be negative".to_string()).into();
    assert_eq!(
        error.to_string(),
        "Configuration error: Rate limit must not be negative"
    );
}
