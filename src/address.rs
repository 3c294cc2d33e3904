//! Address value types shared by the validator and the batch orchestrator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Heading row every input CSV must start with
pub const EXPECTED_HEADER: [&str; 3] = ["Street Address", "City", "Postal Code"];

/// Heading row written to the output CSV
pub const OUTPUT_HEADER: [&str; 2] = ["Input Address", "Output Address"];

/// Output substituted for addresses the API rejects or that cannot be validated
pub const INVALID_ADDRESS: &str = "Invalid Address";

/// Country code sent with every validation request
pub const COUNTRY_CODE: &str = "us";

/// One data row of an input CSV
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRow {
    pub street_address: String,
    pub city: String,
    pub postal_code: u32,
}

impl AddressRow {
    pub fn new(street_address: impl Into<String>, city: impl Into<String>, postal_code: u32) -> Self {
        Self {
            street_address: street_address.into(),
            city: city.into(),
            postal_code,
        }
    }

    /// Parse a row from its raw fields. Fields are trimmed; all three must be
    /// present and non-empty, and the postal code must be an integer.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, String> {
        if fields.len() != EXPECTED_HEADER.len() {
            return Err(format!(
                "expected {} fields, found {}",
                EXPECTED_HEADER.len(),
                fields.len()
            ));
        }

        let trimmed: Vec<&str> = fields.iter().map(|f| f.as_ref().trim()).collect();
        for (value, name) in trimmed.iter().zip(EXPECTED_HEADER) {
            if value.is_empty() {
                return Err(format!("\"{}\" is empty", name));
            }
        }

        let postal_code = trimmed[2]
            .parse::<u32>()
            .map_err(|_| format!("postal code \"{}\" is not an integer", trimmed[2]))?;

        Ok(Self::new(trimmed[0], trimmed[1], postal_code))
    }

    /// Deterministic key used for caching and as the input column of results
    pub fn key(&self) -> AddressKey {
        AddressKey(format!(
            "{}, {}, {}",
            self.street_address, self.city, self.postal_code
        ))
    }
}

/// Formatted input address, `"{street}, {city}, {postal}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressKey(String);

impl AddressKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AddressKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome reported by the validation API for one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    Valid { formatted_address: String },
    Invalid,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    /// The output column value for this outcome
    pub fn output(&self) -> &str {
        match self {
            ValidationResult::Valid { formatted_address } => formatted_address,
            ValidationResult::Invalid => INVALID_ADDRESS,
        }
    }
}

/// Input key paired with its validated output address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPair {
    pub input: AddressKey,
    pub output: String,
}

impl ResultPair {
    pub fn new(input: AddressKey, output: impl Into<String>) -> Self {
        Self {
            input,
            output: output.into(),
        }
    }

    pub fn invalid(input: AddressKey) -> Self {
        Self::new(input, INVALID_ADDRESS)
    }

    pub fn is_invalid(&self) -> bool {
        self.output == INVALID_ADDRESS
    }
}

impl fmt::Display for ResultPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.input, self.output)
    }
}
