use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::address::{AddressRow, COUNTRY_CODE, ValidationResult};
use crate::error::{AddressError, Result};

/// Default endpoint of the address validation service
pub const DEFAULT_BASE_URL: &str = "https://api.address-validator.net/api/verify";

/// Configuration for the validation API client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpClientConfig {
    /// Verification endpoint
    pub base_url: String,
    /// API key sent with every request
    pub api_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_seconds: 30,
            user_agent: format!("validate-address/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// JSON body returned by the validation API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    #[serde(default)]
    pub formattedaddress: Option<String>,
}

impl ApiResponse {
    /// Map the raw response onto a validation outcome.
    ///
    /// `INVALID` is an invalid address; any other status must carry a
    /// formatted address.
    pub fn into_result(self) -> Result<ValidationResult> {
        if self.status == "INVALID" {
            return Ok(ValidationResult::Invalid);
        }

        match self.formattedaddress {
            Some(formatted_address) => Ok(ValidationResult::Valid { formatted_address }),
            None => Err(AddressError::ResponseParse {
                details: format!("status \"{}\" without formattedaddress", self.status),
            }),
        }
    }
}

/// The external address validation service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AddressApi: Send + Sync {
    async fn verify(&self, row: &AddressRow) -> Result<ApiResponse>;
}

/// Async HTTP client for the address validation API
pub struct AsyncHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl AsyncHttpClient {
    /// Create a new async HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_idle_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(AddressError::from)?;

        Ok(Self { client, config })
    }

    /// Make a single HTTP request with timeout.
    ///
    /// Transport errors are stripped of the request URL, which carries the API key.
    async fn make_request(&self, row: &AddressRow) -> Result<Response> {
        let postal_code = row.postal_code.to_string();
        let request_future = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("StreetAddress", row.street_address.as_str()),
                ("City", row.city.as_str()),
                ("PostalCode", postal_code.as_str()),
                ("CountryCode", COUNTRY_CODE),
                ("APIKey", self.config.api_key.as_str()),
            ])
            .send();

        timeout(
            Duration::from_secs(self.config.timeout_seconds),
            request_future,
        )
        .await
        .map_err(|_| AddressError::Timeout {
            url: self.config.base_url.clone(),
            timeout_seconds: self.config.timeout_seconds,
        })?
        .map_err(|e| AddressError::from(e.without_url()))
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

#[async_trait]
impl AddressApi for AsyncHttpClient {
    async fn verify(&self, row: &AddressRow) -> Result<ApiResponse> {
        let response = self.make_request(row).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AddressError::HttpStatus {
                url: self.config.base_url.clone(),
                status: status.as_u16(),
                message: format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or("Unknown")
                ),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AddressError::from(e.without_url()))?;
        let parsed: ApiResponse = serde_json::from_str(&body)?;
        debug!(status = %parsed.status, "Validation API responded");

        Ok(parsed)
    }
}
