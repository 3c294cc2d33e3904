use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use validate_address::{AddressApi, AddressError, AddressRow, ApiResponse};

/// Mock validation service that echoes each address back as its formatted form.
///
/// Addresses registered with [`MockAddressApi::with_invalid`] answer
/// `INVALID` and those registered with [`MockAddressApi::with_failure`]
/// answer with an HTTP 500.
pub struct MockAddressApi {
    invalid: HashSet<String>,
    failing: HashSet<String>,
    latency: Duration,
    slow: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl MockAddressApi {
    pub fn new() -> Self {
        Self {
            invalid: HashSet::new(),
            failing: HashSet::new(),
            latency: Duration::ZERO,
            slow: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_invalid(mut self, key: &str) -> Self {
        self.invalid.insert(key.to_string());
        self
    }

    pub fn with_failure(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Delay answers for one address beyond the default latency
    pub fn with_slow(mut self, key: &str, latency: Duration) -> Self {
        self.slow.insert(key.to_string(), latency);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

}

impl Default for MockAddressApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AddressApi for MockAddressApi {
    async fn verify(&self, row: &AddressRow) -> Result<ApiResponse, AddressError> {
        let key = row.key().into_string();
        self.calls.fetch_add(1, Ordering::SeqCst);

        let latency = self.slow.get(&key).copied().unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.contains(&key) {
            return Err(AddressError::HttpStatus {
                url: "http://mock".to_string(),
                status: 500,
                message: "HTTP 500: Internal Server Error".to_string(),
            });
        }

        if self.invalid.contains(&key) {
            return Ok(ApiResponse {
                status: "INVALID".to_string(),
                formattedaddress: None,
            });
        }

        Ok(ApiResponse {
            status: "VALID".to_string(),
            formattedaddress: Some(key),
        })
    }
}
