//! Row validation: cache lookup, API fallback and cache write-back.
//!
//! `AddressValidator::validate_row` never fails. Transport and parse errors
//! from the API are absorbed into the invalid-address sentinel so that one bad
//! row cannot abort the batch, and they are not written to the cache.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::address::{AddressRow, ResultPair};
use crate::cache::AddressCache;
use crate::http_client::{AddressApi, ApiResponse};

/// Counters collected while validating rows
#[derive(Debug, Default)]
struct ValidatorStats {
    cache_hits: AtomicUsize,
    api_calls: AtomicUsize,
    api_failures: AtomicUsize,
}

/// Point-in-time copy of the validator counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub cache_hits: usize,
    pub api_calls: usize,
    pub api_failures: usize,
}

/// Validates single address rows against the cache and the validation API
pub struct AddressValidator {
    cache: Arc<dyn AddressCache>,
    api: Arc<dyn AddressApi>,
    stats: ValidatorStats,
}

impl AddressValidator {
    pub fn new(cache: Arc<dyn AddressCache>, api: Arc<dyn AddressApi>) -> Self {
        Self {
            cache,
            api,
            stats: ValidatorStats::default(),
        }
    }

    /// Validate one row, consulting the cache before the API
    pub async fn validate_row(&self, row: &AddressRow) -> ResultPair {
        let key = row.key();

        if let Some(cached) = self.cache.get(key.as_str()).await {
            self.stats.cache_hits.fetch_add(1, Ordering::Relaxed);
            debug!(input = %key, "Cache hit");
            return ResultPair::new(key, cached);
        }

        self.stats.api_calls.fetch_add(1, Ordering::Relaxed);
        let outcome = self
            .api
            .verify(row)
            .await
            .and_then(ApiResponse::into_result);

        match outcome {
            Ok(result) => {
                let output = result.output().to_string();
                if !self.cache.set(key.as_str(), &output).await {
                    debug!(input = %key, backend = self.cache.backend(), "Result not cached");
                }
                ResultPair::new(key, output)
            }
            Err(e) => {
                self.stats.api_failures.fetch_add(1, Ordering::Relaxed);
                warn!(input = %key, error = %e, "Address validation failed");
                ResultPair::invalid(key)
            }
        }
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.stats.cache_hits.load(Ordering::Relaxed),
            api_calls: self.stats.api_calls.load(Ordering::Relaxed),
            api_failures: self.stats.api_failures.load(Ordering::Relaxed),
        }
    }
}
