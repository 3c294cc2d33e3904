//! Batch orchestration over CSV files of addresses.
//!
//! Each file goes through a fixed sequence:
//! - **Header check**: the first record must match [`EXPECTED_HEADER`] exactly
//! - **Dispatch**: every data row is charged against the rate limiter and then
//!   spawned as its own validation task
//! - **Join**: all tasks of the file are awaited in submission order
//!
//! Files are processed one after another and their results concatenated. Any
//! fatal error (unreadable file, header mismatch, malformed row) aborts the
//! whole run without returning partial results.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use csv::{ReaderBuilder, StringRecord, Trim};
use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::address::{AddressKey, AddressRow, EXPECTED_HEADER, ResultPair};
use crate::error::{AddressError, Result};
use crate::output::{BatchResults, BatchSummary, Output, write_results_csv};
use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use crate::validator::AddressValidator;

/// Compare a heading record against the expected header, by count and position
pub fn check_header(record: &StringRecord) -> Result<()> {
    if record.len() != EXPECTED_HEADER.len() {
        return Err(AddressError::HeaderLength {
            expected: EXPECTED_HEADER.len(),
            found: record.len(),
        });
    }

    for (found, expected) in record.iter().zip(EXPECTED_HEADER) {
        if found.trim() != expected {
            return Err(AddressError::HeaderMismatch {
                found: found.trim().to_string(),
                expected: expected.to_string(),
            });
        }
    }

    Ok(())
}

type PendingRow = (AddressKey, JoinHandle<ResultPair>);

/// Drives row validation across one or more CSV files
pub struct BatchOrchestrator {
    validator: Arc<AddressValidator>,
    rate_limit: RateLimitConfig,
    output: Option<Output>,
}

impl BatchOrchestrator {
    pub fn new(validator: Arc<AddressValidator>, rate_limit: RateLimitConfig) -> Self {
        Self {
            validator,
            rate_limit,
            output: None,
        }
    }

    /// Print `"{input} -> {output}"` lines through `output` after each run
    pub fn with_output(mut self, output: Output) -> Self {
        self.output = Some(output);
        self
    }

    pub fn validator(&self) -> &Arc<AddressValidator> {
        &self.validator
    }

    /// Validate every file in order, optionally writing the combined results
    /// to `output_path`.
    pub async fn run(&self, files: &[PathBuf], output_path: Option<&Path>) -> Result<BatchResults> {
        let start = Instant::now();
        let stats_before = self.validator.stats();
        let mut limiter = RateLimiter::new(self.rate_limit);
        let mut results = Vec::new();

        for file in files {
            let mut file_results = self.validate_file(file, &mut limiter).await?;
            results.append(&mut file_results);
        }

        if let Some(path) = output_path {
            write_results_csv(path, &results)?;
            info!(path = %path.display(), rows = results.len(), "Wrote output file");
        }

        if let Some(output) = &self.output {
            output.report(&results);
        }

        let stats = self.validator.stats();
        let invalid = results.iter().filter(|pair| pair.is_invalid()).count();
        let summary = BatchSummary {
            files: files.len(),
            rows: results.len(),
            valid: results.len() - invalid,
            invalid,
            cache_hits: stats.cache_hits - stats_before.cache_hits,
            api_calls: stats.api_calls - stats_before.api_calls,
            api_failures: stats.api_failures - stats_before.api_failures,
            rate_limit_waits: limiter.waits(),
            duration: start.elapsed(),
        };

        Ok(BatchResults { results, summary })
    }

    /// Validate one file, returning its results in row order
    pub async fn validate_file(
        &self,
        path: &Path,
        limiter: &mut RateLimiter,
    ) -> Result<Vec<ResultPair>> {
        info!(file = %path.display(), "Validating addresses");

        let mut pending: Vec<PendingRow> = Vec::new();
        if let Err(e) = self.dispatch_rows(path, limiter, &mut pending).await {
            for (_, handle) in &pending {
                handle.abort();
            }
            return Err(e);
        }

        let (keys, handles): (Vec<AddressKey>, Vec<JoinHandle<ResultPair>>) =
            pending.into_iter().unzip();
        let joined = join_all(handles).await;

        let results = keys
            .into_iter()
            .zip(joined)
            .map(|(key, outcome)| match outcome {
                Ok(pair) => pair,
                Err(e) => {
                    error!(input = %key, error = %e, "Row validation task failed");
                    ResultPair::invalid(key)
                }
            })
            .collect::<Vec<_>>();

        info!(file = %path.display(), rows = results.len(), "Finished file");
        Ok(results)
    }

    async fn dispatch_rows(
        &self,
        path: &Path,
        limiter: &mut RateLimiter,
        pending: &mut Vec<PendingRow>,
    ) -> Result<()> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)?;
        let mut records = reader.records();

        let header = match records.next() {
            Some(record) => record?,
            None => StringRecord::new(),
        };
        check_header(&header)?;

        for record in records {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            let fields: Vec<&str> = record.iter().collect();
            let row = AddressRow::from_fields(&fields).map_err(|reason| {
                AddressError::MalformedRow {
                    file: path.to_path_buf(),
                    line,
                    reason,
                }
            })?;

            limiter.acquire().await;

            let key = row.key();
            let validator = Arc::clone(&self.validator);
            let handle = tokio::spawn(async move { validator.validate_row(&row).await });
            pending.push((key, handle));
        }

        Ok(())
    }
}
