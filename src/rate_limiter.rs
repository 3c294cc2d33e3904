//! Rolling-window request budget for the validation API.
//!
//! The limiter is owned by the dispatch loop and mutated only there. When the
//! budget is exhausted it suspends the loop on a tokio timer until the window
//! resets, so rows that were already dispatched keep making progress.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

/// Rate limit configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per window; 0 disables limiting
    pub limit: i64,
    /// Window length in seconds
    pub window_seconds: u64,
}

impl RateLimitConfig {
    pub fn new(limit: i64, window_seconds: u64) -> Self {
        Self {
            limit,
            window_seconds,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Apply caller-supplied overrides on top of the configured values
    pub fn with_overrides(mut self, overrides: &RateLimitOverrides) -> Self {
        if let Some(limit) = overrides.rate_limit {
            self.limit = limit;
        }
        if let Some(window_seconds) = overrides.rate_limit_seconds {
            self.window_seconds = window_seconds;
        }
        self
    }
}

/// Optional per-invocation overrides for the rate limit settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RateLimitOverrides {
    pub rate_limit: Option<i64>,
    pub rate_limit_seconds: Option<u64>,
}

/// Remaining budget and the instant the current window ends
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    enabled: bool,
    remaining: i64,
    reset_at: Instant,
    waits: u32,
}

impl RateLimiter {
    /// Start a fresh window at the current instant.
    ///
    /// Limiting is decided once from the initial budget: a budget of zero means
    /// "unlimited" and the limiter never waits, even as the counter goes negative.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            enabled: config.is_enabled(),
            remaining: config.limit,
            reset_at: Instant::now() + config.window(),
            waits: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    pub fn reset_at(&self) -> Instant {
        self.reset_at
    }

    /// Number of times the limiter has suspended the caller
    pub fn waits(&self) -> u32 {
        self.waits
    }

    /// Plan the next window without waiting.
    ///
    /// Returns how long the caller must wait and the window end that applies
    /// afterwards. With budget left (or limiting disabled) the wait is zero and
    /// the window end is unchanged.
    pub fn next_window(
        &self,
        current_remaining: i64,
        current_reset_at: Instant,
        now: Instant,
    ) -> (Duration, Instant) {
        if !self.enabled || current_remaining > 0 {
            return (Duration::ZERO, current_reset_at);
        }

        let wait = current_reset_at.saturating_duration_since(now);
        (wait, now + wait + self.config.window())
    }

    /// Gate one row dispatch: wait out the window if the budget is spent, then
    /// charge the row against the budget.
    pub async fn acquire(&mut self) {
        if self.enabled && self.remaining <= 0 {
            let (wait, _) = self.next_window(self.remaining, self.reset_at, Instant::now());
            info!(
                wait_ms = wait.as_millis() as u64,
                "Rate limit reached, waiting for window reset"
            );
            sleep(wait).await;

            self.reset_at = Instant::now() + self.config.window();
            self.remaining = self.config.limit;
            self.waits += 1;
        }

        self.remaining -= 1;
        debug!(remaining = self.remaining, "Rate limit budget charged");
    }
}
