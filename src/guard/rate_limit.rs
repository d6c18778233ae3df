//! Per-device submission throttling.
//!
//! A fixed window of `window_ms` admits at most `max_attempts` accepted
//! submissions. Once the window has elapsed it is reset in full (count → 0),
//! there is no gradual decay and no backoff beyond the window itself.
//!
//! The limiter is a courtesy control. When the store cannot be read or written
//! it behaves as if no attempts were recorded, and the relay's own validation
//! remains the security boundary.

use std::sync::Arc;

use crate::config::RateLimitConfig;
use crate::guard::clock::Clock;
use crate::guard::store::{AttemptRecord, AttemptStore};

/// Outcome of [`RateLimiter::can_submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitCheck {
    pub allowed: bool,
    /// Set only when `allowed` is false.
    pub retry_after_ms: Option<u64>,
}

impl RateLimitCheck {
    fn allowed() -> Self {
        Self {
            allowed: true,
            retry_after_ms: None,
        }
    }

    fn denied(retry_after_ms: u64) -> Self {
        Self {
            allowed: false,
            retry_after_ms: Some(retry_after_ms),
        }
    }
}

pub struct RateLimiter {
    store: Arc<dyn AttemptStore>,
    clock: Arc<dyn Clock>,
    key: String,
    max_attempts: u32,
    window_ms: u64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn AttemptStore>, clock: Arc<dyn Clock>, config: &RateLimitConfig) -> Self {
        Self {
            store,
            clock,
            key: config.storage_key.clone(),
            max_attempts: config.max_attempts,
            window_ms: config.window_ms(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Decide whether a new attempt may proceed.
    ///
    /// Resets the stored window as a side effect once it has elapsed.
    pub fn can_submit(&self) -> RateLimitCheck {
        let now = self.clock.now_ms();
        let record = self.current(now);
        let elapsed = now.saturating_sub(record.window_start);

        if record.count >= self.max_attempts && elapsed < self.window_ms {
            tracing::debug!(
                key = %self.key,
                count = record.count,
                elapsed_ms = elapsed,
                "Attempt cap reached"
            );
            return RateLimitCheck::denied(self.window_ms - elapsed);
        }

        if elapsed >= self.window_ms {
            self.persist(&AttemptRecord::fresh(now));
        }

        RateLimitCheck::allowed()
    }

    /// Count one accepted attempt against the current window.
    pub fn record_attempt(&self) {
        let now = self.clock.now_ms();
        let mut record = self.current(now);
        record.count = record.count.saturating_add(1);
        if record.count == 1 {
            record.window_start = now;
        }
        self.persist(&record);
    }

    /// The record as the limiter currently sees it.
    pub fn snapshot(&self) -> AttemptRecord {
        self.current(self.clock.now_ms())
    }

    fn current(&self, now: u64) -> AttemptRecord {
        match self.store.load(&self.key) {
            Ok(Some(record)) => record,
            Ok(None) => AttemptRecord::fresh(now),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Attempt store unreadable, limiter degraded");
                AttemptRecord::fresh(now)
            }
        }
    }

    fn persist(&self, record: &AttemptRecord) {
        if let Err(e) = self.store.save(&self.key, record) {
            tracing::warn!(key = %self.key, error = %e, "Attempt store unwritable, limiter degraded");
        }
    }
}
