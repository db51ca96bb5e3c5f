//! Rate Limiting
//!
//! Fixed-window request counters keyed by caller (client IP or account).

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    /// 100 requests per 15 minutes
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, at least 1
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let wait_ms = u64::try_from(self.reset_at_ms.saturating_sub(now_ms)).unwrap_or(0);
        wait_ms.div_ceil(1000).max(1)
    }
}

#[derive(Debug, Clone, Error)]
#[error("rate limit store unavailable: {0}")]
pub struct RateLimitStoreError(pub String);

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request against `key` and report whether it is allowed
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at_ms: i64,
    count: u32,
}

/// Sweep expired windows once the map grows past this many keys
const SWEEP_THRESHOLD: usize = 4096;

/// Process-local store. Counters are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a request at `now_ms`
    pub fn check_at(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        let window_ms = config.window_ms();
        let mut windows = self
            .windows
            .lock()
            .map_err(|e| RateLimitStoreError(e.to_string()))?;

        if windows.len() >= SWEEP_THRESHOLD {
            windows.retain(|_, w| now_ms.saturating_sub(w.started_at_ms) < window_ms);
        }

        let window = windows.entry(key.to_owned()).or_insert(Window {
            started_at_ms: now_ms,
            count: 0,
        });
        if now_ms.saturating_sub(window.started_at_ms) >= window_ms {
            *window = Window {
                started_at_ms: now_ms,
                count: 0,
            };
        }

        let allowed = window.count < config.max_requests;
        if allowed {
            window.count += 1;
        }

        Ok(RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(window.count),
            reset_at_ms: window.started_at_ms.saturating_add(window_ms),
        })
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, RateLimitStoreError> {
        self.check_at(key, config, Utc::now().timestamp_millis())
    }
}
