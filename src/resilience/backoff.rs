//! Exponential backoff with jitter.
//!
//! The default policy is capped exponential backoff with full jitter:
//! `delay = min(max, random[0, 1) * 2^(retry + 1) * base)`.

use std::fmt::Debug;
use std::time::Duration;

use rand::Rng;

// 2^62 * base already saturates any sensible cap; keeps the product finite.
const MAX_EXPONENT: u32 = 62;

/// Decides how long to wait before the next retry.
///
/// `retry` is the number of retries already performed (0 before the first retry).
pub trait BackoffPolicy: Debug + Send + Sync {
    fn delay(&self, retry: u32) -> Duration;
}

/// Capped exponential backoff with full jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialJitterBackoff {
    base_ms: u64,
    max_ms: u64,
}

impl ExponentialJitterBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base_ms: u64::try_from(base.as_millis()).unwrap_or(u64::MAX),
            max_ms: u64::try_from(max.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl Default for ExponentialJitterBackoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(30))
    }
}

impl BackoffPolicy for ExponentialJitterBackoff {
    fn delay(&self, retry: u32) -> Duration {
        calculate_backoff(retry, self.base_ms, self.max_ms)
    }
}

/// The same delay before every retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedBackoff(pub Duration);

impl BackoffPolicy for FixedBackoff {
    fn delay(&self, _retry: u32) -> Duration {
        self.0
    }
}

/// Retry immediately.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoBackoff;

impl BackoffPolicy for NoBackoff {
    fn delay(&self, _retry: u32) -> Duration {
        Duration::ZERO
    }
}

/// Calculate exponential backoff delay with full jitter.
pub fn calculate_backoff(retry: u32, base_ms: u64, max_ms: u64) -> Duration {
    let random = rand::thread_rng().gen_range(0.0..1.0);
    Duration::from_millis(jittered_delay_ms(retry, base_ms, max_ms, random))
}

/// Deterministic core of [`calculate_backoff`] for a given `random` in `[0, 1]`.
pub fn jittered_delay_ms(retry: u32, base_ms: u64, max_ms: u64, random: f64) -> u64 {
    let exponent = retry.saturating_add(1).min(MAX_EXPONENT);
    let ceiling = 2f64.powi(exponent as i32) * base_ms as f64;
    let delay = (random.clamp(0.0, 1.0) * ceiling).min(max_ms as f64);
    delay as u64
}
