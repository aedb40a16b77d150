//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, attempts >= 1, delays ordered)
//! - Check the base URL is an absolute http(s) URL
//!
//! Returns every violation, not just the first.

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a [`ClientConfig`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigViolation {
    #[error("base_url '{0}' is not an absolute http(s) URL")]
    InvalidBaseUrl(String),

    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("retries.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("retries.base_delay_ms ({base}) exceeds retries.max_delay_ms ({max})")]
    DelayOrder { base: u64, max: u64 },

    #[error("batch.max_items must be greater than zero")]
    ZeroBatch,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
}

/// Validate a configuration, collecting all violations.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ConfigViolation>> {
    let mut violations = Vec::new();

    match Url::parse(&config.base_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
        _ => violations.push(ConfigViolation::InvalidBaseUrl(config.base_url.clone())),
    }

    if config.timeouts.connect_secs == 0 {
        violations.push(ConfigViolation::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        violations.push(ConfigViolation::ZeroTimeout("request_secs"));
    }

    if config.retries.max_attempts == 0 {
        violations.push(ConfigViolation::ZeroAttempts);
    }
    if config.retries.base_delay_ms > config.retries.max_delay_ms {
        violations.push(ConfigViolation::DelayOrder {
            base: config.retries.base_delay_ms,
            max: config.retries.max_delay_ms,
        });
    }

    if config.batch.max_items == 0 {
        violations.push(ConfigViolation::ZeroBatch);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        violations.push(ConfigViolation::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
