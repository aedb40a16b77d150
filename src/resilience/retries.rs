//! Retry decision logic.
//!
//! # Responsibilities
//! - Describe a failed attempt ([`RetryContext`]) to a pluggable validator
//! - Provide the stock validators (status predicate, universal, endpoint list)
//! - Allow a single request to disable or replace the client's validator
//!
//! The validator is the only authority on retryability for non-401 failures.
//! Idempotency of retried requests is the caller's concern.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::SdkError;
use crate::http::request::HttpMethod;

/// Default cap on retries used by the stock validators.
pub const MAX_RETRY_ATTEMPTS: u32 = 5;

/// Read-only POST endpoints that are safe to retry.
pub const DEFAULT_RETRY_ENDPOINTS: &[&str] = &[
    "/assets/list",
    "/assets/byids",
    "/assets/search",
    "/events/list",
    "/events/byids",
    "/events/search",
    "/files/list",
    "/files/byids",
    "/files/search",
    "/files/initupload",
    "/files/downloadlink",
    "/timeseries/list",
    "/timeseries/byids",
    "/timeseries/search",
    "/timeseries/data",
    "/timeseries/data/list",
    "/timeseries/data/latest",
    "/timeseries/data/delete",
];

const RETRYABLE_METHODS: [HttpMethod; 5] = [
    HttpMethod::Get,
    HttpMethod::Head,
    HttpMethod::Options,
    HttpMethod::Delete,
    HttpMethod::Put,
];

/// Everything a validator may inspect about a failed attempt.
#[derive(Debug)]
pub struct RetryContext<'a> {
    /// Number of retries already performed for this request.
    pub attempt: u32,
    /// The failure of the attempt that just finished.
    pub error: &'a SdkError,
    /// Time since the first attempt was issued.
    pub elapsed: Duration,
    /// Method of the request.
    pub method: HttpMethod,
    /// Path of the request as given by the caller.
    pub path: &'a str,
}

impl RetryContext<'_> {
    /// HTTP status of the failure, `None` for network errors.
    pub fn status(&self) -> Option<u16> {
        self.error.status()
    }

    pub fn is_network_error(&self) -> bool {
        matches!(self.error, SdkError::Network(_))
    }
}

/// Decides whether a failed attempt should be retried.
pub type RetryValidator = Arc<dyn Fn(&RetryContext<'_>) -> bool + Send + Sync>;

/// Per-request override of the client's validator.
#[derive(Clone, Default)]
pub enum RetryOverride {
    /// Use the client's validator.
    #[default]
    Inherit,
    /// Never retry this request.
    Disabled,
    /// Use this validator instead of the client's.
    Custom(RetryValidator),
}

impl fmt::Debug for RetryOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryOverride::Inherit => f.write_str("Inherit"),
            RetryOverride::Disabled => f.write_str("Disabled"),
            RetryOverride::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Wrap a closure as a [`RetryValidator`].
pub fn retry_validator<F>(f: F) -> RetryValidator
where
    F: Fn(&RetryContext<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Retry HTTP failures whose status satisfies `predicate`. Network errors are not retried.
pub fn status_validator<F>(predicate: F) -> RetryValidator
where
    F: Fn(u16) -> bool + Send + Sync + 'static,
{
    retry_validator(move |ctx| ctx.status().is_some_and(&predicate))
}

/// Never retry anything.
pub fn never_retry() -> RetryValidator {
    retry_validator(|_| false)
}

/// Retry 429 for every method; retry network errors and 1xx/429/5xx for
/// idempotent methods (GET, HEAD, OPTIONS, DELETE, PUT).
pub fn universal_retry_validator(max_retries: u32) -> RetryValidator {
    retry_validator(move |ctx| universal_rule(ctx, max_retries))
}

/// Universal rules plus POST requests whose path contains one of `endpoints`
/// (case-insensitive).
pub fn endpoint_retry_validator<I, S>(endpoints: I, max_retries: u32) -> RetryValidator
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let endpoints: Vec<String> = endpoints
        .into_iter()
        .map(|e| e.into().to_ascii_uppercase())
        .collect();

    retry_validator(move |ctx| {
        if ctx.attempt >= max_retries {
            return false;
        }
        if let Some(status) = ctx.status() {
            if !is_retryable_status(status) {
                return false;
            }
        }
        if universal_rule(ctx, max_retries) {
            return true;
        }
        if ctx.method != HttpMethod::Post {
            return false;
        }
        let path = ctx.path.to_ascii_uppercase();
        endpoints.iter().any(|endpoint| path.contains(endpoint.as_str()))
    })
}

/// Endpoint validator over [`DEFAULT_RETRY_ENDPOINTS`] with [`MAX_RETRY_ATTEMPTS`].
pub fn default_retry_validator() -> RetryValidator {
    endpoint_retry_validator(DEFAULT_RETRY_ENDPOINTS.iter().copied(), MAX_RETRY_ATTEMPTS)
}

fn universal_rule(ctx: &RetryContext<'_>, max_retries: u32) -> bool {
    if ctx.attempt >= max_retries {
        return false;
    }
    if ctx.status() == Some(429) {
        return true;
    }
    if !RETRYABLE_METHODS.contains(&ctx.method) {
        return false;
    }
    match ctx.status() {
        Some(status) => is_retryable_status(status),
        None => ctx.is_network_error(),
    }
}

/// 1xx, 429 and 5xx.
pub fn is_retryable_status(status: u16) -> bool {
    (100..200).contains(&status) || status == 429 || (500..600).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HttpError, NetworkError, ValidationError};
    use reqwest::header::HeaderMap;
    use serde_json::Value;

    fn http(status: u16) -> SdkError {
        HttpError::new(status, Value::Null, HeaderMap::new()).into()
    }

    fn ctx<'a>(error: &'a SdkError, method: HttpMethod, path: &'a str, attempt: u32) -> RetryContext<'a> {
        RetryContext {
            attempt,
            error,
            elapsed: Duration::ZERO,
            method,
            path,
        }
    }

    #[test]
    fn test_status_validator() {
        let validator = status_validator(|s| s == 500);
        let e500 = http(500);
        let e400 = http(400);
        let timeout = SdkError::from(NetworkError::Timeout("slow".into()));
        assert!(validator(&ctx(&e500, HttpMethod::Get, "/", 0)));
        assert!(!validator(&ctx(&e400, HttpMethod::Get, "/", 0)));
        assert!(!validator(&ctx(&timeout, HttpMethod::Get, "/", 0)));
    }

    #[test]
    fn test_universal_retries_idempotent_methods() {
        let validator = universal_retry_validator(MAX_RETRY_ATTEMPTS);
        let e503 = http(503);
        assert!(validator(&ctx(&e503, HttpMethod::Get, "/assets", 0)));
        assert!(validator(&ctx(&e503, HttpMethod::Put, "/assets", 0)));
        assert!(!validator(&ctx(&e503, HttpMethod::Post, "/assets", 0)));
        assert!(!validator(&ctx(&e503, HttpMethod::Patch, "/assets", 0)));
    }

    #[test]
    fn test_universal_always_retries_429() {
        let validator = universal_retry_validator(MAX_RETRY_ATTEMPTS);
        let e429 = http(429);
        assert!(validator(&ctx(&e429, HttpMethod::Post, "/assets", 0)));
        assert!(!validator(&ctx(&e429, HttpMethod::Post, "/assets", MAX_RETRY_ATTEMPTS)));
    }

    #[test]
    fn test_universal_rejects_client_errors() {
        let validator = universal_retry_validator(MAX_RETRY_ATTEMPTS);
        for status in [400, 403, 404, 409, 422] {
            let err = http(status);
            assert!(!validator(&ctx(&err, HttpMethod::Get, "/", 0)), "{status}");
        }
    }

    #[test]
    fn test_universal_network_errors() {
        let validator = universal_retry_validator(MAX_RETRY_ATTEMPTS);
        let err = SdkError::from(NetworkError::Connect("refused".into()));
        assert!(validator(&ctx(&err, HttpMethod::Get, "/", 0)));
        assert!(!validator(&ctx(&err, HttpMethod::Post, "/", 0)));

        let local = SdkError::from(ValidationError::InvalidRequest("x".into()));
        assert!(!validator(&ctx(&local, HttpMethod::Get, "/", 0)));
    }

    #[test]
    fn test_endpoint_validator_matches_post_paths() {
        let validator = default_retry_validator();
        let e500 = http(500);
        assert!(validator(&ctx(&e500, HttpMethod::Post, "/api/v1/projects/p/assets/byids", 0)));
        assert!(validator(&ctx(&e500, HttpMethod::Post, "/ASSETS/LIST", 0)));
        assert!(!validator(&ctx(&e500, HttpMethod::Post, "/assets", 0)));
        assert!(!validator(&ctx(&e500, HttpMethod::Post, "/assets/byids", MAX_RETRY_ATTEMPTS)));

        let e400 = http(400);
        assert!(!validator(&ctx(&e400, HttpMethod::Post, "/assets/list", 0)));
    }

    #[test]
    fn test_endpoint_validator_retries_network_errors_for_listed_posts() {
        let validator = endpoint_retry_validator(["/things/list"], 2);
        let err = SdkError::from(NetworkError::Timeout("slow".into()));
        assert!(validator(&ctx(&err, HttpMethod::Post, "/things/list", 1)));
        assert!(!validator(&ctx(&err, HttpMethod::Post, "/things", 1)));
        assert!(!validator(&ctx(&err, HttpMethod::Post, "/things/list", 2)));
    }

    #[test]
    fn test_never_retry() {
        let err = http(503);
        assert!(!never_retry()(&ctx(&err, HttpMethod::Get, "/", 0)));
    }

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(100));
        assert!(is_retryable_status(429));
        assert!(is_retryable_status(599));
        assert!(!is_retryable_status(200));
        assert!(!is_retryable_status(430));
        assert!(!is_retryable_status(600));
    }
}
