//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Failed attempt in RetryableHttpClient:
//!     → 401? unauthorized.rs (handler decides Reject / RetryOnce / Proceed)
//!     → retries.rs (validator decides retry or surface)
//!     → backoff.rs (how long to sleep before the next attempt)
//! ```
//!
//! # Design Decisions
//! - The validator is pluggable and is the sole authority on retryability
//! - Attempt count is capped by the client independently of the validator
//! - A 401 re-issue happens at most once per request

pub mod backoff;
pub mod retries;
pub mod unauthorized;

pub use backoff::{BackoffPolicy, ExponentialJitterBackoff, FixedBackoff, NoBackoff};
pub use retries::{
    default_retry_validator, endpoint_retry_validator, never_retry, retry_validator,
    status_validator, universal_retry_validator, RetryContext, RetryOverride, RetryValidator,
    MAX_RETRY_ATTEMPTS,
};
pub use unauthorized::{
    fixed_unauthorized_action, reject_unauthorized, unauthorized_handler, UnauthorizedAction,
    UnauthorizedHandler,
};
