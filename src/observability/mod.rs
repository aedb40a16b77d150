//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! RetryableHttpClient / ListCursor produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters and histograms via `metrics`)
//!
//! Consumers:
//!     → whatever subscriber / recorder the embedding application installs
//! ```
//!
//! # Design Decisions
//! - The library never installs a metrics recorder; without one every
//!   update is a no-op
//! - `init_logging` is a convenience for binaries and tests, not called by
//!   the client itself

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
