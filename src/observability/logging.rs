//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the `tracing` subscriber for binaries
//! - Let `RUST_LOG` override the configured level

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a global subscriber with an env-overridable filter.
///
/// `RUST_LOG` wins over `default_level` when set. Fails if a global
/// subscriber is already installed.
pub fn init_logging(default_level: &str) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
}
