//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) or ClientConfig::default()
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ClientConfig (validated, immutable)
//!     → consumed once by ClientBuilder::build
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the client is built
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::BatchConfig;
pub use schema::ClientConfig;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::TimeoutConfig;
pub use validation::{validate_config, ConfigViolation};
