//! Generic resource subsystem.
//!
//! # Data Flow
//! ```text
//! caller
//!     → api.rs (ResourceApi<T>: verb → endpoint + body)
//!     → limits.rs (batch validation, before any I/O)
//!     → RetryableHttpClient
//!     → ItemsWrapper<T> / Page<T> decoded into T
//! ```
//!
//! # Endpoints
//! | Verb          | Request                     |
//! |---------------|-----------------------------|
//! | list          | `POST <path>/list`          |
//! | list_with_get | `GET <path>?...`            |
//! | retrieve      | `POST <path>/byids`         |
//! | create        | `POST <path>`               |
//! | update        | `POST <path>/update`        |
//! | upsert        | `POST <path>/upsert`        |
//! | delete        | `POST <path>/delete`        |
//! | search        | `POST <path>/search`        |
//! | aggregate     | `POST <path>/aggregate`     |

pub mod api;
pub mod ids;
pub mod limits;

pub use api::{ListScope, ResourceApi, RetrieveOptions};
pub use ids::IdEither;
pub use limits::{validate_batch, BatchLimits, DEFAULT_BATCH_LIMIT};
