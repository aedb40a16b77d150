//! Client library for a resource-oriented HTTP API.
//!
//! # Architecture Overview
//!
//! ```text
//!   caller
//!     │
//!     ▼
//!   ┌──────────────────────────┐      ┌──────────────────────┐
//!   │ resources (AssetsApi,…)  │─────▶│ resource::ResourceApi│── batch validation
//!   └──────────────────────────┘      └──────────┬───────────┘
//!                                                │ list → pagination::ListCursor
//!                                                ▼
//!                                     ┌──────────────────────┐
//!                                     │ http::client         │── resilience (validator,
//!                                     │ RetryableHttpClient  │   backoff, 401 handler)
//!                                     └──────────┬───────────┘── auth (bearer tokens)
//!                                                ▼
//!                                     ┌──────────────────────┐
//!                                     │ http::transport      │── reqwest
//!                                     └──────────────────────┘
//!
//!   Cross-cutting: config (TOML), error (SdkError), observability (tracing, metrics)
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod pagination;
pub mod resilience;
pub mod resource;
pub mod resources;

pub use config::ClientConfig;
pub use error::{SdkError, SdkResult};
pub use http::{ClientBuilder, RetryableHttpClient};
pub use pagination::{ListCursor, Page, ToVecLimit};
pub use resource::{IdEither, ListScope, ResourceApi};
pub use resources::ApiClient;
