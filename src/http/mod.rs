//! HTTP access subsystem.
//!
//! # Data Flow
//! ```text
//! RequestSpec (request.rs)
//!     → client.rs (retry loop, 401 hook, header preparation)
//!     → transport.rs (URL resolution, one exchange over reqwest)
//!     → response.rs (JSON or text-fallback body)
//!     → HttpResponse back to the caller
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{ClientBuilder, RetryableHttpClient};
pub use request::{HttpMethod, RequestSpec};
pub use response::HttpResponse;
pub use transport::{PreparedRequest, ReqwestTransport, Transport};
