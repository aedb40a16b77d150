//! Error taxonomy shared by every layer of the client.
//!
//! # Propagation
//! ```text
//! ValidationError → raised locally, never reaches the transport
//! NetworkError    → transport failure, offered to the retry validator
//! HttpError       → non-2xx response, 401 routed to the unauthorized handler first
//! Decode          → 2xx body that does not match the expected shape
//! ```
//!
//! Retry exhaustion has no dedicated variant: the last `Network`/`Http`
//! failure is returned as-is.

use reqwest::header::HeaderMap;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Header carrying the server-side request identifier.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Result type for client operations.
pub type SdkResult<T> = Result<T, SdkError>;

/// Top-level error returned by every client operation.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Transport-level failure (timeout, DNS, connection reset).
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// A local precondition failed before anything was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A successful response body did not match the expected type.
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid configuration or builder input.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The authentication provider could not supply a token.
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl SdkError {
    /// HTTP status of the failure, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Http(e) => Some(e.status),
            _ => None,
        }
    }

    /// The underlying HTTP error, if any.
    pub fn as_http(&self) -> Option<&HttpError> {
        match self {
            SdkError::Http(e) => Some(e),
            _ => None,
        }
    }

    /// Whether this failure came off the wire and may be offered to a retry validator.
    pub fn is_transport_failure(&self) -> bool {
        matches!(self, SdkError::Network(_) | SdkError::Http(_))
    }
}

/// Failures that happen before a status line is received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NetworkError {
    /// The request (or connect) deadline expired.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Anything else the HTTP stack reported (body read, redirect loop, ...).
    #[error("network error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout(err.to_string())
        } else if err.is_connect() {
            NetworkError::Connect(err.to_string())
        } else {
            NetworkError::Other(err.to_string())
        }
    }
}

/// A non-2xx response.
#[derive(Debug, Clone, Error)]
#[error("Request failed | status code: {status}")]
pub struct HttpError {
    /// HTTP status code.
    pub status: u16,
    /// Response body, parsed as JSON when possible, otherwise the raw text.
    pub data: Value,
    /// Response headers.
    pub headers: HeaderMap,
    /// Value of the `x-request-id` response header, if present.
    pub request_id: Option<String>,
}

impl HttpError {
    /// Build an error from a raw response, extracting the request id header.
    pub fn new(status: u16, data: Value, headers: HeaderMap) -> Self {
        let request_id = headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Self {
            status,
            data,
            headers,
            request_id,
        }
    }

    /// The structured `{"error": {...}}` body, when the server sent one.
    pub fn api_error(&self) -> Option<ApiErrorBody> {
        let error = self.data.get("error")?;
        serde_json::from_value(error.clone()).ok()
    }

    /// Server-supplied message, or the generic status message.
    pub fn message(&self) -> String {
        match self.api_error() {
            Some(body) => format!("{} | code: {}", body.message, self.status),
            None => self.to_string(),
        }
    }
}

/// Error payload returned by the API alongside non-2xx statuses.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ApiErrorBody {
    /// Status code echoed by the server.
    #[serde(default)]
    pub code: Option<u16>,

    /// Human readable message.
    pub message: String,

    /// Identifiers the server could not find.
    #[serde(default)]
    pub missing: Vec<Value>,

    /// Identifiers that were submitted more than once or already exist.
    #[serde(default)]
    pub duplicated: Vec<Value>,
}

/// Local precondition violations. Never sent over the wire.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// An id or item list was empty.
    #[error("{operation}: at least one item is required")]
    EmptyBatch { operation: &'static str },

    /// An id or item list exceeded the per-call ceiling.
    #[error("{operation}: {len} items exceeds the per-call limit of {max}")]
    BatchTooLarge {
        operation: &'static str,
        len: usize,
        max: usize,
    },

    /// A per-call ceiling was configured as zero.
    #[error("{operation}: batch limit must be at least 1")]
    ZeroLimit { operation: &'static str },

    /// The request itself could not be built (bad URL, header, body shape).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_http_error_display() {
        let err = HttpError::new(400, json!({}), HeaderMap::new());
        assert_eq!(err.to_string(), "Request failed | status code: 400");

        let err = SdkError::from(err);
        assert_eq!(err.to_string(), "Request failed | status code: 400");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_request_id_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        let err = HttpError::new(500, Value::Null, headers);
        assert_eq!(err.request_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_api_error_body() {
        let data = json!({
            "error": {
                "code": 400,
                "message": "Ids not found",
                "missing": [{ "id": 7 }]
            }
        });
        let err = HttpError::new(400, data, HeaderMap::new());
        let body = err.api_error().unwrap();
        assert_eq!(body.message, "Ids not found");
        assert_eq!(body.missing, vec![json!({ "id": 7 })]);
        assert!(body.duplicated.is_empty());
        assert_eq!(err.message(), "Ids not found | code: 400");
    }

    #[test]
    fn test_api_error_missing_falls_back() {
        let err = HttpError::new(502, Value::String("Bad Gateway".into()), HeaderMap::new());
        assert!(err.api_error().is_none());
        assert_eq!(err.message(), "Request failed | status code: 502");
    }

    #[test]
    fn test_validation_display() {
        let err = ValidationError::BatchTooLarge {
            operation: "create",
            len: 1001,
            max: 1000,
        };
        assert_eq!(
            err.to_string(),
            "create: 1001 items exceeds the per-call limit of 1000"
        );
        assert!(!SdkError::from(err).is_transport_failure());
    }
}
