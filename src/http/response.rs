//! Normalized response.

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{SdkResult, X_REQUEST_ID};

/// A successful (2xx) response with its body parsed as JSON.
///
/// Bodies that are not JSON are kept as a JSON string holding the raw text;
/// empty bodies become `null`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub data: Value,
}

impl HttpResponse {
    /// Deserialize the body into `T`.
    pub fn json<T: DeserializeOwned>(self) -> SdkResult<T> {
        Ok(serde_json::from_value(self.data)?)
    }

    /// Value of the `x-request-id` response header.
    pub fn request_id(&self) -> Option<&str> {
        self.headers.get(X_REQUEST_ID).and_then(|v| v.to_str().ok())
    }
}

/// Parse a raw body: JSON when possible, otherwise the text itself.
pub fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
