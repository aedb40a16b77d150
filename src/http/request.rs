//! Request description.
//!
//! A [`RequestSpec`] is built once per call and never mutated by the client;
//! the client works on a prepared copy (default headers, credentials).

use std::fmt;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use crate::error::{SdkResult, ValidationError};
use crate::resilience::retries::RetryOverride;

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Head => reqwest::Method::HEAD,
            HttpMethod::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// One HTTP call: method, path, query, optional JSON body and header overrides.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: HttpMethod,
    /// Path relative to the base URL, or an absolute `http(s)://` URL.
    pub path: String,
    pub query: Vec<(String, Value)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
    /// Overrides the transport's request timeout.
    pub timeout: Option<Duration>,
    /// Send credentials even when the URL is not on the base URL's origin.
    pub with_credentials: bool,
    pub retry: RetryOverride,
}

impl RequestSpec {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
            timeout: None,
            with_credentials: false,
            retry: RetryOverride::Inherit,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// Add a query parameter. `null` values are dropped when the URL is built.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add or replace a header.
    ///
    /// ## Errors
    ///
    /// Returns a validation error if the name or value is not a valid header.
    pub fn header(mut self, name: &str, value: &str) -> SdkResult<Self> {
        let name = HeaderName::try_from(name)
            .map_err(|e| ValidationError::InvalidRequest(format!("invalid header name: {e}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| ValidationError::InvalidRequest(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_credentials(mut self) -> Self {
        self.with_credentials = true;
        self
    }

    pub fn retry(mut self, retry: RetryOverride) -> Self {
        self.retry = retry;
        self
    }

    /// Query pairs as they go on the wire, `null` values dropped.
    pub fn rendered_query(&self) -> Vec<(String, String)> {
        self.query
            .iter()
            .filter_map(|(key, value)| render_query_value(value).map(|v| (key.clone(), v)))
            .collect()
    }
}

/// Render a query value: scalars verbatim, arrays as `[a,b]`, objects as JSON text.
pub fn render_query_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let rendered: Vec<String> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect();
            Some(format!("[{}]", rendered.join(",")))
        }
        Value::Object(_) => Some(value.to_string()),
    }
}
