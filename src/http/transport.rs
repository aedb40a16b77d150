//! Transport seam.
//!
//! The client resolves URLs and headers, the transport performs exactly one
//! HTTP exchange. Any implementation may be swapped in (tests use scripted
//! transports that never touch the network).

use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::header::HeaderMap;
use serde_json::Value;
use url::Url;

use crate::config::TimeoutConfig;
use crate::error::{HttpError, NetworkError, SdkResult, ValidationError};
use crate::http::request::HttpMethod;
use crate::http::response::{parse_body, HttpResponse};

/// A fully resolved request, ready for the wire.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub timeout: Option<Duration>,
}

/// Performs a single HTTP exchange.
///
/// Implementations return `Ok` for 2xx statuses, [`HttpError`] for any other
/// status and [`NetworkError`] when no status was received.
pub trait Transport: Send + Sync {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, SdkResult<HttpResponse>>;
}

/// [`Transport`] backed by a pooled `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the configured connect and request timeouts.
    pub fn new(timeouts: &TimeoutConfig) -> SdkResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .build()
            .map_err(NetworkError::from)?;
        Ok(Self { client })
    }

    /// Wrap an existing `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: PreparedRequest) -> BoxFuture<'_, SdkResult<HttpResponse>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .request(request.method.into(), request.url)
                .headers(request.headers);
            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }
            if let Some(body) = &request.body {
                builder = builder.json(body);
            }

            let response = builder.send().await.map_err(NetworkError::from)?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let text = response.text().await.map_err(NetworkError::from)?;
            let data = parse_body(&text);

            if (200..300).contains(&status) {
                Ok(HttpResponse {
                    status,
                    headers,
                    data,
                })
            } else {
                Err(HttpError::new(status, data, headers).into())
            }
        })
    }
}

/// Resolve `path` against `base`.
///
/// Absolute `http://`/`https://` paths are used verbatim. Otherwise the
/// base's trailing slash and the path's trailing slashes are dropped and the
/// two are joined with a single `/`.
pub fn resolve_url(base: &Url, path: &str) -> SdkResult<Url> {
    let lower = path.to_ascii_lowercase();
    let raw = if lower.starts_with("http://") || lower.starts_with("https://") {
        path.to_string()
    } else {
        let base = base.as_str().trim_end_matches('/');
        let path = path.trim_end_matches('/');
        if path.is_empty() {
            base.to_string()
        } else if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    };
    Url::parse(&raw)
        .map_err(|e| ValidationError::InvalidRequest(format!("invalid url '{raw}': {e}")).into())
}

/// Scheme, host and port all match.
pub fn is_same_origin(a: &Url, b: &Url) -> bool {
    a.origin() == b.origin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_resolve_relative_paths() {
        let b = base("https://api.example.com/api/v1/projects/demo");
        assert_eq!(
            resolve_url(&b, "/assets").unwrap().as_str(),
            "https://api.example.com/api/v1/projects/demo/assets"
        );
        assert_eq!(
            resolve_url(&b, "assets/list/").unwrap().as_str(),
            "https://api.example.com/api/v1/projects/demo/assets/list"
        );

        let b = base("https://api.example.com/");
        assert_eq!(
            resolve_url(&b, "/login/status").unwrap().as_str(),
            "https://api.example.com/login/status"
        );
    }

    #[test]
    fn test_resolve_absolute_path_verbatim() {
        let b = base("https://api.example.com");
        assert_eq!(
            resolve_url(&b, "https://files.example.org/upload?x=1").unwrap().as_str(),
            "https://files.example.org/upload?x=1"
        );
    }

    #[test]
    fn test_resolve_invalid() {
        let b = base("https://api.example.com");
        assert!(resolve_url(&b, "http://").is_err());
    }

    #[test]
    fn test_same_origin() {
        let a = base("https://api.example.com/a");
        assert!(is_same_origin(&a, &base("https://api.example.com/b/c")));
        assert!(!is_same_origin(&a, &base("http://api.example.com/a")));
        assert!(!is_same_origin(&a, &base("https://api.example.com:8443/a")));
        assert!(!is_same_origin(&a, &base("https://other.example.com/a")));
    }

    #[tokio::test]
    async fn test_reqwest_transport_connect_failure() {
        let transport = ReqwestTransport::new(&TimeoutConfig {
            connect_secs: 1,
            request_secs: 1,
        })
        .unwrap();
        let request = PreparedRequest {
            method: HttpMethod::Get,
            // port 9 (discard) is closed on test machines
            url: base("http://127.0.0.1:9/"),
            headers: HeaderMap::new(),
            body: None,
            timeout: None,
        };
        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, crate::error::SdkError::Network(_)));
    }
}
