//! Retry-aware HTTP client.
//!
//! # Request Flow
//! ```text
//! request(spec)
//!     → prepare: resolve URL, merge headers, attach bearer token
//!     → Transport::send
//!     → 2xx: return
//!     → 401: unauthorized handler (Reject / RetryOnce / Proceed)
//!     → validator + attempt cap: surface the error, or sleep(backoff) and loop
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::AuthenticationProvider;
use crate::config::{validate_config, ClientConfig, ConfigError};
use crate::error::{SdkError, SdkResult, ValidationError};
use crate::http::request::{HttpMethod, RequestSpec};
use crate::http::response::HttpResponse;
use crate::http::transport::{is_same_origin, resolve_url, PreparedRequest, ReqwestTransport, Transport};
use crate::observability::metrics;
use crate::resilience::backoff::{BackoffPolicy, ExponentialJitterBackoff};
use crate::resilience::retries::{
    default_retry_validator, never_retry, RetryContext, RetryOverride, RetryValidator,
};
use crate::resilience::unauthorized::{
    is_auth_status_path, reject_unauthorized, UnauthorizedAction, UnauthorizedHandler,
};

/// Header carrying the application identifier.
pub const X_APP_ID: &str = "x-app-id";

/// API key header, stripped together with `Authorization` on foreign origins.
pub const API_KEY: &str = "api-key";

const DEFAULT_USER_AGENT: &str = concat!("resource-api-client/", env!("CARGO_PKG_VERSION"));

/// HTTP client with pluggable retry validation, backoff and 401 handling.
///
/// Configuration is fixed at construction. The client is cheap to share
/// behind an `Arc` and every call owns its own retry state.
pub struct RetryableHttpClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    validator: RetryValidator,
    backoff: Arc<dyn BackoffPolicy>,
    max_attempts: u32,
    unauthorized: UnauthorizedHandler,
    auth: Option<Arc<dyn AuthenticationProvider>>,
    default_headers: HeaderMap,
    batch_max: usize,
}

impl fmt::Debug for RetryableHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryableHttpClient")
            .field("base_url", &self.base_url.as_str())
            .field("backoff", &self.backoff)
            .field("max_attempts", &self.max_attempts)
            .field("authenticated", &self.auth.is_some())
            .finish_non_exhaustive()
    }
}

impl RetryableHttpClient {
    /// Builder over default configuration with the given base URL.
    pub fn builder(base_url: impl Into<String>) -> ClientBuilder {
        let config = ClientConfig {
            base_url: base_url.into(),
            ..ClientConfig::default()
        };
        ClientBuilder::from_config(config)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-call item ceiling for batch endpoints.
    pub fn batch_max(&self) -> usize {
        self.batch_max
    }

    /// Send the request, retrying under the configured policy.
    ///
    /// ## Errors
    ///
    /// Returns the last observed [`SdkError::Http`] or [`SdkError::Network`]
    /// once retries stop, or a local error if the request could not be built.
    pub async fn request(&self, spec: &RequestSpec) -> SdkResult<HttpResponse> {
        let started = Instant::now();
        let result = self.execute(spec, started).await;
        let status = match &result {
            Ok(response) => response.status,
            Err(e) => e.status().unwrap_or(0),
        };
        metrics::record_request(spec.method.as_str(), status, started);
        result
    }

    pub async fn get(&self, path: &str) -> SdkResult<HttpResponse> {
        self.request(&RequestSpec::get(path)).await
    }

    pub async fn post(&self, path: &str, body: Value) -> SdkResult<HttpResponse> {
        self.request(&RequestSpec::post(path).body(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> SdkResult<HttpResponse> {
        self.request(&RequestSpec::new(HttpMethod::Put, path).body(body))
            .await
    }

    pub async fn patch(&self, path: &str, body: Value) -> SdkResult<HttpResponse> {
        self.request(&RequestSpec::new(HttpMethod::Patch, path).body(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> SdkResult<HttpResponse> {
        self.request(&RequestSpec::new(HttpMethod::Delete, path))
            .await
    }

    /// GET `path` and deserialize the body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> SdkResult<T> {
        self.get(path).await?.json()
    }

    /// POST `body` to `path` and deserialize the response body.
    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: Value) -> SdkResult<T> {
        self.post(path, body).await?.json()
    }

    async fn execute(&self, spec: &RequestSpec, started: Instant) -> SdkResult<HttpResponse> {
        let validator = match &spec.retry {
            RetryOverride::Inherit => Arc::clone(&self.validator),
            RetryOverride::Disabled => never_retry(),
            RetryOverride::Custom(validator) => Arc::clone(validator),
        };
        let method = spec.method.as_str();
        let mut attempt: u32 = 0;
        let mut reissued = false;

        loop {
            let prepared = self.prepare(spec).await?;
            tracing::debug!(method, url = %prepared.url, attempt, "Sending request");

            let err = match self.transport.send(prepared).await {
                Ok(response) => return Ok(response),
                Err(e) if !e.is_transport_failure() => return Err(e),
                Err(e) => e,
            };

            if err.status() == Some(401) && !is_auth_status_path(&spec.path) {
                if reissued {
                    tracing::warn!(method, path = %spec.path, "Second 401 for request, rejecting");
                    return Err(err);
                }
                if let Some(http) = err.as_http() {
                    match (self.unauthorized)(http).await {
                        UnauthorizedAction::Reject => return Err(err),
                        UnauthorizedAction::RetryOnce => {
                            reissued = true;
                            tracing::info!(method, path = %spec.path, "Re-issuing request after 401");
                            continue;
                        }
                        UnauthorizedAction::Proceed => {}
                    }
                }
            }

            let ctx = RetryContext {
                attempt,
                error: &err,
                elapsed: started.elapsed(),
                method: spec.method,
                path: &spec.path,
            };
            if attempt + 1 >= self.max_attempts || !validator(&ctx) {
                tracing::debug!(method, path = %spec.path, attempt, error = %err, "Request failed");
                return Err(err);
            }

            let delay = self.backoff.delay(attempt);
            let reason = match err.status() {
                Some(status) => status.to_string(),
                None => "network".to_string(),
            };
            tracing::info!(method, path = %spec.path, attempt, delay = ?delay, reason = %reason, "Retrying request");
            metrics::record_retry(method, reason);
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            attempt += 1;
        }
    }

    async fn prepare(&self, spec: &RequestSpec) -> SdkResult<PreparedRequest> {
        let mut url = resolve_url(&self.base_url, &spec.path)?;
        let query = spec.rendered_query();
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(&query);
        }

        let mut headers = self.default_headers.clone();
        for (name, value) in &spec.headers {
            headers.insert(name.clone(), value.clone());
        }

        let credentials_allowed = spec.with_credentials || is_same_origin(&self.base_url, &url);
        if !credentials_allowed {
            headers.remove(AUTHORIZATION);
            headers.remove(API_KEY);
        } else if !headers.contains_key(AUTHORIZATION) {
            if let Some(auth) = &self.auth {
                if let Some(token) = auth.get_token().await? {
                    let value = HeaderValue::try_from(format!("Bearer {token}"))
                        .map_err(|e| SdkError::Auth(format!("token is not a valid header value: {e}")))?;
                    headers.insert(AUTHORIZATION, value);
                }
            }
        }

        Ok(PreparedRequest {
            method: spec.method,
            url,
            headers,
            body: spec.body.clone(),
            timeout: spec.timeout,
        })
    }
}

/// Builder for [`RetryableHttpClient`].
pub struct ClientBuilder {
    config: ClientConfig,
    transport: Option<Arc<dyn Transport>>,
    validator: Option<RetryValidator>,
    backoff: Option<Arc<dyn BackoffPolicy>>,
    max_attempts: Option<u32>,
    unauthorized: Option<UnauthorizedHandler>,
    auth: Option<Arc<dyn AuthenticationProvider>>,
    headers: Vec<(String, String)>,
}

impl ClientBuilder {
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            transport: None,
            validator: None,
            backoff: None,
            max_attempts: None,
            unauthorized: None,
            auth: None,
            headers: Vec::new(),
        }
    }

    /// Replace the HTTP transport (defaults to [`ReqwestTransport`]).
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn retry_validator(mut self, validator: RetryValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn backoff(mut self, backoff: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff = Some(backoff);
        self
    }

    /// Total attempts per request, the first one included.
    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn unauthorized_handler(mut self, handler: UnauthorizedHandler) -> Self {
        self.unauthorized = Some(handler);
        self
    }

    pub fn auth_provider(mut self, provider: Arc<dyn AuthenticationProvider>) -> Self {
        self.auth = Some(provider);
        self
    }

    /// Header sent with every request unless the request overrides it.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Validate configuration and build the client.
    ///
    /// ## Errors
    ///
    /// Returns [`SdkError::Config`] for invalid configuration and
    /// [`SdkError::Validation`] for malformed default headers.
    pub fn build(self) -> SdkResult<RetryableHttpClient> {
        let config = self.config;
        validate_config(&config).map_err(ConfigError::Validation)?;
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url '{}': {e}", config.base_url)))?;

        let max_attempts = match self.max_attempts {
            Some(0) => {
                return Err(ConfigError::Invalid("max_attempts must be at least 1".into()).into())
            }
            Some(n) => n,
            None if config.retries.enabled => config.retries.max_attempts,
            None => 1,
        };
        let validator = match self.validator {
            Some(validator) => validator,
            None if config.retries.enabled => default_retry_validator(),
            None => never_retry(),
        };
        let backoff = match self.backoff {
            Some(backoff) => backoff,
            None => Arc::new(ExponentialJitterBackoff::new(
                Duration::from_millis(config.retries.base_delay_ms),
                Duration::from_millis(config.retries.max_delay_ms),
            )),
        };
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&config.timeouts)?),
        };

        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        if !config.app_id.is_empty() {
            default_headers.insert(X_APP_ID, header_value(&config.app_id)?);
        }
        for (name, value) in &self.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| ValidationError::InvalidRequest(format!("invalid header name: {e}")))?;
            default_headers.insert(name, header_value(value)?);
        }

        tracing::debug!(base_url = %base_url, max_attempts, "Client built");

        Ok(RetryableHttpClient {
            base_url,
            transport,
            validator,
            backoff,
            max_attempts,
            unauthorized: self.unauthorized.unwrap_or_else(reject_unauthorized),
            auth: self.auth,
            default_headers,
            batch_max: config.batch.max_items,
        })
    }
}

fn header_value(value: &str) -> SdkResult<HeaderValue> {
    HeaderValue::try_from(value)
        .map_err(|e| ValidationError::InvalidRequest(format!("invalid header value: {e}")).into())
}
