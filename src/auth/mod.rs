//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! RetryableHttpClient::prepare
//!     → AuthenticationProvider::get_token (Authorization: Bearer <token>)
//! 401 response
//!     → token_refresh_handler → AuthenticationProvider::login
//!     → RetryOnce (new token picked up on re-issue) or Reject
//! ```

use std::fmt;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::sync::RwLock;

use crate::error::SdkResult;
use crate::resilience::unauthorized::{unauthorized_handler, UnauthorizedAction, UnauthorizedHandler};

/// Supplies bearer tokens to the client.
pub trait AuthenticationProvider: Send + Sync {
    /// The current token, `None` when the provider has none.
    fn get_token(&self) -> BoxFuture<'_, SdkResult<Option<String>>>;

    /// Acquire a fresh token. Called after a 401.
    fn login(&self) -> BoxFuture<'_, SdkResult<Option<String>>>;
}

/// A provider holding one fixed token. `login` returns the same token.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthenticationProvider for StaticTokenProvider {
    fn get_token(&self) -> BoxFuture<'_, SdkResult<Option<String>>> {
        Box::pin(async move { Ok(Some(self.token.clone())) })
    }

    fn login(&self) -> BoxFuture<'_, SdkResult<Option<String>>> {
        self.get_token()
    }
}

type TokenCallback = Arc<dyn Fn() -> BoxFuture<'static, SdkResult<String>> + Send + Sync>;

/// A provider that obtains tokens from a callback and caches the latest one.
///
/// The first `get_token` call invokes the callback; `login` always invokes
/// it and replaces the cached token.
pub struct TokenCallbackProvider {
    callback: TokenCallback,
    cached: RwLock<Option<String>>,
}

impl TokenCallbackProvider {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, SdkResult<String>> + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
            cached: RwLock::new(None),
        }
    }

    async fn refresh(&self) -> SdkResult<Option<String>> {
        let token = (self.callback)().await?;
        *self.cached.write().await = Some(token.clone());
        tracing::debug!("Access token refreshed");
        Ok(Some(token))
    }
}

impl fmt::Debug for TokenCallbackProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCallbackProvider").finish_non_exhaustive()
    }
}

impl AuthenticationProvider for TokenCallbackProvider {
    fn get_token(&self) -> BoxFuture<'_, SdkResult<Option<String>>> {
        Box::pin(async move {
            if let Some(token) = self.cached.read().await.clone() {
                return Ok(Some(token));
            }
            self.refresh().await
        })
    }

    fn login(&self) -> BoxFuture<'_, SdkResult<Option<String>>> {
        Box::pin(self.refresh())
    }
}

/// Unauthorized handler that re-authenticates through `provider`.
///
/// Answers `RetryOnce` when `login` yields a token, `Reject` otherwise.
pub fn token_refresh_handler(provider: Arc<dyn AuthenticationProvider>) -> UnauthorizedHandler {
    unauthorized_handler(move |err| {
        let provider = Arc::clone(&provider);
        let request_id = err.request_id.clone();
        Box::pin(async move {
            match provider.login().await {
                Ok(Some(_)) => {
                    tracing::info!(request_id = ?request_id, "Re-authenticated after 401");
                    UnauthorizedAction::RetryOnce
                }
                Ok(None) => {
                    tracing::warn!(request_id = ?request_id, "Login returned no token");
                    UnauthorizedAction::Reject
                }
                Err(e) => {
                    tracing::warn!(request_id = ?request_id, error = %e, "Login failed after 401");
                    UnauthorizedAction::Reject
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HttpError, SdkError};
    use reqwest::header::HeaderMap;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_provider(calls: Arc<AtomicUsize>) -> TokenCallbackProvider {
        TokenCallbackProvider::new(move || {
            let calls = Arc::clone(&calls);
            Box::pin(async move {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(format!("token-{n}"))
            })
        })
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new("abc");
        assert_eq!(provider.get_token().await.unwrap().as_deref(), Some("abc"));
        assert_eq!(provider.login().await.unwrap().as_deref(), Some("abc"));
        assert!(!format!("{provider:?}").contains("abc"));
    }

    #[tokio::test]
    async fn test_callback_provider_caches_until_login() {
        let calls = Arc::new(AtomicUsize::new(0));
        let provider = counting_provider(Arc::clone(&calls));

        assert_eq!(provider.get_token().await.unwrap().as_deref(), Some("token-1"));
        assert_eq!(provider.get_token().await.unwrap().as_deref(), Some("token-1"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert_eq!(provider.login().await.unwrap().as_deref(), Some("token-2"));
        assert_eq!(provider.get_token().await.unwrap().as_deref(), Some("token-2"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_handler_outcomes() {
        let err = HttpError::new(401, Value::Null, HeaderMap::new());

        let ok: Arc<dyn AuthenticationProvider> = Arc::new(StaticTokenProvider::new("t"));
        assert_eq!(token_refresh_handler(ok)(&err).await, UnauthorizedAction::RetryOnce);

        let failing: Arc<dyn AuthenticationProvider> = Arc::new(TokenCallbackProvider::new(|| {
            Box::pin(async { Err(SdkError::Auth("expired refresh token".into())) })
        }));
        assert_eq!(token_refresh_handler(failing)(&err).await, UnauthorizedAction::Reject);
    }
}
