//! HTTP 401 interception.
//!
//! A 401 is offered to the unauthorized handler before the retry validator
//! sees it. The handler answers with an [`UnauthorizedAction`]:
//!
//! ```text
//! Reject    → the 401 is returned to the caller
//! RetryOnce → the request is re-issued (at most once per request)
//! Proceed   → the 401 continues to the retry validator like any other failure
//! ```

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::error::HttpError;

/// Paths whose 401 responses are never offered to the handler.
const AUTH_STATUS_PATHS: [&str; 2] = ["/logout/url", "/login/status"];

/// Outcome of the unauthorized handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnauthorizedAction {
    /// Hand the failure to the retry validator.
    Proceed,
    /// Re-issue the request, typically after refreshing credentials.
    RetryOnce,
    /// Surface the 401 as a terminal failure.
    Reject,
}

/// Handler invoked with every 401 response.
pub type UnauthorizedHandler =
    Arc<dyn Fn(&HttpError) -> BoxFuture<'static, UnauthorizedAction> + Send + Sync>;

/// Wrap a closure as an [`UnauthorizedHandler`].
pub fn unauthorized_handler<F>(f: F) -> UnauthorizedHandler
where
    F: Fn(&HttpError) -> BoxFuture<'static, UnauthorizedAction> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The default handler: reject immediately.
pub fn reject_unauthorized() -> UnauthorizedHandler {
    unauthorized_handler(|_| Box::pin(async { UnauthorizedAction::Reject }))
}

/// A handler that always answers with `action`.
pub fn fixed_unauthorized_action(action: UnauthorizedAction) -> UnauthorizedHandler {
    unauthorized_handler(move |_| Box::pin(async move { action }))
}

/// Whether the path targets a login/logout status endpoint.
pub fn is_auth_status_path(path: &str) -> bool {
    let path = path.to_ascii_lowercase();
    AUTH_STATUS_PATHS.iter().any(|p| path.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use serde_json::Value;

    #[tokio::test]
    async fn test_default_rejects() {
        let err = HttpError::new(401, Value::Null, HeaderMap::new());
        let action = reject_unauthorized()(&err).await;
        assert_eq!(action, UnauthorizedAction::Reject);
    }

    #[tokio::test]
    async fn test_fixed_action() {
        let err = HttpError::new(401, Value::Null, HeaderMap::new());
        let handler = fixed_unauthorized_action(UnauthorizedAction::RetryOnce);
        assert_eq!(handler(&err).await, UnauthorizedAction::RetryOnce);
    }

    #[test]
    fn test_auth_status_paths() {
        assert!(is_auth_status_path("/login/status"));
        assert!(is_auth_status_path("/api/v1/projects/p/Logout/URL?redirect=x"));
        assert!(!is_auth_status_path("/assets/list"));
    }
}
