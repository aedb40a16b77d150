//! Generic CRUD and search surface shared by every resource.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SdkResult;
use crate::http::client::RetryableHttpClient;
use crate::http::request::RequestSpec;
use crate::pagination::{ItemsWrapper, ListCursor, Page};
use crate::resource::ids::IdEither;
use crate::resource::limits::{validate_batch, BatchLimits};

/// Filter, limit and extra parameters of a list call.
///
/// Rendered as the JSON body of `POST <path>/list` or as query parameters of
/// `GET <path>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListScope {
    params: Map<String, Value>,
}

impl ListScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(self, filter: Value) -> Self {
        self.param("filter", filter)
    }

    /// Page size requested from the server.
    pub fn limit(self, limit: u32) -> Self {
        self.param("limit", limit)
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Parameters with `cursor` added when following a page.
    pub fn with_cursor(&self, cursor: Option<&str>) -> Map<String, Value> {
        let mut params = self.params.clone();
        if let Some(cursor) = cursor {
            params.insert("cursor".to_string(), Value::String(cursor.to_string()));
        }
        params
    }
}

/// Extra flags for `retrieve`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetrieveOptions {
    /// Skip ids the server does not know instead of failing the call.
    pub ignore_unknown_ids: bool,
}

/// Typed access to one resource collection, e.g. `/assets`.
///
/// Every verb goes through the shared [`RetryableHttpClient`]. Batch verbs
/// are validated against [`BatchLimits`] before anything is sent.
pub struct ResourceApi<T> {
    client: Arc<RetryableHttpClient>,
    path: String,
    limits: BatchLimits,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceApi<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            path: self.path.clone(),
            limits: self.limits,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResourceApi<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceApi")
            .field("path", &self.path)
            .field("limits", &self.limits)
            .finish()
    }
}

impl<T> ResourceApi<T>
where
    T: DeserializeOwned + Send + 'static,
{
    /// Resource at `path`, with the client's batch ceiling for every operation.
    ///
    /// The ceiling comes from a validated [`ClientConfig`](crate::ClientConfig),
    /// so it is never zero.
    pub fn new(client: Arc<RetryableHttpClient>, path: impl Into<String>) -> Self {
        let limits = BatchLimits::uniform(client.batch_max());
        Self::from_parts(client, path.into(), limits)
    }

    /// Resource with per-operation ceilings.
    ///
    /// ## Errors
    ///
    /// [`ValidationError::ZeroLimit`](crate::error::ValidationError::ZeroLimit)
    /// when any ceiling is zero.
    pub fn with_limits(
        client: Arc<RetryableHttpClient>,
        path: impl Into<String>,
        limits: BatchLimits,
    ) -> SdkResult<Self> {
        limits.validate()?;
        Ok(Self::from_parts(client, path.into(), limits))
    }

    fn from_parts(client: Arc<RetryableHttpClient>, path: String, limits: BatchLimits) -> Self {
        Self {
            client,
            path,
            limits,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    /// Lazily list items via `POST <path>/list`.
    pub fn list(&self, scope: ListScope) -> ListCursor<T> {
        let client = Arc::clone(&self.client);
        let path = self.endpoint("/list");
        ListCursor::new(move |cursor: Option<String>| {
            let client = Arc::clone(&client);
            let path = path.clone();
            let body = Value::Object(scope.with_cursor(cursor.as_deref()));
            Box::pin(async move { client.post(&path, body).await?.json::<Page<T>>() })
        })
    }

    /// Lazily list items via `GET <path>` with the scope as query parameters.
    pub fn list_with_get(&self, scope: ListScope) -> ListCursor<T> {
        let client = Arc::clone(&self.client);
        let path = self.path.clone();
        ListCursor::new(move |cursor: Option<String>| {
            let client = Arc::clone(&client);
            let spec = scope
                .with_cursor(cursor.as_deref())
                .into_iter()
                .fold(RequestSpec::get(path.as_str()), |spec, (key, value)| {
                    spec.query(key, value)
                });
            Box::pin(async move { client.request(&spec).await?.json::<Page<T>>() })
        })
    }

    /// One page of `POST <path>/list`, for manual paging.
    pub async fn list_page(&self, scope: &ListScope, cursor: Option<&str>) -> SdkResult<Page<T>> {
        let body = Value::Object(scope.with_cursor(cursor));
        self.client
            .post(&self.endpoint("/list"), body)
            .await?
            .json()
    }

    /// The first page envelope, `nextCursor` included.
    pub async fn first_page(&self, scope: &ListScope) -> SdkResult<Page<T>> {
        self.list_page(scope, None).await
    }

    /// `POST <path>/byids`.
    pub async fn retrieve(&self, ids: &[IdEither]) -> SdkResult<Vec<T>> {
        self.retrieve_with(ids, RetrieveOptions::default()).await
    }

    pub async fn retrieve_with(&self, ids: &[IdEither], options: RetrieveOptions) -> SdkResult<Vec<T>> {
        validate_batch("retrieve", ids.len(), self.limits.retrieve)?;
        let mut body = items_body(ids)?;
        if options.ignore_unknown_ids {
            body.insert("ignoreUnknownIds".to_string(), Value::Bool(true));
        }
        self.post_items(&self.endpoint("/byids"), body).await
    }

    /// `POST <path>`.
    pub async fn create<C: Serialize>(&self, items: &[C]) -> SdkResult<Vec<T>> {
        validate_batch("create", items.len(), self.limits.create)?;
        tracing::debug!(path = %self.path, count = items.len(), "Creating items");
        self.post_items(&self.path, items_body(items)?).await
    }

    /// Create any number of items, one `POST <path>` per chunk of at most
    /// the create ceiling, sent in order. Results keep input order.
    pub async fn create_in_chunks<C: Serialize>(&self, items: &[C]) -> SdkResult<Vec<T>> {
        validate_batch("create", items.len(), usize::MAX)?;
        let mut created = Vec::with_capacity(items.len());
        for chunk in items.chunks(self.limits.create) {
            created.extend(self.create(chunk).await?);
        }
        Ok(created)
    }

    /// `POST <path>/update` with change objects.
    pub async fn update<U: Serialize>(&self, changes: &[U]) -> SdkResult<Vec<T>> {
        validate_batch("update", changes.len(), self.limits.update)?;
        self.post_items(&self.endpoint("/update"), items_body(changes)?)
            .await
    }

    /// `POST <path>/upsert`.
    pub async fn upsert<C: Serialize>(&self, items: &[C]) -> SdkResult<Vec<T>> {
        validate_batch("upsert", items.len(), self.limits.upsert)?;
        self.post_items(&self.endpoint("/upsert"), items_body(items)?)
            .await
    }

    /// `POST <path>/delete`.
    pub async fn delete(&self, ids: &[IdEither]) -> SdkResult<()> {
        validate_batch("delete", ids.len(), self.limits.delete)?;
        tracing::debug!(path = %self.path, count = ids.len(), "Deleting items");
        self.client
            .post(&self.endpoint("/delete"), Value::Object(items_body(ids)?))
            .await?;
        Ok(())
    }

    /// `POST <path>/search`.
    pub async fn search<Q: Serialize>(&self, query: &Q) -> SdkResult<Vec<T>> {
        let body = serde_json::to_value(query)?;
        let wrapper: ItemsWrapper<T> = self.client.post_json(&self.endpoint("/search"), body).await?;
        Ok(wrapper.items)
    }

    /// `POST <path>/aggregate`. The item shape depends on the query.
    pub async fn aggregate<Q, A>(&self, query: &Q) -> SdkResult<Vec<A>>
    where
        Q: Serialize,
        A: DeserializeOwned,
    {
        let body = serde_json::to_value(query)?;
        let wrapper: ItemsWrapper<A> = self
            .client
            .post_json(&self.endpoint("/aggregate"), body)
            .await?;
        Ok(wrapper.items)
    }

    fn endpoint(&self, suffix: &str) -> String {
        format!("{}{}", self.path.trim_end_matches('/'), suffix)
    }

    async fn post_items(&self, path: &str, body: Map<String, Value>) -> SdkResult<Vec<T>> {
        let wrapper: ItemsWrapper<T> = self.client.post_json(path, Value::Object(body)).await?;
        Ok(wrapper.items)
    }
}

fn items_body<S: Serialize>(items: &[S]) -> SdkResult<Map<String, Value>> {
    let mut body = Map::new();
    body.insert("items".to_string(), serde_json::to_value(items)?);
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scope_body() {
        let scope = ListScope::new()
            .filter(json!({"name": "pump"}))
            .limit(100)
            .param("partition", "1/4");

        assert_eq!(
            Value::Object(scope.with_cursor(None)),
            json!({"filter": {"name": "pump"}, "limit": 100, "partition": "1/4"})
        );
        assert_eq!(scope.with_cursor(Some("abc"))["cursor"], json!("abc"));
        assert!(!scope.with_cursor(None).contains_key("cursor"));
    }

    #[test]
    fn test_items_body() {
        let body = items_body(&[IdEither::id(1), IdEither::external_id("a")]).unwrap();
        assert_eq!(
            Value::Object(body),
            json!({"items": [{"id": 1}, {"externalId": "a"}]})
        );
    }
}
