//! Assets.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http::client::RetryableHttpClient;
use crate::pagination::ListCursor;
use crate::resource::{ListScope, ResourceApi};

pub const ASSETS_PATH: &str = "/assets";

/// An asset as returned by the API. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_set_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub last_updated_time: i64,
}

/// Creation payload for an asset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAsset {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_set_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl NewAsset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// `/assets` endpoints. Derefs to the generic [`ResourceApi`].
#[derive(Debug, Clone)]
pub struct AssetsApi {
    inner: ResourceApi<Asset>,
}

impl AssetsApi {
    pub fn new(client: Arc<RetryableHttpClient>) -> Self {
        Self {
            inner: ResourceApi::new(client, ASSETS_PATH),
        }
    }

    /// Direct children of `parent_id`.
    pub fn children(&self, parent_id: u64) -> ListCursor<Asset> {
        self.inner
            .list(ListScope::new().filter(json!({ "parentIds": [parent_id] })))
    }
}

impl Deref for AssetsApi {
    type Target = ResourceApi<Asset>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
