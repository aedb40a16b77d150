//! Time series.

use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::http::client::RetryableHttpClient;
use crate::pagination::ListCursor;
use crate::resource::{ListScope, ResourceApi};

pub const TIMESERIES_PATH: &str = "/timeseries";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub is_string: bool,
    #[serde(default)]
    pub is_step: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_set_id: Option<u64>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub created_time: i64,
    #[serde(default)]
    pub last_updated_time: i64,
}

/// Creation payload for a time series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimeSeries {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_string: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_step: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

/// `/timeseries` endpoints. Derefs to the generic [`ResourceApi`].
#[derive(Debug, Clone)]
pub struct TimeSeriesApi {
    inner: ResourceApi<TimeSeries>,
}

impl TimeSeriesApi {
    pub fn new(client: Arc<RetryableHttpClient>) -> Self {
        Self {
            inner: ResourceApi::new(client, TIMESERIES_PATH),
        }
    }

    /// Time series attached to any of `asset_ids`.
    pub fn for_assets(&self, asset_ids: &[u64]) -> ListCursor<TimeSeries> {
        self.inner
            .list(ListScope::new().filter(json!({ "assetIds": asset_ids })))
    }
}

impl Deref for TimeSeriesApi {
    type Target = ResourceApi<TimeSeries>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
