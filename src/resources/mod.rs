//! Typed resource facades and the top-level [`ApiClient`].

pub mod assets;
pub mod timeseries;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::SdkResult;
use crate::http::client::{ClientBuilder, RetryableHttpClient};
use crate::resource::ResourceApi;

pub use assets::{Asset, AssetsApi, NewAsset};
pub use timeseries::{NewTimeSeries, TimeSeries, TimeSeriesApi};

/// Entry point bundling one shared HTTP client with every resource facade.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Arc<RetryableHttpClient>,
    assets: AssetsApi,
    timeseries: TimeSeriesApi,
}

impl ApiClient {
    pub fn new(http: RetryableHttpClient) -> Self {
        let http = Arc::new(http);
        Self {
            assets: AssetsApi::new(Arc::clone(&http)),
            timeseries: TimeSeriesApi::new(Arc::clone(&http)),
            http,
        }
    }

    /// Build the HTTP client from `config` with default policies.
    pub fn from_config(config: ClientConfig) -> SdkResult<Self> {
        Ok(Self::new(ClientBuilder::from_config(config).build()?))
    }

    pub fn http(&self) -> &Arc<RetryableHttpClient> {
        &self.http
    }

    pub fn assets(&self) -> &AssetsApi {
        &self.assets
    }

    pub fn timeseries(&self) -> &TimeSeriesApi {
        &self.timeseries
    }

    /// Generic access to any collection path, e.g. `"/events"`.
    pub fn resource<T>(&self, path: impl Into<String>) -> ResourceApi<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        ResourceApi::new(Arc::clone(&self.http), path)
    }
}
