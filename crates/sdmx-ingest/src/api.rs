//! IECA REST API client.
//!
//! Requests are blocking. With cache preference enabled a cached payload is
//! served when present; every live response is written back to the cache.

use std::path::Path;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};
use sdmx_model::{PipelineConfig, QueryId};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::JsonCache;
use crate::error::{FetchError, Result};
use crate::source::PayloadSource;

/// HTTP request timeout. Large queries take minutes to render server-side.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

pub struct ApiSource {
    client: Client,
    base_url: String,
    cache: JsonCache,
    prefer_cache: bool,
}

impl ApiSource {
    pub fn new(base_url: impl Into<String>, cache: JsonCache, prefer_cache: bool) -> Result<Self> {
        let base_url = base_url.into();
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| FetchError::Network {
                url: base_url.clone(),
                source,
            })?;
        Ok(Self {
            client,
            base_url,
            cache,
            prefer_cache,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(
            config.api_base_url.clone(),
            JsonCache::new(&config.paths.json_cache),
            config.cache_search,
        )
    }

    /// Endpoint URL for a configured query id.
    pub fn query_url(&self, raw_id: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{raw_id}", self.base_url)
        } else {
            format!("{}/{raw_id}", self.base_url)
        }
    }

    fn get_json(&self, id: &str, url: &str) -> Result<Value> {
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, concat!("iecasdmx/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound {
                id: id.to_string(),
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;
        let value = serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            origin: url.to_string(),
            source,
        })?;
        info!(
            id,
            bytes = body.len(),
            duration_ms = start.elapsed().as_millis(),
            "payload fetched"
        );
        Ok(value)
    }

    /// Cache-first when preferred, otherwise live; live results are cached.
    fn fetch_cached(&self, id: &str, url: &str, cache_path: &Path) -> Result<Value> {
        if self.prefer_cache {
            match self.cache.read(cache_path) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {
                    warn!(path = %cache_path.display(), "payload not cached, requesting from API");
                }
                Err(error) => {
                    warn!(path = %cache_path.display(), %error, "cached payload unusable, requesting from API");
                }
            }
        } else {
            debug!(id, "ignoring cache");
        }
        let value = self.get_json(id, url)?;
        self.cache.write(cache_path, &value)?;
        Ok(value)
    }
}

impl PayloadSource for ApiSource {
    fn fetch_query(&self, activity: &str, raw_id: &str) -> Result<Value> {
        let query_id = QueryId::from_configured(raw_id);
        let path = self.cache.query_path(activity, &query_id);
        self.fetch_cached(query_id.as_str(), &self.query_url(raw_id), &path)
    }

    fn fetch_hierarchy(
        &self,
        activity: &str,
        query_id: &QueryId,
        alias: &str,
        url: &str,
    ) -> Result<Value> {
        let path = self.cache.hierarchy_path(activity, query_id, alias);
        self.fetch_cached(alias, url, &path)
    }
}
