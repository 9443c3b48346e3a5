use std::collections::HashMap;

use sdmx_model::QueryId;
use serde_json::Value;

use crate::error::{FetchError, Result};
use crate::source::PayloadSource;

/// Canned payloads keyed by configured query id and hierarchy URL.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub queries: HashMap<String, Value>,
    pub hierarchies: HashMap<String, Value>,
}

impl MemorySource {
    pub fn with_query(mut self, raw_id: &str, payload: Value) -> Self {
        self.queries.insert(raw_id.to_string(), payload);
        self
    }

    pub fn with_hierarchy(mut self, url: &str, payload: Value) -> Self {
        self.hierarchies.insert(url.to_string(), payload);
        self
    }
}

impl PayloadSource for MemorySource {
    fn fetch_query(&self, _activity: &str, raw_id: &str) -> Result<Value> {
        self.queries
            .get(raw_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                id: raw_id.to_string(),
                url: String::new(),
            })
    }

    fn fetch_hierarchy(
        &self,
        _activity: &str,
        _query_id: &QueryId,
        alias: &str,
        url: &str,
    ) -> Result<Value> {
        self.hierarchies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::NotFound {
                id: alias.to_string(),
                url: url.to_string(),
            })
    }
}
