use sdmx_model::QueryId;
use serde_json::Value;

use crate::error::Result;

/// Supplier of raw API payloads.
pub trait PayloadSource {
    /// Payload of the `consulta` endpoint for a configured query id.
    ///
    /// `raw_id` is the id as configured, including any `?` parameters.
    fn fetch_query(&self, activity: &str, raw_id: &str) -> Result<Value>;

    /// Hierarchy tree behind `url`, as listed in a query payload.
    fn fetch_hierarchy(&self, activity: &str, query_id: &QueryId, alias: &str, url: &str)
    -> Result<Value>;
}
