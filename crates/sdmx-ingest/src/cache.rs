//! On-disk JSON cache of API payloads.
//!
//! Layout under the cache root:
//! - `<activity>/<query_id>.json` for query payloads
//! - `<activity>/<query_id>/<alias>.json` for hierarchy payloads

use std::path::{Path, PathBuf};

use sdmx_model::QueryId;
use sdmx_store::StoreError;
use sdmx_store::io::atomic_write;
use serde_json::Value;
use tracing::debug;

use crate::error::{FetchError, Result};

#[derive(Debug, Clone)]
pub struct JsonCache {
    root: PathBuf,
}

impl JsonCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn query_path(&self, activity: &str, query_id: &QueryId) -> PathBuf {
        self.root
            .join(activity)
            .join(format!("{}.json", query_id.as_str()))
    }

    pub fn hierarchy_path(&self, activity: &str, query_id: &QueryId, alias: &str) -> PathBuf {
        self.root
            .join(activity)
            .join(query_id.as_str())
            .join(format!("{alias}.json"))
    }

    /// Cached payload at `path`, or `None` when nothing is cached there.
    pub fn read(&self, path: &Path) -> Result<Option<Value>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path).map_err(|source| {
            FetchError::Cache(StoreError::Io {
                operation: "read",
                path: path.to_path_buf(),
                source,
            })
        })?;
        let value = serde_json::from_str(&contents).map_err(|source| FetchError::Decode {
            origin: path.display().to_string(),
            source,
        })?;
        debug!(path = %path.display(), "payload read from cache");
        Ok(Some(value))
    }

    pub fn write(&self, path: &Path, value: &Value) -> Result<()> {
        let bytes = serde_json::to_vec(value).map_err(|source| FetchError::Decode {
            origin: path.display().to_string(),
            source,
        })?;
        atomic_write(path, &bytes)?;
        debug!(path = %path.display(), bytes = bytes.len(), "payload cached");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paths_follow_activity_layout() {
        let cache = JsonCache::new("/cache");
        let query = QueryId::from_configured("42185?CodOper=b3_151");
        assert_eq!(
            cache.query_path("ETDP", &query),
            PathBuf::from("/cache/ETDP/42185.json")
        );
        assert_eq!(
            cache.hierarchy_path("ETDP", &query, "D_SEXO_12_0"),
            PathBuf::from("/cache/ETDP/42185/D_SEXO_12_0.json")
        );
    }

    #[test]
    fn write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonCache::new(dir.path());
        let path = cache.query_path("ETDP", &QueryId::from_configured("1"));
        assert!(cache.read(&path).unwrap().is_none());

        cache.write(&path, &json!({"data": []})).unwrap();
        assert_eq!(cache.read(&path).unwrap(), Some(json!({"data": []})));
    }

    #[test]
    fn corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let error = JsonCache::new(dir.path()).read(&path).unwrap_err();
        assert!(matches!(error, FetchError::Decode { .. }));
    }
}
