//! Error types for payload acquisition.

use sdmx_store::StoreError;
use thiserror::Error;

/// Errors raised while fetching or caching API payloads.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Neither the cache nor the API could supply the payload.
    #[error("payload not found for {id} ({url})")]
    NotFound { id: String, url: String },

    /// The HTTP request failed before a response arrived.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The API answered with a non-success status.
    #[error("{url} answered HTTP {status}")]
    Status { url: String, status: u16 },

    /// Reading or writing the JSON cache failed.
    #[error("JSON cache error: {0}")]
    Cache(#[from] StoreError),

    /// A response or cache file is not valid JSON.
    #[error("invalid JSON from {origin}: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } => true,
            Self::Status { status, .. } => *status >= 500,
            Self::NotFound { .. } | Self::Cache(_) | Self::Decode { .. } => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
