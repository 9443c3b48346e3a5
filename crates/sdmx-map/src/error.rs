//! Error types for mapping operations.

use polars::error::PolarsError;
use sdmx_model::MappingGap;
use sdmx_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Gap(#[from] MappingGap),

    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, MapError>;
