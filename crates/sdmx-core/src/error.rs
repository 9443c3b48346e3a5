//! Pipeline-level error type.

use polars::error::PolarsError;
use sdmx_ingest::FetchError;
use sdmx_map::MapError;
use sdmx_model::{ConfigError, DataError, MappingGap};
use sdmx_store::StoreError;
use sdmx_transform::TransformError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Mapping(#[from] MappingGap),

    #[error("DataFrame operation failed: {0}")]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    /// Configuration problems abort the run; everything else aborts only
    /// the query it happened in.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl From<MapError> for PipelineError {
    fn from(error: MapError) -> Self {
        match error {
            MapError::Store(error) => Self::Store(error),
            MapError::Gap(gap) => Self::Mapping(gap),
            MapError::Polars(error) => Self::Polars(error),
        }
    }
}

impl From<TransformError> for PipelineError {
    fn from(error: TransformError) -> Self {
        match error {
            TransformError::Data(error) => Self::Data(error),
            TransformError::Config(error) => Self::Config(error),
            TransformError::Map(error) => error.into(),
            TransformError::Store(error) => Self::Store(error),
            TransformError::Polars(error) => Self::Polars(error),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_configuration_errors_are_fatal() {
        let config = PipelineError::from(ConfigError::UnknownPeriodicity {
            label: "Semanal".to_string(),
        });
        assert!(config.is_fatal());

        let data = PipelineError::from(DataError::EmptyResult {
            query_id: "1".to_string(),
        });
        assert!(!data.is_fatal());

        let gap = PipelineError::from(TransformError::Map(MapError::Gap(MappingGap {
            dimension: "D_SEXO_0".to_string(),
            values: vec!["X".to_string()],
        })));
        assert!(matches!(gap, PipelineError::Mapping(_)));
        assert!(!gap.is_fatal());
    }
}
