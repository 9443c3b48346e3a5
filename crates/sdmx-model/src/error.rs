//! Error taxonomy shared across the pipeline crates.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The API payload does not have the shape the pipeline expects.
///
/// Aborts the affected query only.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("query {query_id} returned no observations")]
    EmptyResult { query_id: String },

    #[error("row {row} has {found} cells, expected {expected}")]
    RowShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("row {row}, column '{column}': expected a {expected} cell")]
    MalformedCell {
        row: usize,
        column: String,
        expected: &'static str,
    },

    #[error("column '{column}' not found in observation table")]
    MissingColumn { column: String },

    #[error("malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("only one measure may carry OBS_STATUS, found: {}", .measures.join(", "))]
    MultipleStatusMeasures { measures: Vec<String> },
}

/// Invalid or incomplete configuration. Fatal for the whole run.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown periodicity label '{label}'")]
    UnknownPeriodicity { label: String },

    #[error("missing required configuration key: {key}")]
    MissingKey { key: String },

    #[error("invalid value for {key}: {message}")]
    Invalid { key: String, message: String },

    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Dimension values left without a TARGET after the map was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingGap {
    pub dimension: String,
    pub values: Vec<String>,
}

impl fmt::Display for MappingGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dimension '{}' has unmapped values: {}",
            self.dimension,
            self.values.join(", ")
        )
    }
}

impl std::error::Error for MappingGap {}
