//! Shared types for the IECA to SDMX pipeline.
//!
//! Parsed API payloads, identifiers, configuration and the error taxonomy live
//! here so every other crate agrees on them.

pub mod activity;
pub mod catalog;
pub mod config;
pub mod error;
pub mod ids;
pub mod payload;
pub mod periodicity;
pub mod table;

pub use activity::{ActivityDescriptor, QueryGroup, QueryPeriodicity};
pub use catalog::{CodelistRef, ConceptCatalogEntry, ConceptSchemeRef, HierarchyCatalogEntry};
pub use config::{ActivityConfig, PathsConfig, PipelineConfig};
pub use error::{ConfigError, DataError, MappingGap};
pub use ids::{HierarchyAlias, QueryId, extract_hierarchy_number, short_name};
pub use payload::{Cell, HierarchyNode, HierarchyPayload, HierarchyRef, Measure, QueryMetadata, QueryPayload};
pub use periodicity::{FrequencyTable, Granularity};
pub use table::{DimensionMapEntry, HierarchyRow};

/// SDMX "not applicable" code.
pub const NOT_APPLICABLE: &str = "_Z";
/// Label attached to the `_Z` code in exported codelists.
pub const NOT_APPLICABLE_LABEL: &str = "No aplica";

pub const INDICATOR: &str = "INDICATOR";
pub const OBS_VALUE: &str = "OBS_VALUE";
pub const OBS_STATUS: &str = "OBS_STATUS";
pub const FREQ: &str = "FREQ";

/// Columns that never take part in the activity-wide dimension set.
pub const FIXED_COLUMNS: [&str; 6] = [
    INDICATOR,
    "TEMPORAL",
    OBS_VALUE,
    "ESTADO_DATO",
    FREQ,
    OBS_STATUS,
];
