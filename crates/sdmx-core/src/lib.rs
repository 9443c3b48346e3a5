//! Orchestration of the IECA to SDMX conversion.
//!
//! [`PipelineContext`] bundles configuration, catalog store and payload
//! source. [`PipelineContext::run_query`] executes one query end to end;
//! [`PipelineContext::run_activity`] runs all queries of an activity and
//! reconciles them into a single descriptor and dimension set.

pub mod activity;
pub mod context;
pub mod error;
pub mod layout;
pub mod query;

pub use activity::{
    ActivityOutcome, GroupDiscrepancy, QueryFailure, RunSummary, activity_variables,
    build_descriptor, check_group_consistency, extend_with_not_applicable, group_queries,
};
pub use context::PipelineContext;
pub use error::{PipelineError, Result};
pub use layout::{DataStage, HierarchyVariant, OutputLayout};
pub use query::QueryOutcome;
