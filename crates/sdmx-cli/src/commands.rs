use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use sdmx_core::{PipelineContext, RunSummary};
use sdmx_ingest::ApiSource;
use sdmx_model::PipelineConfig;
use sdmx_store::FsStore;
use tracing::{info, info_span};

/// Load and validate the configuration at `path`.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    PipelineConfig::load(path).with_context(|| format!("load configuration {}", path.display()))
}

/// Run `activities` (all of them when empty) against the live API or the
/// JSON cache, as configured.
pub fn run_pipeline(config: &PipelineConfig, activities: &[String]) -> Result<RunSummary> {
    let _span = info_span!("run", node_id = %config.node_id).entered();
    let start = Instant::now();
    let source = ApiSource::from_config(config).context("create API client")?;
    let mut store = FsStore::new(&config.paths);
    let mut context = PipelineContext::new(config, &mut store, &source);
    let summary = context.run(activities).context("pipeline aborted")?;
    info!(
        activities = summary.activities.len(),
        failed_queries = summary.failed_queries(),
        duration_ms = start.elapsed().as_millis(),
        "run finished"
    );
    Ok(summary)
}

/// Number of configured queries across all activities.
pub fn query_count(config: &PipelineConfig) -> usize {
    config
        .activities
        .values()
        .map(|activity| activity.queries.len())
        .sum()
}
