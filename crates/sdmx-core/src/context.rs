use sdmx_ingest::PayloadSource;
use sdmx_model::PipelineConfig;
use sdmx_store::CatalogStore;

use crate::layout::OutputLayout;

/// Collaborators shared by every query of a run.
///
/// The store is the only mutable shared state; all queries of a run go
/// through the same context one after another.
pub struct PipelineContext<'a> {
    pub config: &'a PipelineConfig,
    pub store: &'a mut dyn CatalogStore,
    pub source: &'a dyn PayloadSource,
    pub layout: OutputLayout,
}

impl<'a> PipelineContext<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        store: &'a mut dyn CatalogStore,
        source: &'a dyn PayloadSource,
    ) -> Self {
        Self {
            config,
            store,
            source,
            layout: OutputLayout::new(&config.paths),
        }
    }
}
