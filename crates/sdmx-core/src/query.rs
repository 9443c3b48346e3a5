//! The per-query pipeline.
//!
//! # Order
//!
//! 1. Hierarchies: export both variants, register catalog entries
//! 2. Reshape observations to the long format
//! 3. Save the `original` table
//! 4. Extend the dimension maps of every mapped column
//! 5. Apply the maps; unmapped values abort the query
//! 6. Rename columns to their short names
//! 7. Drop rows whose raw OBS_VALUE is a configured placeholder
//! 8. Classify OBS_VALUE and save the `procesados` table
//! 9. Register the query's measures

use std::time::Instant;

use polars::prelude::DataFrame;
use sdmx_common::{column_names, column_strings, filter_rows, frame_from_columns};
use sdmx_map::{extend, map_column, update_measures};
use sdmx_model::{
    ActivityConfig, ConceptCatalogEntry, FREQ, Granularity, HierarchyAlias, HierarchyCatalogEntry,
    HierarchyPayload, OBS_STATUS, OBS_VALUE, QueryId, QueryMetadata, QueryPayload, short_name,
};
use sdmx_transform::{FlatHierarchy, ValidityWindow, finalize_obs_values, reshape, validity_window};
use tracing::{info, info_span, warn};

use crate::context::PipelineContext;
use crate::error::Result;
use crate::layout::{DataStage, HierarchyVariant, catalog_path, write_frame, write_hierarchy};

/// Columns carried through without value mapping.
const UNMAPPED_COLUMNS: [&str; 3] = [OBS_VALUE, FREQ, OBS_STATUS];

/// Everything the activity aggregator needs from one executed query.
#[derive(Debug, Clone)]
pub struct QueryOutcome {
    pub id: QueryId,
    pub metadata: QueryMetadata,
    /// SDMX frequency code.
    pub freq: String,
    pub window: Option<ValidityWindow>,
    /// Processed table: mapped, renamed, classified.
    pub processed: DataFrame,
    pub new_map_entries: usize,
    pub anomalies: Vec<String>,
}

impl QueryOutcome {
    pub fn columns(&self) -> Vec<String> {
        column_names(&self.processed)
    }

    pub fn rows_written(&self) -> usize {
        self.processed.height()
    }
}

impl PipelineContext<'_> {
    /// Run every stage for the configured query `raw_id` of `activity`.
    pub fn run_query(
        &mut self,
        activity: &str,
        settings: &ActivityConfig,
        raw_id: &str,
    ) -> Result<QueryOutcome> {
        let start = Instant::now();
        let query_id = QueryId::from_configured(raw_id);
        let payload = QueryPayload::from_value(self.source.fetch_query(activity, raw_id)?)?;
        let periodicity = payload.metainfo.periodicity.clone();
        self.config.frequencies.lookup(&periodicity)?;

        let aliases = self.export_hierarchies(activity, settings, &query_id, &payload)?;
        let measures: Vec<String> = payload
            .measures
            .iter()
            .map(|measure| measure.des.clone())
            .collect();

        let reshaped = reshape(
            payload.rows(),
            &aliases,
            &measures,
            &periodicity,
            self.config,
            query_id.as_str(),
        )?;
        let window = self.query_window(&reshaped.wide, &reshaped.freq, &query_id)?;
        write_frame(
            &self.layout.data_path(activity, DataStage::Original, &query_id),
            &reshaped.long,
        )?;

        let mut table = reshaped.long;
        let mapped: Vec<String> = column_names(&table)
            .into_iter()
            .filter(|name| !UNMAPPED_COLUMNS.contains(&name.as_str()))
            .collect();
        let mut new_map_entries = 0;
        for column in &mapped {
            let values = column_strings(&table, column)?;
            new_map_entries += extend(&mut *self.store, column, &values)?.created.len();
        }
        for column in &mapped {
            map_column(&*self.store, &mut table, column, column)?;
        }

        let table = rename_to_short_names(&table)?;
        let table = self.drop_placeholder_rows(&table)?;
        let finalized = finalize_obs_values(&table, &mut *self.store, &self.config.anomaly_tag)?;
        write_frame(
            &self.layout.data_path(activity, DataStage::Processed, &query_id),
            &finalized.frame,
        )?;

        let update = update_measures(&mut *self.store, &payload.measures, &self.config.status_measures)?;
        new_map_entries += update.created.len();

        info!(
            query_id = %query_id,
            rows = finalized.frame.height(),
            dropped = finalized.dropped,
            new_map_entries,
            duration_ms = start.elapsed().as_millis(),
            "query processed"
        );
        Ok(QueryOutcome {
            id: query_id,
            metadata: payload.metainfo,
            freq: reshaped.freq,
            window,
            processed: finalized.frame,
            new_map_entries,
            anomalies: finalized.anomalies,
        })
    }

    /// Export each hierarchy of the query and return the data column aliases
    /// in declaration order.
    fn export_hierarchies(
        &mut self,
        activity: &str,
        settings: &ActivityConfig,
        query_id: &QueryId,
        payload: &QueryPayload,
    ) -> Result<Vec<String>> {
        let mut aliases = Vec::with_capacity(payload.hierarchies.len());
        for hierarchy in &payload.hierarchies {
            let alias = HierarchyAlias::build(&hierarchy.alias, &hierarchy.url);
            let _span = info_span!("hierarchy", alias = %alias).entered();

            let value =
                self.source
                    .fetch_hierarchy(activity, query_id, alias.as_str(), &hierarchy.url)?;
            let tree = HierarchyPayload::from_value(value)?;
            let flat = FlatHierarchy::build(
                &mut *self.store,
                alias.map_name(),
                &tree.data,
                &self.config.hierarchy_properties,
            )?;

            let original = self.layout.hierarchy_path(
                activity,
                HierarchyVariant::Original,
                query_id,
                alias.map_name(),
            );
            write_hierarchy(&original, &flat.original)?;
            let sdmx =
                self.layout
                    .hierarchy_path(activity, HierarchyVariant::Sdmx, query_id, alias.map_name());
            write_hierarchy(&sdmx, &flat.sdmx)?;

            let name = alias.catalog_name();
            self.store.register_concept(
                &name,
                ConceptCatalogEntry::dimension(
                    &name,
                    &self.config.concept_agency,
                    &settings.category,
                    &hierarchy.des,
                ),
            )?;
            self.store.register_hierarchy(
                &name,
                HierarchyCatalogEntry::new(
                    &name,
                    &self.config.node_id,
                    &hierarchy.des,
                    catalog_path(&sdmx),
                ),
            )?;
            aliases.push(alias.as_str().to_string());
        }
        Ok(aliases)
    }

    /// Validity window from the unmapped temporal values.
    fn query_window(
        &self,
        wide: &DataFrame,
        freq: &str,
        query_id: &QueryId,
    ) -> Result<Option<ValidityWindow>> {
        let column = &self.config.temporal_dimension;
        if wide.column(column).is_err() {
            warn!(query_id = %query_id, column = %column, "no temporal column, validity window skipped");
            return Ok(None);
        }
        let values = column_strings(wide, column)?;
        let window = validity_window(&values, Granularity::from_freq(freq));
        if window.is_none() {
            warn!(query_id = %query_id, freq, "temporal values do not yield a validity window");
        }
        Ok(window)
    }

    fn drop_placeholder_rows(&self, table: &DataFrame) -> Result<DataFrame> {
        let keep: Vec<bool> = column_strings(table, OBS_VALUE)?
            .iter()
            .map(|value| !self.config.dropped_obs_values.contains(value))
            .collect();
        Ok(filter_rows(table, &keep)?)
    }
}

/// Rebuild `table` with `D_` prefixes and `_0` suffixes stripped from
/// column names.
fn rename_to_short_names(table: &DataFrame) -> Result<DataFrame> {
    let columns = column_names(table)
        .into_iter()
        .map(|name| Ok((short_name(&name), column_strings(table, &name)?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(frame_from_columns(columns)?)
}
