//! Filesystem-backed store using the directory layout downstream tools read.
//!
//! - `dimension_maps/<dimension>`: comma-separated `SOURCE,NAME,TARGET`
//! - `hierarchies/INDICATOR`: `;`-separated `ID;COD;NAME;PARENTCODE`
//! - hierarchy and concept catalogs: YAML mappings
//! - anomaly log: comma-separated `valor,tipo`

use std::path::PathBuf;

use sdmx_model::config::PathsConfig;
use sdmx_model::table::{INDICATOR_COLUMNS, MAP_COLUMNS};
use sdmx_model::{DimensionMapEntry, HierarchyRow, INDICATOR};

use crate::error::Result;
use crate::io::{read_csv, read_yaml, write_csv, write_yaml};
use crate::store::{AnomalyRecord, CatalogStore, ConceptCatalog, HierarchyCatalog};

const MAP_DELIMITER: u8 = b',';
const HIERARCHY_DELIMITER: u8 = b';';

#[derive(Debug, Clone)]
pub struct FsStore {
    dimension_maps: PathBuf,
    hierarchies: PathBuf,
    hierarchy_catalog: PathBuf,
    concept_catalog: PathBuf,
    anomaly_log: PathBuf,
}

impl FsStore {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            dimension_maps: paths.dimension_maps.clone(),
            hierarchies: paths.hierarchies.clone(),
            hierarchy_catalog: paths.hierarchy_catalog.clone(),
            concept_catalog: paths.concept_catalog.clone(),
            anomaly_log: paths.errors.clone(),
        }
    }

    pub fn dimension_map_path(&self, dimension: &str) -> PathBuf {
        self.dimension_maps.join(dimension)
    }

    pub fn indicator_hierarchy_path(&self) -> PathBuf {
        self.hierarchies.join(INDICATOR)
    }
}

impl CatalogStore for FsStore {
    fn load_dimension_map(&self, dimension: &str) -> Result<Vec<DimensionMapEntry>> {
        read_csv(&self.dimension_map_path(dimension), MAP_DELIMITER)
    }

    fn save_dimension_map(&mut self, dimension: &str, entries: &[DimensionMapEntry]) -> Result<()> {
        let rows = entries.iter().map(|entry| {
            [
                entry.source.as_str(),
                entry.name.as_str(),
                entry.target.as_str(),
            ]
        });
        write_csv(
            &self.dimension_map_path(dimension),
            MAP_DELIMITER,
            &MAP_COLUMNS,
            rows,
        )
    }

    fn load_indicator_hierarchy(&self) -> Result<Vec<HierarchyRow>> {
        read_csv(&self.indicator_hierarchy_path(), HIERARCHY_DELIMITER)
    }

    fn save_indicator_hierarchy(&mut self, rows: &[HierarchyRow]) -> Result<()> {
        write_csv(
            &self.indicator_hierarchy_path(),
            HIERARCHY_DELIMITER,
            &INDICATOR_COLUMNS,
            rows.iter().map(HierarchyRow::to_indicator_record),
        )
    }

    fn load_hierarchy_catalog(&self) -> Result<HierarchyCatalog> {
        read_yaml(&self.hierarchy_catalog)
    }

    fn save_hierarchy_catalog(&mut self, catalog: &HierarchyCatalog) -> Result<()> {
        write_yaml(&self.hierarchy_catalog, catalog)
    }

    fn load_concept_catalog(&self) -> Result<ConceptCatalog> {
        read_yaml(&self.concept_catalog)
    }

    fn save_concept_catalog(&mut self, catalog: &ConceptCatalog) -> Result<()> {
        write_yaml(&self.concept_catalog, catalog)
    }

    fn load_anomalies(&self) -> Result<Vec<AnomalyRecord>> {
        read_csv(&self.anomaly_log, b',')
    }

    fn save_anomalies(&mut self, records: &[AnomalyRecord]) -> Result<()> {
        let rows = records
            .iter()
            .map(|record| [record.value.as_str(), record.tag.as_str()]);
        write_csv(&self.anomaly_log, b',', &["valor", "tipo"], rows)
    }
}
