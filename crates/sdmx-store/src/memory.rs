//! In-memory store used by tests and dry runs.

use std::collections::BTreeMap;

use sdmx_model::{DimensionMapEntry, HierarchyRow};

use crate::error::Result;
use crate::store::{AnomalyRecord, CatalogStore, ConceptCatalog, HierarchyCatalog};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub dimension_maps: BTreeMap<String, Vec<DimensionMapEntry>>,
    pub indicator_hierarchy: Vec<HierarchyRow>,
    pub hierarchy_catalog: HierarchyCatalog,
    pub concept_catalog: ConceptCatalog,
    pub anomalies: Vec<AnomalyRecord>,
}

impl CatalogStore for MemoryStore {
    fn load_dimension_map(&self, dimension: &str) -> Result<Vec<DimensionMapEntry>> {
        Ok(self
            .dimension_maps
            .get(dimension)
            .cloned()
            .unwrap_or_default())
    }

    fn save_dimension_map(&mut self, dimension: &str, entries: &[DimensionMapEntry]) -> Result<()> {
        self.dimension_maps
            .insert(dimension.to_string(), entries.to_vec());
        Ok(())
    }

    fn load_indicator_hierarchy(&self) -> Result<Vec<HierarchyRow>> {
        Ok(self.indicator_hierarchy.clone())
    }

    fn save_indicator_hierarchy(&mut self, rows: &[HierarchyRow]) -> Result<()> {
        self.indicator_hierarchy = rows.to_vec();
        Ok(())
    }

    fn load_hierarchy_catalog(&self) -> Result<HierarchyCatalog> {
        Ok(self.hierarchy_catalog.clone())
    }

    fn save_hierarchy_catalog(&mut self, catalog: &HierarchyCatalog) -> Result<()> {
        self.hierarchy_catalog = catalog.clone();
        Ok(())
    }

    fn load_concept_catalog(&self) -> Result<ConceptCatalog> {
        Ok(self.concept_catalog.clone())
    }

    fn save_concept_catalog(&mut self, catalog: &ConceptCatalog) -> Result<()> {
        self.concept_catalog = catalog.clone();
        Ok(())
    }

    fn load_anomalies(&self) -> Result<Vec<AnomalyRecord>> {
        Ok(self.anomalies.clone())
    }

    fn save_anomalies(&mut self, records: &[AnomalyRecord]) -> Result<()> {
        self.anomalies = records.to_vec();
        Ok(())
    }
}
