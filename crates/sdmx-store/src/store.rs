use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use sdmx_model::{ConceptCatalogEntry, DimensionMapEntry, HierarchyCatalogEntry, HierarchyRow};

use crate::error::Result;

pub type HierarchyCatalog = BTreeMap<String, HierarchyCatalogEntry>;
pub type ConceptCatalog = BTreeMap<String, ConceptCatalogEntry>;

/// One row of the anomaly log.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AnomalyRecord {
    #[serde(rename = "valor")]
    pub value: String,
    #[serde(rename = "tipo")]
    pub tag: String,
}

/// Persistent catalogs shared by every query of a run.
///
/// Implementors supply whole-table load and save; the provided methods
/// implement the merge rules on top of them. Callers must serialize access.
pub trait CatalogStore {
    /// Entries of one dimension map; empty when the dimension is unknown.
    fn load_dimension_map(&self, dimension: &str) -> Result<Vec<DimensionMapEntry>>;
    fn save_dimension_map(&mut self, dimension: &str, entries: &[DimensionMapEntry]) -> Result<()>;

    fn load_indicator_hierarchy(&self) -> Result<Vec<HierarchyRow>>;
    fn save_indicator_hierarchy(&mut self, rows: &[HierarchyRow]) -> Result<()>;

    fn load_hierarchy_catalog(&self) -> Result<HierarchyCatalog>;
    fn save_hierarchy_catalog(&mut self, catalog: &HierarchyCatalog) -> Result<()>;

    fn load_concept_catalog(&self) -> Result<ConceptCatalog>;
    fn save_concept_catalog(&mut self, catalog: &ConceptCatalog) -> Result<()>;

    fn load_anomalies(&self) -> Result<Vec<AnomalyRecord>>;
    fn save_anomalies(&mut self, records: &[AnomalyRecord]) -> Result<()>;

    /// Append entries to a dimension map, keeping the first entry per SOURCE.
    ///
    /// Returns the merged map as persisted.
    fn append_dimension_entries(
        &mut self,
        dimension: &str,
        entries: Vec<DimensionMapEntry>,
    ) -> Result<Vec<DimensionMapEntry>> {
        let mut merged = self.load_dimension_map(dimension)?;
        merged.extend(entries);
        let merged = dedupe_by(merged, |entry| entry.source.clone());
        self.save_dimension_map(dimension, &merged)?;
        Ok(merged)
    }

    /// Append rows to the INDICATOR hierarchy, keeping the first row per ID.
    fn append_indicator_rows(&mut self, rows: Vec<HierarchyRow>) -> Result<Vec<HierarchyRow>> {
        let mut merged = self.load_indicator_hierarchy()?;
        merged.extend(rows);
        let merged = dedupe_by(merged, |row| row.id.clone());
        self.save_indicator_hierarchy(&merged)?;
        Ok(merged)
    }

    /// Register a hierarchy catalog entry, or add its file to an existing one.
    ///
    /// Returns whether the catalog changed.
    fn register_hierarchy(&mut self, name: &str, entry: HierarchyCatalogEntry) -> Result<bool> {
        let mut catalog = self.load_hierarchy_catalog()?;
        let changed = match catalog.get_mut(name) {
            None => {
                catalog.insert(name.to_string(), entry);
                true
            }
            Some(existing) => {
                let mut changed = false;
                for file in entry.fichero {
                    if !existing.fichero.contains(&file) {
                        existing.fichero.push(file);
                        changed = true;
                    }
                }
                changed
            }
        };
        if changed {
            self.save_hierarchy_catalog(&catalog)?;
        }
        Ok(changed)
    }

    /// Register a concept catalog entry unless one already exists.
    fn register_concept(&mut self, name: &str, entry: ConceptCatalogEntry) -> Result<bool> {
        let mut catalog = self.load_concept_catalog()?;
        if catalog.contains_key(name) {
            return Ok(false);
        }
        catalog.insert(name.to_string(), entry);
        self.save_concept_catalog(&catalog)?;
        Ok(true)
    }

    /// Append one anomalous value to the log. Returns false if already logged.
    fn record_anomaly(&mut self, value: &str, tag: &str) -> Result<bool> {
        let mut records = self.load_anomalies()?;
        let record = AnomalyRecord {
            value: value.to_string(),
            tag: tag.to_string(),
        };
        if records.contains(&record) {
            return Ok(false);
        }
        records.push(record);
        self.save_anomalies(&records)?;
        Ok(true)
    }
}

/// Keep the first item for each key, preserving order.
pub fn dedupe_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: std::hash::Hash + Eq,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item)))
        .collect()
}
