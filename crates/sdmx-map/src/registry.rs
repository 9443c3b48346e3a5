//! Measure registry: the INDICATOR dimension map and hierarchy.

use std::collections::HashMap;

use sdmx_model::{DimensionMapEntry, HierarchyRow, INDICATOR, Measure};
use sdmx_store::CatalogStore;
use tracing::{info, warn};

use crate::error::Result;
use crate::target::measure_target;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MeasureUpdate {
    /// Measures that had no INDICATOR mapping before this update.
    pub created: Vec<DimensionMapEntry>,
    /// Size of the INDICATOR hierarchy after the update.
    pub hierarchy_rows: usize,
}

/// Register `measures` in the INDICATOR map and hierarchy.
///
/// Measures listed in `status_measures` feed OBS_STATUS and are skipped.
/// Both tables are deduplicated by their natural key (SOURCE, ID) and
/// persisted.
pub fn update_measures<S>(
    store: &mut S,
    measures: &[Measure],
    status_measures: &[String],
) -> Result<MeasureUpdate>
where
    S: CatalogStore + ?Sized,
{
    let existing = store.load_dimension_map(INDICATOR)?;
    let mut targets: HashMap<String, String> = existing
        .into_iter()
        .filter(|entry| !entry.is_incomplete())
        .map(|entry| (entry.source, entry.target))
        .collect();

    let mut created = Vec::new();
    let mut rows = Vec::new();
    for measure in measures {
        if status_measures.contains(&measure.des) {
            continue;
        }
        let target = match targets.get(&measure.des) {
            Some(target) => target.clone(),
            None => {
                let target = measure_target(&measure.des);
                warn!(
                    dimension = INDICATOR,
                    source = %measure.des,
                    target = %target,
                    "new measure registered"
                );
                created.push(DimensionMapEntry::new(measure.des.clone(), target.clone()));
                targets.insert(measure.des.clone(), target.clone());
                target
            }
        };
        rows.push(HierarchyRow {
            id: target,
            cod: measure.des.clone(),
            name: measure.des.clone(),
            ..HierarchyRow::default()
        });
    }

    store.append_dimension_entries(INDICATOR, created.clone())?;
    let hierarchy = store.append_indicator_rows(rows)?;
    info!(
        new_measures = created.len(),
        hierarchy_rows = hierarchy.len(),
        "measure registry updated"
    );
    Ok(MeasureUpdate {
        created,
        hierarchy_rows: hierarchy.len(),
    })
}
