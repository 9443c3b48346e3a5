use std::collections::{HashMap, HashSet};

use polars::prelude::DataFrame;
use sdmx_common::{column_strings, string_column, unique_in_order};
use sdmx_model::{DimensionMapEntry, MappingGap};
use sdmx_store::{CatalogStore, dedupe_by};
use tracing::{debug, warn};

use crate::error::Result;
use crate::target::target_for;

/// Result of extending one dimension map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtendOutcome {
    pub dimension: String,
    /// Entries appended or completed by this call.
    pub created: Vec<DimensionMapEntry>,
    /// Size of the map after the call.
    pub total: usize,
}

/// Register every value of `values` missing from the `dimension` map.
///
/// New SOURCE values get a derived TARGET. Existing entries whose TARGET is
/// blank are completed the same way. Each created mapping is logged at warn
/// level so operators can review it.
pub fn extend<S>(store: &mut S, dimension: &str, values: &[String]) -> Result<ExtendOutcome>
where
    S: CatalogStore + ?Sized,
{
    let mut entries = store.load_dimension_map(dimension)?;
    let mut created = Vec::new();

    for entry in entries.iter_mut().filter(|entry| entry.is_incomplete()) {
        entry.target = target_for(dimension, &entry.source);
        created.push(entry.clone());
    }

    let known: HashSet<&str> = entries.iter().map(|entry| entry.source.as_str()).collect();
    let fresh: Vec<DimensionMapEntry> = unique_in_order(values)
        .into_iter()
        .filter(|value| !known.contains(value.as_str()))
        .map(|value| {
            let target = target_for(dimension, &value);
            DimensionMapEntry::new(value, target)
        })
        .collect();
    created.extend(fresh.iter().cloned());
    entries.extend(fresh);

    if created.is_empty() {
        debug!(dimension, "all values already mapped");
    } else {
        for entry in &created {
            warn!(
                dimension,
                source = %entry.source,
                target = %entry.target,
                "new dimension map entry"
            );
        }
        entries = dedupe_by(entries, |entry| entry.source.clone());
        store.save_dimension_map(dimension, &entries)?;
    }

    Ok(ExtendOutcome {
        dimension: dimension.to_string(),
        created,
        total: entries.len(),
    })
}

/// Translate `values` through the `dimension` map.
///
/// Values with no entry, or an entry with a blank TARGET, yield `None`.
/// The map is never extended here.
pub fn apply<S>(store: &S, dimension: &str, values: &[String]) -> Result<Vec<Option<String>>>
where
    S: CatalogStore + ?Sized,
{
    let entries = store.load_dimension_map(dimension)?;
    let lookup: HashMap<&str, &str> = entries
        .iter()
        .filter(|entry| !entry.is_incomplete())
        .map(|entry| (entry.source.as_str(), entry.target.as_str()))
        .collect();
    Ok(values
        .iter()
        .map(|value| lookup.get(value.as_str()).map(|target| (*target).to_string()))
        .collect())
}

/// Replace `column` of `df` with its mapped TARGET values.
///
/// Any value without a TARGET fails with [`MappingGap`].
pub fn map_column<S>(store: &S, df: &mut DataFrame, column: &str, dimension: &str) -> Result<()>
where
    S: CatalogStore + ?Sized,
{
    let values = column_strings(df, column)?;
    let mapped = apply(store, dimension, &values)?;

    let missing: Vec<&String> = values
        .iter()
        .zip(&mapped)
        .filter(|(_, target)| target.is_none())
        .map(|(value, _)| value)
        .collect();
    if !missing.is_empty() {
        return Err(MappingGap {
            dimension: dimension.to_string(),
            values: unique_in_order(missing),
        }
        .into());
    }

    let targets: Vec<String> = mapped.into_iter().flatten().collect();
    df.with_column(string_column(column, targets))?;
    debug!(column, dimension, rows = values.len(), "mapped column");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdmx_common::frame_from_columns;
    use sdmx_store::MemoryStore;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn extend_adds_only_unknown_values() {
        let mut store = MemoryStore::default();
        store
            .save_dimension_map("D_SEXO_0", &[DimensionMapEntry::new("Hombres", "H")])
            .unwrap();

        let outcome = extend(
            &mut store,
            "D_SEXO_0",
            &strings(&["Hombres", "Mujeres", "Mujeres", "Ambos sexos"]),
        )
        .unwrap();

        let created: Vec<_> = outcome.created.iter().map(|e| e.target.as_str()).collect();
        assert_eq!(created, vec!["MUJERES", "AMBOS_SEXOS"]);
        assert_eq!(outcome.total, 3);
        assert_eq!(store.load_dimension_map("D_SEXO_0").unwrap()[0].target, "H");
    }

    #[test]
    fn extend_completes_blank_targets() {
        let mut store = MemoryStore::default();
        store
            .save_dimension_map("D_EDAD_0", &[DimensionMapEntry::new("Total", "")])
            .unwrap();
        let outcome = extend(&mut store, "D_EDAD_0", &strings(&["Total"])).unwrap();
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(store.load_dimension_map("D_EDAD_0").unwrap()[0].target, "TOTAL");
    }

    #[test]
    fn apply_surfaces_unknown_as_none() {
        let mut store = MemoryStore::default();
        store
            .save_dimension_map("D_SEXO_0", &[DimensionMapEntry::new("Hombres", "H")])
            .unwrap();
        let mapped = apply(&store, "D_SEXO_0", &strings(&["Hombres", "Otro"])).unwrap();
        assert_eq!(mapped, vec![Some("H".to_string()), None]);
    }

    #[test]
    fn map_column_after_extend_has_no_gap() {
        let mut store = MemoryStore::default();
        let values = strings(&["Sevilla", "Málaga", "Sevilla"]);
        extend(&mut store, "D_PROV_0", &values).unwrap();

        let mut df = frame_from_columns(vec![("D_PROV_0".to_string(), values)]).unwrap();
        map_column(&store, &mut df, "D_PROV_0", "D_PROV_0").unwrap();
        assert_eq!(
            column_strings(&df, "D_PROV_0").unwrap(),
            vec!["SEVILLA", "MALAGA", "SEVILLA"]
        );
    }

    #[test]
    fn map_column_reports_gap() {
        let store = MemoryStore::default();
        let mut df =
            frame_from_columns(vec![("D_PROV_0".to_string(), strings(&["Sevilla", "Sevilla"]))])
                .unwrap();
        let error = map_column(&store, &mut df, "D_PROV_0", "D_PROV_0").unwrap_err();
        match error {
            crate::MapError::Gap(gap) => assert_eq!(gap.values, vec!["Sevilla"]),
            other => panic!("unexpected error: {other}"),
        }
    }
}
