//! Hierarchy flattening and codelist export.
//!
//! A hierarchy arrives as a tree of nodes. It is flattened depth-first into
//! one row per code, then exported twice: the original variant keeps the
//! API codes, the SDMX variant carries mapped ids and a trailing `_Z` row.

use std::collections::HashMap;

use sdmx_map::{apply, extend};
use sdmx_model::{HierarchyNode, HierarchyRow, MappingGap, NOT_APPLICABLE, NOT_APPLICABLE_LABEL};
use sdmx_store::{CatalogStore, dedupe_by};
use tracing::debug;

use crate::error::Result;

/// Both exports of one hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatHierarchy {
    pub original: Vec<HierarchyRow>,
    pub sdmx: Vec<HierarchyRow>,
}

impl FlatHierarchy {
    /// Flatten `root` and derive both variants, extending the `map_name`
    /// dimension map with every code.
    pub fn build<S>(
        store: &mut S,
        map_name: &str,
        root: &HierarchyNode,
        properties: &[String],
    ) -> Result<Self>
    where
        S: CatalogStore + ?Sized,
    {
        let original = original_table(flatten(root, properties));
        let sdmx = sdmx_table(store, map_name, &original)?;
        debug!(
            map_name,
            codes = original.len(),
            sdmx_codes = sdmx.len(),
            "hierarchy flattened"
        );
        Ok(Self { original, sdmx })
    }
}

/// Flatten a tree into rows, keeping the first row per COD.
///
/// `properties` names the six node properties read into ID, COD, NAME,
/// DESCRIPTION, PARENTCODE and ORDER. Descent stops for a whole sibling
/// batch only when every node in it is terminal (no children or flagged
/// last level); otherwise every node of the batch is descended into.
pub fn flatten(root: &HierarchyNode, properties: &[String]) -> Vec<HierarchyRow> {
    let mut rows = Vec::new();
    walk(std::slice::from_ref(root), properties, &mut rows);
    dedupe_by(rows, |row| row.cod.clone())
}

fn walk(batch: &[HierarchyNode], properties: &[String], out: &mut Vec<HierarchyRow>) {
    out.extend(batch.iter().map(|node| node_row(node, properties)));
    if batch.iter().all(HierarchyNode::is_terminal) {
        return;
    }
    for node in batch {
        walk(&node.children, properties, out);
    }
}

fn node_row(node: &HierarchyNode, properties: &[String]) -> HierarchyRow {
    let field = |index: usize| {
        let value = properties
            .get(index)
            .map(|name| node.property(name))
            .unwrap_or_default();
        if value == "null" { String::new() } else { value }
    };
    HierarchyRow {
        id: field(0),
        cod: field(1),
        name: field(2),
        description: field(3),
        parent_code: field(4),
        order: field(5),
    }
}

/// Drop a `P?_` source prefix from a code: `"P1_0401"` becomes `"0401"`.
pub fn strip_code_prefix(cod: &str) -> &str {
    let mut chars = cod.char_indices();
    let first = chars.next();
    let third = chars.nth(1);
    match (first, third) {
        (Some((_, 'P')), Some((index, '_'))) if cod.chars().count() > 3 => &cod[index + 1..],
        _ => cod,
    }
}

/// Original export: prefixes stripped from COD, PARENTCODE rewritten from
/// the parent's ID to the parent's COD.
pub fn original_table(rows: Vec<HierarchyRow>) -> Vec<HierarchyRow> {
    let mut rows: Vec<HierarchyRow> = rows
        .into_iter()
        .map(|mut row| {
            row.cod = strip_code_prefix(&row.cod).to_string();
            row
        })
        .collect();
    let parent_cod: HashMap<String, String> = rows
        .iter()
        .map(|row| (row.id.clone(), row.cod.clone()))
        .collect();
    for row in &mut rows {
        if let Some(cod) = parent_cod.get(&row.parent_code) {
            row.parent_code = cod.clone();
        }
    }
    rows
}

/// SDMX export derived from the original variant.
///
/// Codes are registered in the `map_name` dimension map; ID and PARENTCODE
/// become mapped targets, NAME and DESCRIPTION are swapped, and a `_Z` row
/// is appended before deduplicating by ID.
pub fn sdmx_table<S>(
    store: &mut S,
    map_name: &str,
    original: &[HierarchyRow],
) -> Result<Vec<HierarchyRow>>
where
    S: CatalogStore + ?Sized,
{
    let codes: Vec<String> = original.iter().map(|row| row.cod.clone()).collect();
    extend(store, map_name, &codes)?;
    let ids = apply(&*store, map_name, &codes)?;
    let lookup: HashMap<&str, &str> = codes
        .iter()
        .zip(&ids)
        .filter_map(|(code, id)| id.as_deref().map(|id| (code.as_str(), id)))
        .collect();

    let mut missing = Vec::new();
    let mut rows = Vec::with_capacity(original.len() + 1);
    for row in original {
        let Some(id) = lookup.get(row.cod.as_str()) else {
            missing.push(row.cod.clone());
            continue;
        };
        let parent_code = if row.parent_code.is_empty() {
            String::new()
        } else {
            lookup
                .get(row.parent_code.as_str())
                .map_or_else(|| row.parent_code.clone(), |id| (*id).to_string())
        };
        rows.push(HierarchyRow {
            id: (*id).to_string(),
            cod: row.cod.clone(),
            name: row.description.clone(),
            description: row.name.clone(),
            parent_code,
            order: row.order.clone(),
        });
    }
    if !missing.is_empty() {
        return Err(sdmx_map::MapError::from(MappingGap {
            dimension: map_name.to_string(),
            values: missing,
        })
        .into());
    }

    rows.push(HierarchyRow {
        id: NOT_APPLICABLE.to_string(),
        name: NOT_APPLICABLE_LABEL.to_string(),
        description: NOT_APPLICABLE_LABEL.to_string(),
        ..HierarchyRow::default()
    });
    Ok(dedupe_by(rows, |row| row.id.clone()))
}
