//! Row types of the persisted code tables.

use serde::{Deserialize, Serialize};

/// Column order of every exported hierarchy CSV.
pub const HIERARCHY_COLUMNS: [&str; 6] = ["ID", "COD", "NAME", "DESCRIPTION", "PARENTCODE", "ORDER"];

/// Column order of the shared INDICATOR hierarchy.
pub const INDICATOR_COLUMNS: [&str; 4] = ["ID", "COD", "NAME", "PARENTCODE"];

/// Column order of every dimension map CSV.
pub const MAP_COLUMNS: [&str; 3] = ["SOURCE", "NAME", "TARGET"];

/// One code of a flattened hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "COD")]
    pub cod: String,
    #[serde(rename = "NAME")]
    pub name: String,
    #[serde(rename = "DESCRIPTION", default)]
    pub description: String,
    #[serde(rename = "PARENTCODE", default)]
    pub parent_code: String,
    #[serde(rename = "ORDER", default)]
    pub order: String,
}

impl HierarchyRow {
    pub fn to_record(&self) -> [&str; 6] {
        [
            self.id.as_str(),
            self.cod.as_str(),
            self.name.as_str(),
            self.description.as_str(),
            self.parent_code.as_str(),
            self.order.as_str(),
        ]
    }

    /// Fields in [`INDICATOR_COLUMNS`] order.
    pub fn to_indicator_record(&self) -> [&str; 4] {
        [
            self.id.as_str(),
            self.cod.as_str(),
            self.name.as_str(),
            self.parent_code.as_str(),
        ]
    }
}

/// SOURCE to TARGET translation of one dimension value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionMapEntry {
    #[serde(rename = "SOURCE")]
    pub source: String,
    #[serde(rename = "NAME", default)]
    pub name: String,
    #[serde(rename = "TARGET", default)]
    pub target: String,
}

impl DimensionMapEntry {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            name: String::new(),
            target: target.into(),
        }
    }

    /// True when the entry still lacks a usable TARGET.
    pub fn is_incomplete(&self) -> bool {
        self.target.trim().is_empty()
    }
}
