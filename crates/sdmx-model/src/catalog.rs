//! Entries of the hierarchy and concept/codelist catalogs.
//!
//! Both catalogs are YAML mappings keyed by the dimension short name; the
//! field names below are the keys downstream tooling reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const CATALOG_VERSION: &str = "1.0";

fn localized(text: &str) -> BTreeMap<String, String> {
    BTreeMap::from([("es".to_string(), text.to_string())])
}

/// Hierarchy catalog entry: codelist identity plus the CSV files backing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyCatalogEntry {
    #[serde(rename = "ID")]
    pub id: String,
    pub agency: String,
    pub version: String,
    pub nombre: BTreeMap<String, String>,
    pub description: BTreeMap<String, String>,
    pub fichero: Vec<String>,
}

impl HierarchyCatalogEntry {
    pub fn new(name: &str, agency: &str, description: &str, file: String) -> Self {
        Self {
            id: format!("CL_{name}"),
            agency: agency.to_string(),
            version: CATALOG_VERSION.to_string(),
            nombre: localized(name),
            description: localized(description),
            fichero: vec![file],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptSchemeRef {
    pub agency: String,
    pub id: String,
    pub version: String,
    pub concepto: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodelistRef {
    pub agency: String,
    pub id: String,
    pub version: String,
}

/// Concept/codelist catalog entry describing one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptCatalogEntry {
    pub tipo: String,
    pub nombre_dimension: String,
    pub concept_scheme: ConceptSchemeRef,
    pub codelist: CodelistRef,
    pub nombre: BTreeMap<String, String>,
    pub descripcion: BTreeMap<String, String>,
}

impl ConceptCatalogEntry {
    /// Dimension entry whose concept lives in the `CS_<category>` scheme.
    pub fn dimension(name: &str, agency: &str, category: &str, description: &str) -> Self {
        Self {
            tipo: "dimension".to_string(),
            nombre_dimension: name.to_string(),
            concept_scheme: ConceptSchemeRef {
                agency: agency.to_string(),
                id: format!("CS_{category}"),
                version: CATALOG_VERSION.to_string(),
                concepto: name.to_string(),
            },
            codelist: CodelistRef {
                agency: agency.to_string(),
                id: format!("CL_{name}"),
                version: CATALOG_VERSION.to_string(),
            },
            nombre: localized(description),
            descripcion: localized(description),
        }
    }
}
