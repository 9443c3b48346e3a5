//! Integration tests for the filesystem store.

use std::fs;
use std::path::Path;

use sdmx_model::config::PathsConfig;
use sdmx_model::{ConceptCatalogEntry, DimensionMapEntry, HierarchyCatalogEntry, HierarchyRow};
use sdmx_store::{CatalogStore, FsStore};
use tempfile::tempdir;

fn store_at(root: &Path) -> FsStore {
    FsStore::new(&PathsConfig::under(root))
}

// ============================================================================
// Dimension maps
// ============================================================================

#[test]
fn dimension_map_file_layout() {
    let dir = tempdir().unwrap();
    let mut store = store_at(dir.path());
    store
        .append_dimension_entries(
            "D_SEXO_1507_0",
            vec![DimensionMapEntry::new("Hombres", "HOMBRES")],
        )
        .unwrap();

    let text = fs::read_to_string(dir.path().join("dimension_maps").join("D_SEXO_1507_0")).unwrap();
    assert_eq!(text, "SOURCE,NAME,TARGET\nHombres,,HOMBRES\n");
}

#[test]
fn dimension_map_never_shrinks_across_runs() {
    let dir = tempdir().unwrap();
    {
        let mut store = store_at(dir.path());
        store
            .append_dimension_entries(
                "INDICATOR",
                vec![
                    DimensionMapEntry::new("Personas", "PERSO"),
                    DimensionMapEntry::new("Tasa", "TASA"),
                ],
            )
            .unwrap();
    }
    let mut store = store_at(dir.path());
    let merged = store
        .append_dimension_entries("INDICATOR", vec![DimensionMapEntry::new("Tasa", "OTHER")])
        .unwrap();
    let sources: Vec<_> = merged.iter().map(|entry| entry.source.as_str()).collect();
    assert_eq!(sources, vec!["Personas", "Tasa"]);
    assert_eq!(merged[1].target, "TASA");
}

#[test]
fn hand_edited_map_is_read_back() {
    let dir = tempdir().unwrap();
    let maps = dir.path().join("dimension_maps");
    fs::create_dir_all(&maps).unwrap();
    fs::write(maps.join("D_EDAD_0"), "SOURCE,NAME,TARGET\n16-19,De 16 a 19,Y16T19\n").unwrap();

    let store = store_at(dir.path());
    let entries = store.load_dimension_map("D_EDAD_0").unwrap();
    assert_eq!(entries[0].name, "De 16 a 19");
    assert_eq!(entries[0].target, "Y16T19");
}

// ============================================================================
// Hierarchies and catalogs
// ============================================================================

#[test]
fn indicator_hierarchy_uses_semicolons() {
    let dir = tempdir().unwrap();
    let mut store = store_at(dir.path());
    store
        .append_indicator_rows(vec![HierarchyRow {
            id: "PERSO".to_string(),
            cod: "Personas".to_string(),
            name: "Personas".to_string(),
            ..HierarchyRow::default()
        }])
        .unwrap();
    let text = fs::read_to_string(dir.path().join("hierarchies").join("INDICATOR")).unwrap();
    assert_eq!(text, "ID;COD;NAME;PARENTCODE\nPERSO;Personas;Personas;\n");
}

#[test]
fn catalogs_persist_as_yaml() {
    let dir = tempdir().unwrap();
    let mut store = store_at(dir.path());
    store
        .register_hierarchy(
            "SEXO_1507",
            HierarchyCatalogEntry::new("SEXO_1507", "ESC01", "Sexo", "h/sdmx/1/D_SEXO_1507_0.csv".to_string()),
        )
        .unwrap();
    store
        .register_concept(
            "SEXO_1507",
            ConceptCatalogEntry::dimension("SEXO_1507", "ESC01", "EMPLEO", "Sexo"),
        )
        .unwrap();

    let reopened = store_at(dir.path());
    let hierarchies = reopened.load_hierarchy_catalog().unwrap();
    assert_eq!(hierarchies["SEXO_1507"].id, "CL_SEXO_1507");
    let concepts = reopened.load_concept_catalog().unwrap();
    assert_eq!(concepts["SEXO_1507"].codelist.id, "CL_SEXO_1507");
    let yaml = fs::read_to_string(dir.path().join("jerarquias.yaml")).unwrap();
    assert!(yaml.contains("fichero:"));
}

#[test]
fn anomaly_log_appends_once() {
    let dir = tempdir().unwrap();
    let mut store = store_at(dir.path());
    store.record_anomaly("XYZ", "septima").unwrap();
    store.record_anomaly("XYZ", "septima").unwrap();
    store.record_anomaly("1.2.3a", "septima").unwrap();
    let text = fs::read_to_string(dir.path().join("errores").join("errores.csv")).unwrap();
    assert_eq!(text, "valor,tipo\nXYZ,septima\n1.2.3a,septima\n");
}
