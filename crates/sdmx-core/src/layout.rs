//! Locations and writers for the per-query and per-activity artifacts.

use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use sdmx_common::{column_names, column_strings};
use sdmx_model::table::HIERARCHY_COLUMNS;
use sdmx_model::{ActivityDescriptor, HierarchyRow, PathsConfig, QueryId};
use sdmx_store::io::{write_csv, write_yaml};

use crate::error::Result;

const TABLE_DELIMITER: u8 = b';';
const DESCRIPTOR_FILE: &str = "configuracion.yaml";

/// Which export of a hierarchy a path refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyVariant {
    Original,
    Sdmx,
}

impl HierarchyVariant {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Sdmx => "sdmx",
        }
    }
}

/// Stage at which an observation table is saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataStage {
    /// Long format before mapping.
    Original,
    /// Mapped, renamed and classified.
    Processed,
    /// Processed plus `_Z` columns for the activity-wide dimension set.
    Extended,
}

impl DataStage {
    fn dir_name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Processed => "procesados",
            Self::Extended => "extendidos",
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutputLayout {
    data: PathBuf,
    hierarchies: PathBuf,
    sdmx: PathBuf,
}

impl OutputLayout {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            data: paths.data.clone(),
            hierarchies: paths.hierarchies.clone(),
            sdmx: paths.sdmx.clone(),
        }
    }

    /// `hierarchies/<activity>/<variant>/<query_id>/<map_name>.csv`
    pub fn hierarchy_path(
        &self,
        activity: &str,
        variant: HierarchyVariant,
        query_id: &QueryId,
        map_name: &str,
    ) -> PathBuf {
        self.hierarchies
            .join(activity)
            .join(variant.dir_name())
            .join(query_id.as_str())
            .join(format!("{map_name}.csv"))
    }

    /// `data/<activity>/<stage>/<query_id>.csv`
    pub fn data_path(&self, activity: &str, stage: DataStage, query_id: &QueryId) -> PathBuf {
        self.data
            .join(activity)
            .join(stage.dir_name())
            .join(format!("{}.csv", query_id.as_str()))
    }

    /// `<sdmx>/<activity>/configuracion.yaml`
    pub fn descriptor_path(&self, activity: &str) -> PathBuf {
        self.sdmx.join(activity).join(DESCRIPTOR_FILE)
    }
}

/// Path as recorded in catalogs: forward slashes on every platform.
pub fn catalog_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

pub fn write_hierarchy(path: &Path, rows: &[HierarchyRow]) -> Result<()> {
    write_csv(
        path,
        TABLE_DELIMITER,
        &HIERARCHY_COLUMNS,
        rows.iter().map(HierarchyRow::to_record),
    )?;
    Ok(())
}

/// Write a string-typed frame with its header, `;`-delimited.
pub fn write_frame(path: &Path, df: &DataFrame) -> Result<()> {
    let names = column_names(df);
    let columns = names
        .iter()
        .map(|name| column_strings(df, name))
        .collect::<polars::prelude::PolarsResult<Vec<_>>>()?;
    let rows = (0..df.height()).map(|row| columns.iter().map(move |column| column[row].as_str()));
    let header: Vec<&str> = names.iter().map(String::as_str).collect();
    write_csv(path, TABLE_DELIMITER, &header, rows)?;
    Ok(())
}

pub fn write_descriptor(path: &Path, descriptor: &ActivityDescriptor) -> Result<()> {
    write_yaml(path, descriptor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdmx_common::frame_from_columns;

    fn layout() -> OutputLayout {
        OutputLayout::new(&PathsConfig::under(Path::new("/si")))
    }

    #[test]
    fn artifact_paths() {
        let layout = layout();
        let query = QueryId::from_configured("42185");
        assert_eq!(
            layout.hierarchy_path("ETDP", HierarchyVariant::Sdmx, &query, "D_SEXO_3_0"),
            PathBuf::from("/si/hierarchies/ETDP/sdmx/42185/D_SEXO_3_0.csv")
        );
        assert_eq!(
            layout.data_path("ETDP", DataStage::Processed, &query),
            PathBuf::from("/si/data/ETDP/procesados/42185.csv")
        );
        assert_eq!(
            layout.descriptor_path("ETDP"),
            PathBuf::from("/si/sdmx/ETDP/configuracion.yaml")
        );
    }

    #[test]
    fn frames_are_semicolon_delimited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.csv");
        let df = frame_from_columns(vec![
            ("SEXO".to_string(), vec!["H".to_string(), "M".to_string()]),
            ("OBS_VALUE".to_string(), vec!["1.5".to_string(), "a;b".to_string()]),
        ])
        .unwrap();
        write_frame(&path, &df).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "SEXO;OBS_VALUE\nH;1.5\nM;\"a;b\"\n");
    }

    #[test]
    fn hierarchies_use_six_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.csv");
        let rows = vec![HierarchyRow {
            id: "04".to_string(),
            cod: "04".to_string(),
            name: "Almería".to_string(),
            description: "Provincia de Almería".to_string(),
            parent_code: "AN".to_string(),
            order: "1".to_string(),
        }];
        write_hierarchy(&path, &rows).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "ID;COD;NAME;DESCRIPTION;PARENTCODE;ORDER\n04;04;Almería;Provincia de Almería;AN;1\n"
        );
    }
}
