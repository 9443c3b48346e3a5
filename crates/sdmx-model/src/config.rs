//! Pipeline configuration loaded from a TOML document.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::periodicity::FrequencyTable;

pub const DEFAULT_API_BASE_URL: &str =
    "https://www.juntadeandalucia.es/institutodeestadisticaycartografia/intranet/admin/rest/v1.0/consulta/";

/// Number of node properties exported per hierarchy row.
pub const HIERARCHY_PROPERTY_COUNT: usize = 6;

/// Storage locations. Relative paths are resolved against the directory of
/// the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub data: PathBuf,
    pub hierarchies: PathBuf,
    pub dimension_maps: PathBuf,
    pub json_cache: PathBuf,
    /// Anomaly log file (`errores.csv`).
    pub errors: PathBuf,
    /// Root for per-activity descriptors.
    pub sdmx: PathBuf,
    pub hierarchy_catalog: PathBuf,
    pub concept_catalog: PathBuf,
}

impl PathsConfig {
    /// Every path below `root`, using the conventional directory names.
    pub fn under(root: &Path) -> Self {
        Self {
            data: root.join("data"),
            hierarchies: root.join("hierarchies"),
            dimension_maps: root.join("dimension_maps"),
            json_cache: root.join("json"),
            errors: root.join("errores").join("errores.csv"),
            sdmx: root.join("sdmx"),
            hierarchy_catalog: root.join("jerarquias.yaml"),
            concept_catalog: root.join("mapa_conceptos_codelists.yaml"),
        }
    }

    fn rebase(&mut self, base: &Path) {
        for path in [
            &mut self.data,
            &mut self.hierarchies,
            &mut self.dimension_maps,
            &mut self.json_cache,
            &mut self.errors,
            &mut self.sdmx,
            &mut self.hierarchy_catalog,
            &mut self.concept_catalog,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// One configured activity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    /// API query ids in processing order.
    pub queries: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub paths: PathsConfig,
    /// Prefer cached API payloads over live requests.
    #[serde(default)]
    pub cache_search: bool,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Agency recorded in the hierarchy catalog.
    pub node_id: String,
    #[serde(default = "default_concept_agency")]
    pub concept_agency: String,
    #[serde(default = "default_temporal_dimension")]
    pub temporal_dimension: String,
    /// Measures never turned into INDICATOR values.
    #[serde(default)]
    pub excluded_measures: Vec<String>,
    /// Measures whose column becomes OBS_STATUS.
    #[serde(default)]
    pub status_measures: Vec<String>,
    #[serde(default = "default_dropped_obs_values")]
    pub dropped_obs_values: Vec<String>,
    #[serde(default = "default_month_insertion")]
    pub month_insertion_periodicities: Vec<String>,
    /// Node properties mapped onto ID, COD, NAME, DESCRIPTION, PARENTCODE, ORDER.
    #[serde(default = "default_hierarchy_properties")]
    pub hierarchy_properties: Vec<String>,
    #[serde(default = "default_anomaly_tag")]
    pub anomaly_tag: String,
    #[serde(default)]
    pub frequencies: FrequencyTable,
    #[serde(default)]
    pub activities: BTreeMap<String, ActivityConfig>,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_concept_agency() -> String {
    "ESC01".to_string()
}

fn default_temporal_dimension() -> String {
    "D_TEMPORAL_0".to_string()
}

fn default_dropped_obs_values() -> Vec<String> {
    ["", "-", "*", "se"].map(String::from).to_vec()
}

fn default_month_insertion() -> Vec<String> {
    [
        "Mensual",
        "Trimestral",
        "Mensual  Fuente: Instituto Nacional de Estadística",
    ]
    .map(String::from)
    .to_vec()
}

fn default_hierarchy_properties() -> Vec<String> {
    ["id", "cod", "label", "des", "parentId", "order"]
        .map(String::from)
        .to_vec()
}

fn default_anomaly_tag() -> String {
    "septima".to_string()
}

impl PipelineConfig {
    /// A configuration rooted at `root` with every optional key defaulted.
    pub fn with_root(root: &Path, node_id: impl Into<String>) -> Self {
        Self {
            paths: PathsConfig::under(root),
            cache_search: false,
            api_base_url: default_api_base_url(),
            node_id: node_id.into(),
            concept_agency: default_concept_agency(),
            temporal_dimension: default_temporal_dimension(),
            excluded_measures: Vec::new(),
            status_measures: Vec::new(),
            dropped_obs_values: default_dropped_obs_values(),
            month_insertion_periodicities: default_month_insertion(),
            hierarchy_properties: default_hierarchy_properties(),
            anomaly_tag: default_anomaly_tag(),
            frequencies: FrequencyTable::default(),
            activities: BTreeMap::new(),
        }
    }

    /// Load and validate the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.paths.rebase(base);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_id.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "node_id".to_string(),
            });
        }
        if self.temporal_dimension.trim().is_empty() {
            return Err(ConfigError::MissingKey {
                key: "temporal_dimension".to_string(),
            });
        }
        if self.hierarchy_properties.len() != HIERARCHY_PROPERTY_COUNT {
            return Err(ConfigError::Invalid {
                key: "hierarchy_properties".to_string(),
                message: format!(
                    "expected {HIERARCHY_PROPERTY_COUNT} properties, found {}",
                    self.hierarchy_properties.len()
                ),
            });
        }
        if let Some((label, _)) = self.frequencies.iter().find(|(_, code)| code.trim().is_empty()) {
            return Err(ConfigError::Invalid {
                key: "frequencies".to_string(),
                message: format!("periodicity '{label}' has an empty FREQ code"),
            });
        }
        for (name, activity) in &self.activities {
            if activity.category.trim().is_empty() {
                return Err(ConfigError::MissingKey {
                    key: format!("activities.{name}.category"),
                });
            }
        }
        Ok(())
    }

    pub fn activity(&self, name: &str) -> Option<&ActivityConfig> {
        self.activities.get(name)
    }

    /// Whether values of this periodicity are `YYYYMM` and need a `-` inserted.
    pub fn needs_month_insertion(&self, periodicity: &str) -> bool {
        self.month_insertion_periodicities
            .iter()
            .any(|label| label == periodicity)
    }
}
