//! Periodicity labels and SDMX frequency codes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_FREQUENCIES: [(&str, &str); 17] = [
    ("Mensual", "M"),
    ("Anual", "A"),
    ("Mensual  Fuente: Instituto Nacional de Estadística", "M"),
    ("", "M"),
    ("Anual. Datos a 31 de diciembre", "A"),
    ("(Mensual)", "M"),
    ("Trimestral", "Q"),
    ("(Trimestral)", "Q"),
    ("(Anual)", "A"),
    ("Puntual", "P"),
    ("Decenal", "A10"),
    ("Quinquenal", "A5"),
    ("Irregular", "I"),
    ("Bienal/Trienal", "A2"),
    ("Bienal", "A2"),
    ("Trienal", "A3"),
    ("Cuatrienal", "A4"),
];

/// Lookup from the API's periodicity label to an SDMX `FREQ` code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<String, String>);

impl Default for FrequencyTable {
    fn default() -> Self {
        Self(
            DEFAULT_FREQUENCIES
                .iter()
                .map(|(label, code)| ((*label).to_string(), (*code).to_string()))
                .collect(),
        )
    }
}

impl FrequencyTable {
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self(entries)
    }

    /// Resolve a periodicity label. Unlisted labels are a configuration error.
    pub fn lookup(&self, periodicity: &str) -> Result<&str, ConfigError> {
        self.0
            .get(periodicity)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownPeriodicity {
                label: periodicity.to_string(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Calendar unit a query's temporal values are expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Year,
    Quarter,
    Month,
    /// Point-in-time or irregular series; the unit is read from each value.
    Inferred,
}

impl Granularity {
    pub fn from_freq(code: &str) -> Self {
        match code {
            "Q" => Self::Quarter,
            "M" => Self::Month,
            c if c.starts_with('A') => Self::Year,
            _ => Self::Inferred,
        }
    }
}
