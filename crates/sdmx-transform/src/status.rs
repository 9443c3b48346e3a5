//! Observation value classification for the processed export.

use polars::prelude::DataFrame;
use sdmx_common::{column_strings, filter_rows, string_column};
use sdmx_model::OBS_VALUE;
use sdmx_store::CatalogStore;
use tracing::warn;

use crate::error::Result;

/// Footnote codes the source uses in place of a value, with their labels.
const STATUS_LABELS: [(&str, &str); 24] = [
    ("b", "Ruptura en serie"),
    ("e", "Estimación"),
    ("p", "Provisional"),
    ("--", "No disponible"),
    ("d", "Diferencias en la definición"),
    ("u", "Poco fiable"),
    ("z", "No procede"),
    ("s", "Estimación Eurostat"),
    ("a", "Avance"),
    ("bp", "Ruptura en serie y provisional"),
    ("be", "Ruptura en serie y estimación"),
    ("ep", "Estimación y provisional"),
    ("bu", "Ruptura en serie y poco fiable"),
    ("du", "Diferencias en la definición y poco fiable"),
    ("de", "Diferencias en la definición y estimación"),
    ("r", "Revisado"),
    ("bd", "Ruptura en serie y diferencias en la definición"),
    ("eb", "Estimación y ruptura en serie"),
    ("bep", "Ruptura en serie, estimación y provisional"),
    ("f", "Predicción"),
    ("dp", "Diferencias en la definición y provisional"),
    ("n", "No significativo"),
    ("db", "Diferencias en la definición y ruptura en serie"),
    ("--b", "No disponible y ruptura en serie"),
];

const MISSING_SENTINELS: [&str; 3] = ["..", "(*)", "nd"];

/// Outcome of classifying one raw OBS_VALUE cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObsValue {
    /// A status code, replaced by its label.
    Status(&'static str),
    /// No data; the row is dropped from the processed table.
    Missing,
    /// A number with decimal comma normalized to a point.
    Numeric(String),
    /// Anything else, passed through and logged.
    Anomalous(String),
}

impl ObsValue {
    /// Text written to the processed table, `None` for missing values.
    pub fn into_cell(self) -> Option<String> {
        match self {
            Self::Status(label) => Some(label.to_string()),
            Self::Missing => None,
            Self::Numeric(value) | Self::Anomalous(value) => Some(value),
        }
    }
}

pub fn classify(raw: &str) -> ObsValue {
    if let Some((_, label)) = STATUS_LABELS.iter().find(|(code, _)| *code == raw) {
        return ObsValue::Status(*label);
    }
    if raw.is_empty() || MISSING_SENTINELS.contains(&raw) {
        return ObsValue::Missing;
    }
    if is_numeric(raw) {
        return ObsValue::Numeric(raw.replace(',', "."));
    }
    ObsValue::Anomalous(raw.to_string())
}

/// Digits with optional decimal/thousands separators and one leading minus.
fn is_numeric(raw: &str) -> bool {
    let normalized = raw.replace(',', ".");
    let unsigned = normalized.strip_prefix('-').unwrap_or(&normalized);
    let digits: String = unsigned.chars().filter(|c| *c != '.').collect();
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Processed observation table and what was removed or logged on the way.
#[derive(Debug, Clone)]
pub struct Finalized {
    pub frame: DataFrame,
    /// Anomalous values newly appended to the log.
    pub anomalies: Vec<String>,
    /// Rows dropped because their value was missing.
    pub dropped: usize,
}

/// Classify every OBS_VALUE, drop rows left without a value and append
/// anomalous values to the store's anomaly log under `tag`.
pub fn finalize_obs_values<S>(df: &DataFrame, store: &mut S, tag: &str) -> Result<Finalized>
where
    S: CatalogStore + ?Sized,
{
    let raw = column_strings(df, OBS_VALUE)?;
    let mut values = Vec::with_capacity(raw.len());
    let mut keep = Vec::with_capacity(raw.len());
    let mut anomalies = Vec::new();

    for value in &raw {
        let classified = classify(value);
        if let ObsValue::Anomalous(text) = &classified
            && store.record_anomaly(text, tag)?
        {
            warn!(value = %text, tag, "unrecognized observation value");
            anomalies.push(text.clone());
        }
        match classified.into_cell() {
            Some(cell) => {
                values.push(cell);
                keep.push(true);
            }
            None => {
                values.push(String::new());
                keep.push(false);
            }
        }
    }

    let mut frame = df.clone();
    frame.with_column(string_column(OBS_VALUE, values))?;
    let frame = filter_rows(&frame, &keep)?;
    let dropped = raw.len() - frame.height();
    Ok(Finalized {
        frame,
        anomalies,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdmx_common::frame_from_columns;
    use sdmx_store::MemoryStore;

    // ========================================================================
    // classify
    // ========================================================================

    #[test]
    fn status_codes_become_labels() {
        assert_eq!(classify("p"), ObsValue::Status("Provisional"));
        assert_eq!(
            classify("bep"),
            ObsValue::Status("Ruptura en serie, estimación y provisional")
        );
        assert_eq!(classify("--"), ObsValue::Status("No disponible"));
        assert_eq!(
            classify("--b"),
            ObsValue::Status("No disponible y ruptura en serie")
        );
    }

    #[test]
    fn missing_sentinels() {
        for raw in ["", "..", "(*)", "nd"] {
            assert_eq!(classify(raw), ObsValue::Missing, "{raw:?}");
        }
    }

    #[test]
    fn numbers_are_normalized() {
        assert_eq!(classify("12,5"), ObsValue::Numeric("12.5".to_string()));
        assert_eq!(classify("-3"), ObsValue::Numeric("-3".to_string()));
        assert_eq!(classify("0,25"), ObsValue::Numeric("0.25".to_string()));
        assert_eq!(classify("100"), ObsValue::Numeric("100".to_string()));
    }

    #[test]
    fn everything_else_is_anomalous() {
        assert_eq!(classify("XYZ"), ObsValue::Anomalous("XYZ".to_string()));
        assert_eq!(classify("1-2"), ObsValue::Anomalous("1-2".to_string()));
        assert_eq!(classify("-"), ObsValue::Anomalous("-".to_string()));
        assert_eq!(classify(","), ObsValue::Anomalous(",".to_string()));
    }

    // ========================================================================
    // finalize_obs_values
    // ========================================================================

    #[test]
    fn finalize_drops_missing_and_logs_anomalies() {
        let df = frame_from_columns(vec![
            (
                "TERRITORIO".to_string(),
                vec!["04", "11", "14", "18"].into_iter().map(String::from).collect(),
            ),
            (
                OBS_VALUE.to_string(),
                vec!["1,5", "..", "e", "XYZ"].into_iter().map(String::from).collect(),
            ),
        ])
        .unwrap();
        let mut store = MemoryStore::default();

        let finalized = finalize_obs_values(&df, &mut store, "septima").unwrap();
        assert_eq!(finalized.dropped, 1);
        assert_eq!(finalized.anomalies, vec!["XYZ"]);
        assert_eq!(
            column_strings(&finalized.frame, OBS_VALUE).unwrap(),
            vec!["1.5", "Estimación", "XYZ"]
        );
        assert_eq!(
            column_strings(&finalized.frame, "TERRITORIO").unwrap(),
            vec!["04", "14", "18"]
        );
        assert_eq!(store.anomalies.len(), 1);

        let again = finalize_obs_values(&df, &mut store, "septima").unwrap();
        assert!(again.anomalies.is_empty());
        assert_eq!(store.anomalies.len(), 1);
    }
}
