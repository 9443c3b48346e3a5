//! Observation reshaping: from API rows to the SDMX long format.
//!
//! 1. tabulate: one column per hierarchy alias, then one per measure label
//! 2. temporal normalization (`YYYYMM` to `YYYY-MM` where configured)
//! 3. strip `P<digit>_` source prefixes from every cell
//! 4. disaggregate measures into `INDICATOR` / `OBS_VALUE` rows
//! 5. tag the constant `FREQ` column

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Instant;

use polars::prelude::DataFrame;
use regex::Regex;
use sdmx_common::{column_strings, constant_column, frame_from_columns, string_column};
use sdmx_model::{Cell, DataError, FREQ, INDICATOR, OBS_STATUS, OBS_VALUE, PipelineConfig};
use tracing::{debug, info_span};

use crate::error::Result;

static CODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P\d_\s*").expect("valid code prefix pattern"));

/// Tables produced for one query.
#[derive(Debug, Clone)]
pub struct Reshaped {
    /// Tabulated rows after temporal normalization and prefix cleanup.
    pub wide: DataFrame,
    /// Long-format observations: keys, INDICATOR, OBS_VALUE, FREQ.
    pub long: DataFrame,
    /// SDMX frequency code of the query.
    pub freq: String,
}

/// Run every reshaping step for one query.
///
/// The frequency is resolved first so an unknown periodicity fails before
/// any table is built.
pub fn reshape(
    rows: &[Vec<Cell>],
    aliases: &[String],
    measures: &[String],
    periodicity: &str,
    config: &PipelineConfig,
    query_id: &str,
) -> Result<Reshaped> {
    let freq = config.frequencies.lookup(periodicity)?.to_string();

    let start = Instant::now();
    let mut wide = info_span!("tabulate").in_scope(|| tabulate(rows, aliases, measures, query_id))?;
    if config.needs_month_insertion(periodicity) {
        insert_month_separator(&mut wide, &config.temporal_dimension)?;
    }
    strip_code_prefixes(&mut wide)?;
    debug!(
        query_id,
        rows = wide.height(),
        columns = wide.width(),
        duration_ms = start.elapsed().as_millis(),
        "observations tabulated"
    );

    let start = Instant::now();
    let mut long = info_span!("disaggregate").in_scope(|| {
        disaggregate(
            &wide,
            aliases,
            measures,
            &config.excluded_measures,
            &config.status_measures,
        )
    })?;
    let height = long.height();
    long.with_column(constant_column(FREQ, &freq, height))?;
    debug!(
        query_id,
        rows = height,
        freq = %freq,
        duration_ms = start.elapsed().as_millis(),
        "observations disaggregated"
    );

    Ok(Reshaped { wide, long, freq })
}

/// Build the wide table: hierarchy columns take the last code of each
/// path, measure columns take the value or, when empty, the display format.
pub fn tabulate(
    rows: &[Vec<Cell>],
    aliases: &[String],
    measures: &[String],
    query_id: &str,
) -> std::result::Result<DataFrame, DataError> {
    if rows.is_empty() {
        return Err(DataError::EmptyResult {
            query_id: query_id.to_string(),
        });
    }
    let names: Vec<&String> = aliases.iter().chain(measures).collect();
    let mut seen = HashSet::new();
    if let Some(duplicate) = names.iter().copied().find(|name| !seen.insert(*name)) {
        return Err(DataError::MalformedPayload {
            message: format!("duplicate column '{duplicate}'"),
        });
    }

    let mut columns: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); names.len()];
    for (row_index, row) in rows.iter().enumerate() {
        if row.len() != names.len() {
            return Err(DataError::RowShape {
                row: row_index,
                expected: names.len(),
                found: row.len(),
            });
        }
        for (column_index, cell) in row.iter().enumerate() {
            let is_hierarchy = column_index < aliases.len();
            let value = match (is_hierarchy, cell) {
                (true, Cell::Coded { cod }) if !cod.is_empty() => cod[cod.len() - 1].clone(),
                (false, Cell::Value { val, format }) => {
                    if val.is_empty() { format.clone() } else { val.clone() }
                }
                _ => {
                    return Err(DataError::MalformedCell {
                        row: row_index,
                        column: names[column_index].clone(),
                        expected: if is_hierarchy { "coded" } else { "value" },
                    });
                }
            };
            columns[column_index].push(value);
        }
    }

    let columns = names
        .into_iter()
        .cloned()
        .zip(columns)
        .collect::<Vec<_>>();
    frame_from_columns(columns).map_err(|error| DataError::MalformedPayload {
        message: error.to_string(),
    })
}

/// Rewrite `YYYYMM` temporal values as `YYYY-MM`. Absent columns are ignored.
fn insert_month_separator(df: &mut DataFrame, column: &str) -> Result<()> {
    if df.column(column).is_err() {
        return Ok(());
    }
    let values: Vec<String> = column_strings(df, column)?
        .into_iter()
        .map(|value| {
            let split = value.char_indices().nth(4).map_or(value.len(), |(i, _)| i);
            format!("{}-{}", &value[..split], &value[split..])
        })
        .collect();
    df.with_column(string_column(column, values))?;
    Ok(())
}

/// Remove leading `P<digit>_` markers from every cell.
fn strip_code_prefixes(df: &mut DataFrame) -> Result<()> {
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    for name in names {
        let values: Vec<String> = column_strings(df, &name)?
            .into_iter()
            .map(|value| CODE_PREFIX.replace(&value, "").into_owned())
            .collect();
        df.with_column(string_column(&name, values))?;
    }
    Ok(())
}

/// Un-pivot measure columns into `INDICATOR` / `OBS_VALUE` pairs.
///
/// Measures in `excluded` are dropped. At most one measure may appear in
/// `status_measures`; its column becomes `OBS_STATUS` and joins the key
/// columns. Output columns are, in order: the hierarchy columns, OBS_STATUS
/// when present, INDICATOR, OBS_VALUE. Blocks are emitted measure by measure.
pub fn disaggregate(
    wide: &DataFrame,
    aliases: &[String],
    measures: &[String],
    excluded: &[String],
    status_measures: &[String],
) -> Result<DataFrame> {
    let status: Vec<&String> = measures
        .iter()
        .filter(|measure| status_measures.contains(measure))
        .collect();
    if status.len() > 1 {
        return Err(DataError::MultipleStatusMeasures {
            measures: status.into_iter().cloned().collect(),
        }
        .into());
    }

    let mut keys: Vec<(String, Vec<String>)> = Vec::with_capacity(aliases.len() + 1);
    for alias in aliases {
        keys.push((alias.clone(), read_column(wide, alias)?));
    }
    if let Some(measure) = status.first() {
        keys.push((OBS_STATUS.to_string(), read_column(wide, measure)?));
    }

    let kept: Vec<&String> = measures
        .iter()
        .filter(|measure| !status_measures.contains(measure) && !excluded.contains(measure))
        .collect();
    let height = wide.height();
    let total = height * kept.len();

    let mut key_columns: Vec<(String, Vec<String>)> = keys
        .iter()
        .map(|(name, _)| (name.clone(), Vec::with_capacity(total)))
        .collect();
    let mut indicator = Vec::with_capacity(total);
    let mut obs_value = Vec::with_capacity(total);
    for measure in kept {
        for ((_, source), (_, target)) in keys.iter().zip(key_columns.iter_mut()) {
            target.extend(source.iter().cloned());
        }
        indicator.extend(std::iter::repeat_n(measure.clone(), height));
        obs_value.extend(read_column(wide, measure)?);
    }

    key_columns.push((INDICATOR.to_string(), indicator));
    key_columns.push((OBS_VALUE.to_string(), obs_value));
    Ok(frame_from_columns(key_columns)?)
}

fn read_column(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    if df.column(name).is_err() {
        return Err(DataError::MissingColumn {
            column: name.to_string(),
        }
        .into());
    }
    Ok(column_strings(df, name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn coded(code: &str) -> Cell {
        Cell::Coded {
            cod: vec!["P0_TOTAL".to_string(), code.to_string()],
        }
    }

    fn value(val: &str, format: &str) -> Cell {
        Cell::Value {
            val: val.to_string(),
            format: format.to_string(),
        }
    }

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    fn config() -> PipelineConfig {
        PipelineConfig::with_root(Path::new("/tmp/unused"), "ESC01")
    }

    fn rows() -> Vec<Vec<Cell>> {
        vec![
            vec![coded("P1_04"), coded("200501"), value("10", "10"), value("", "p")],
            vec![coded("P1_11"), coded("200502"), value("1,5", "1,5"), value("2", "2")],
        ]
    }

    #[test]
    fn tabulate_takes_last_code_and_value_or_format() {
        let df = tabulate(
            &rows(),
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            "1",
        )
        .unwrap();
        assert_eq!(
            column_strings(&df, "D_TERRITORIO_0").unwrap(),
            vec!["P1_04", "P1_11"]
        );
        assert_eq!(column_strings(&df, "Tasa").unwrap(), vec!["p", "2"]);
    }

    #[test]
    fn tabulate_rejects_empty_and_misshapen_rows() {
        let aliases = names(&["D_TERRITORIO_0"]);
        let measures = names(&["Personas"]);
        assert!(matches!(
            tabulate(&[], &aliases, &measures, "9"),
            Err(DataError::EmptyResult { query_id }) if query_id == "9"
        ));
        let short = vec![vec![coded("04")]];
        assert!(matches!(
            tabulate(&short, &aliases, &measures, "9"),
            Err(DataError::RowShape { expected: 2, found: 1, .. })
        ));
        let swapped = vec![vec![value("1", "1"), coded("04")]];
        assert!(matches!(
            tabulate(&swapped, &aliases, &measures, "9"),
            Err(DataError::MalformedCell { row: 0, .. })
        ));
    }

    #[test]
    fn reshape_monthly_query() {
        let reshaped = reshape(
            &rows(),
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            "Mensual",
            &config(),
            "1",
        )
        .unwrap();

        assert_eq!(
            column_strings(&reshaped.wide, "D_TEMPORAL_0").unwrap(),
            vec!["2005-01", "2005-02"]
        );
        assert_eq!(
            column_strings(&reshaped.wide, "D_TERRITORIO_0").unwrap(),
            vec!["04", "11"]
        );
        let long = &reshaped.long;
        assert_eq!(
            sdmx_common::column_names(long),
            vec!["D_TERRITORIO_0", "D_TEMPORAL_0", "INDICATOR", "OBS_VALUE", "FREQ"]
        );
        assert_eq!(long.height(), 4);
        assert_eq!(
            column_strings(long, "INDICATOR").unwrap(),
            vec!["Personas", "Personas", "Tasa", "Tasa"]
        );
        assert_eq!(
            column_strings(long, "OBS_VALUE").unwrap(),
            vec!["10", "1,5", "p", "2"]
        );
        assert_eq!(column_strings(long, "FREQ").unwrap(), vec!["M"; 4]);
    }

    #[test]
    fn annual_values_pass_through() {
        let rows = vec![vec![coded("2019"), value("3", "3")]];
        let reshaped = reshape(
            &rows,
            &names(&["D_TEMPORAL_0"]),
            &names(&["Personas"]),
            "Anual",
            &config(),
            "1",
        )
        .unwrap();
        assert_eq!(column_strings(&reshaped.long, "D_TEMPORAL_0").unwrap(), vec!["2019"]);
        assert_eq!(reshaped.freq, "A");
    }

    #[test]
    fn unknown_periodicity_fails_before_tabulating() {
        let error = reshape(&[], &[], &[], "Semanal", &config(), "1").unwrap_err();
        assert!(matches!(
            error,
            crate::TransformError::Config(sdmx_model::ConfigError::UnknownPeriodicity { .. })
        ));
    }

    #[test]
    fn status_measure_becomes_key_column() {
        let wide = tabulate(
            &rows(),
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            "1",
        )
        .unwrap();
        let long = disaggregate(
            &wide,
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            &[],
            &names(&["Tasa"]),
        )
        .unwrap();
        assert_eq!(
            sdmx_common::column_names(&long),
            vec!["D_TERRITORIO_0", "D_TEMPORAL_0", "OBS_STATUS", "INDICATOR", "OBS_VALUE"]
        );
        assert_eq!(long.height(), 2);
        assert_eq!(column_strings(&long, "OBS_STATUS").unwrap(), vec!["p", "2"]);
    }

    #[test]
    fn excluded_measures_are_dropped() {
        let wide = tabulate(
            &rows(),
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            "1",
        )
        .unwrap();
        let long = disaggregate(
            &wide,
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            &names(&["Personas"]),
            &[],
        )
        .unwrap();
        assert_eq!(column_strings(&long, "INDICATOR").unwrap(), vec!["Tasa", "Tasa"]);
    }

    #[test]
    fn two_status_measures_fail() {
        let wide = tabulate(
            &rows(),
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            "1",
        )
        .unwrap();
        let error = disaggregate(
            &wide,
            &names(&["D_TERRITORIO_0", "D_TEMPORAL_0"]),
            &names(&["Personas", "Tasa"]),
            &[],
            &names(&["Personas", "Tasa"]),
        )
        .unwrap_err();
        assert!(matches!(
            error,
            crate::TransformError::Data(DataError::MultipleStatusMeasures { .. })
        ));
    }
}
