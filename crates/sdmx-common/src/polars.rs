//! Polars helpers for string-typed tables.

use std::collections::HashSet;

use polars::prelude::*;

/// Build a string column.
pub fn string_column(name: &str, values: Vec<String>) -> Column {
    Series::new(name.into(), values).into_column()
}

/// Build a column repeating `value` for `height` rows.
pub fn constant_column(name: &str, value: &str, height: usize) -> Column {
    string_column(name, vec![value.to_string(); height])
}

/// Build a frame from named string columns, keeping their order.
pub fn frame_from_columns(columns: Vec<(String, Vec<String>)>) -> PolarsResult<DataFrame> {
    let columns = columns
        .into_iter()
        .map(|(name, values)| string_column(&name, values))
        .collect();
    DataFrame::new(columns)
}

/// Read a string column, rendering nulls as empty strings.
pub fn column_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<String>> {
    let ca = df.column(name)?.str()?;
    Ok(ca
        .into_iter()
        .map(|value| value.unwrap_or_default().to_string())
        .collect())
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect()
}

/// Keep only the rows whose flag is set.
pub fn filter_rows(df: &DataFrame, keep: &[bool]) -> PolarsResult<DataFrame> {
    let mask = BooleanChunked::from_slice("keep".into(), keep);
    df.filter(&mask)
}

/// Distinct values in first-seen order.
pub fn unique_in_order<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values {
        let value = value.as_ref();
        if seen.insert(value.to_string()) {
            out.push(value.to_string());
        }
    }
    out
}
