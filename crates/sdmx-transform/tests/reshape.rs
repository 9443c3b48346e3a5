//! End-to-end reshaping of a decoded query payload.

use std::path::Path;

use proptest::prelude::*;
use sdmx_common::column_strings;
use sdmx_model::{Cell, Granularity, PipelineConfig, QueryPayload};
use sdmx_transform::{ObsValue, classify, disaggregate, reshape, tabulate, validity_window};
use serde_json::json;

fn config() -> PipelineConfig {
    let mut config = PipelineConfig::with_root(Path::new("/tmp/unused"), "ESC01");
    config.status_measures = vec!["Estado".to_string()];
    config
}

fn quarterly_payload() -> QueryPayload {
    let months = ["200501", "200504", "200507", "200512"];
    let data: Vec<_> = months
        .iter()
        .enumerate()
        .map(|(i, month)| {
            json!([
                {"cod": ["P0_TOT", "P1_04"]},
                {"cod": [month]},
                {"val": i * 10, "format": ""},
                {"val": "", "format": "p"}
            ])
        })
        .collect();
    QueryPayload::from_value(json!({
        "metainfo": {"id": 42185, "title": "Paro registrado", "periodicity": "Trimestral"},
        "hierarchies": [
            {"url": "https://x/jerarquia/17?consultaId=1", "cod": "1", "des": "Territorio", "alias": "D_TERRITORIO_0"},
            {"url": "https://x/jerarquia/2?consultaId=1", "cod": "2", "des": "Temporal", "alias": "D_TEMPORAL_0"}
        ],
        "measures": [{"des": "Personas"}, {"des": "Estado"}],
        "data": data
    }))
    .expect("payload")
}

#[test]
fn quarterly_query_reshapes_and_yields_window() {
    let payload = quarterly_payload();
    let aliases: Vec<String> = payload.hierarchies.iter().map(|h| h.alias.clone()).collect();
    let measures: Vec<String> = payload.measures.iter().map(|m| m.des.clone()).collect();

    let reshaped = reshape(
        payload.rows(),
        &aliases,
        &measures,
        &payload.metainfo.periodicity,
        &config(),
        &payload.metainfo.id,
    )
    .expect("reshape");

    assert_eq!(reshaped.freq, "Q");
    let long = &reshaped.long;
    assert_eq!(long.height(), 4);
    assert_eq!(
        column_strings(long, "OBS_STATUS").unwrap(),
        vec!["p", "p", "p", "p"]
    );
    assert_eq!(
        column_strings(long, "D_TERRITORIO_0").unwrap(),
        vec!["04"; 4]
    );

    let temporal = column_strings(&reshaped.wide, "D_TEMPORAL_0").unwrap();
    assert_eq!(temporal[0], "2005-01");
    let window = validity_window(&temporal, Granularity::from_freq(&reshaped.freq)).unwrap();
    assert_eq!(window.valid_from(), "2005-01-01");
    assert_eq!(window.valid_to(), "2005-12-31");
}

#[test]
fn empty_query_is_data_error() {
    let error = tabulate(&[], &["D_SEXO_0".to_string()], &["Personas".to_string()], "7")
        .unwrap_err();
    assert!(error.to_string().contains('7'));
}

#[test]
fn raw_values_classify_as_documented() {
    assert_eq!(classify("e"), ObsValue::Status("Estimación"));
    assert_eq!(classify("nd"), ObsValue::Missing);
    assert_eq!(classify("3,14"), ObsValue::Numeric("3.14".to_string()));
    assert_eq!(classify("1.2.3a"), ObsValue::Anomalous("1.2.3a".to_string()));
}

fn value_cell(value: u32) -> Cell {
    Cell::Value {
        val: value.to_string(),
        format: String::new(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// One output row per input row and kept measure, and each INDICATOR
    /// block reproduces its measure column.
    #[test]
    fn disaggregation_preserves_every_measure_value(
        matrix in prop::collection::vec(prop::collection::vec(0u32..1000, 3), 1..20)
    ) {
        let aliases = vec!["D_SEXO_0".to_string()];
        let measures = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let rows: Vec<Vec<Cell>> = matrix
            .iter()
            .enumerate()
            .map(|(i, values)| {
                let mut row = vec![Cell::Coded { cod: vec![format!("S{i}")] }];
                row.extend(values.iter().copied().map(value_cell));
                row
            })
            .collect();

        let wide = tabulate(&rows, &aliases, &measures, "1").unwrap();
        let long = disaggregate(&wide, &aliases, &measures, &[], &[]).unwrap();
        prop_assert_eq!(long.height(), rows.len() * measures.len());

        let indicator = column_strings(&long, "INDICATOR").unwrap();
        let obs_value = column_strings(&long, "OBS_VALUE").unwrap();
        for (block, measure) in measures.iter().enumerate() {
            let start = block * rows.len();
            for (row, values) in matrix.iter().enumerate() {
                prop_assert_eq!(&indicator[start + row], measure);
                prop_assert_eq!(&obs_value[start + row], &values[block].to_string());
            }
        }
    }
}
