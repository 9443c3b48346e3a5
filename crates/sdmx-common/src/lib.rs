//! Shared utilities for the SDMX pipeline crates.
//!
//! Every table the pipeline handles is a Polars `DataFrame` of string
//! columns; this crate holds the helpers for building and reading them.

pub mod polars;

pub use polars::{
    column_names, column_strings, constant_column, filter_rows, frame_from_columns,
    string_column, unique_in_order,
};
