//! Transformations from IECA payloads to SDMX tables.
//!
//! - [`hierarchy`]: flatten category trees and derive their two exports
//! - [`reshape`]: tabulate observations and un-pivot measures into
//!   `INDICATOR`/`OBS_VALUE`
//! - [`status`]: classify raw `OBS_VALUE` cells
//! - [`validity`]: activity validity windows from temporal values

pub mod error;
pub mod hierarchy;
pub mod reshape;
pub mod status;
pub mod validity;

pub use error::{Result, TransformError};
pub use hierarchy::{FlatHierarchy, flatten, original_table, sdmx_table, strip_code_prefix};
pub use reshape::{Reshaped, disaggregate, reshape, tabulate};
pub use status::{Finalized, ObsValue, classify, finalize_obs_values};
pub use validity::{ValidityWindow, validity_window};
