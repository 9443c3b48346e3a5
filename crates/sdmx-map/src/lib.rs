//! Source to target identifier translation.
//!
//! - [`extend`] registers values not yet present in a dimension map,
//!   deriving a default TARGET for each.
//! - [`apply`] translates values through a map without extending it.
//! - [`update_measures`] keeps the INDICATOR map and hierarchy in step with
//!   the measures of each query.

pub mod error;
pub mod mapper;
pub mod registry;
pub mod target;

pub use error::{MapError, Result};
pub use mapper::{ExtendOutcome, apply, extend, map_column};
pub use registry::{MeasureUpdate, update_measures};
pub use target::{default_target, fold_accents, measure_target, target_for};
