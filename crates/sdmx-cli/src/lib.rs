//! Library side of the `iecasdmx` binary: logging setup, command bodies and
//! terminal tables.

pub mod commands;
pub mod logging;
pub mod summary;
