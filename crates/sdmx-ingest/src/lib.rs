//! Payload acquisition for the pipeline.
//!
//! [`ApiSource`] talks to the IECA REST API and keeps a JSON cache on disk;
//! [`MemorySource`] serves canned payloads. Both implement [`PayloadSource`].

pub mod api;
pub mod cache;
pub mod error;
pub mod memory;
pub mod source;

pub use api::ApiSource;
pub use cache::JsonCache;
pub use error::{FetchError, Result};
pub use memory::MemorySource;
pub use source::PayloadSource;
