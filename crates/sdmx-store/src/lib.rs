//! Shared mutable state of a pipeline run.
//!
//! Dimension maps, the INDICATOR hierarchy, the hierarchy and concept
//! catalogs and the anomaly log are read, merged and rewritten by every
//! query of every activity. [`CatalogStore`] abstracts that state so the
//! pipeline can run against the filesystem ([`FsStore`]) or memory
//! ([`MemoryStore`]).
//!
//! Every write is merge-append-deduplicate-rewrite; nothing is ever removed,
//! so re-running after a crash converges on the same content.

pub mod error;
pub mod fs;
pub mod io;
pub mod memory;
pub mod store;

pub use error::{Result, StoreError};
pub use fs::FsStore;
pub use memory::MemoryStore;
pub use store::{AnomalyRecord, CatalogStore, ConceptCatalog, HierarchyCatalog, dedupe_by};
