//! repocache - versioned SQLite caches for package repository metadata
//!
//! Builds the primary, filelists and other caches from package records and
//! rebuilds them only when the source metadata or the schema version
//! changes.

pub mod cache;
pub mod cli;
pub mod config;
pub mod encode;
pub mod error;
pub mod ingest;
pub mod package;
pub mod schema;
pub mod ui;
pub mod writer;

pub use error::{RepoCacheError, RepoCacheResult};
