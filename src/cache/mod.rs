//! Versioned on-disk metadata caches
//!
//! Each cache is a SQLite file carrying an identity record: the schema
//! version it was written with and the checksum of the metadata file it was
//! built from. A cache is rebuilt only when one of them no longer matches.
//!
//! # Cache States
//!
//! | State | Store | Description |
//! |-------|-------|-------------|
//! | Absent | created | No file, tables created empty |
//! | Fresh | untouched | Identity matches, nothing to write |
//! | StaleChecksum | kept | Identity row erased, content tables reused |
//! | StaleVersion | recreated | Old version, no identity or damaged file |
//!
//! The identity row is written last, by [`CacheSession::commit`]. Until then
//! the file reads as `StaleVersion`, so an interrupted build is never
//! mistaken for a complete one.

pub mod identity;
pub mod reconcile;
pub mod store;

pub use identity::{checksum_bytes, checksum_file, db_filename, CacheIdentity, CACHE_DBVERSION, DB_SUFFIX};
pub use reconcile::{probe, reconcile, CacheSession, CacheState, Reconciled};
pub use store::{remove_store_files, CacheStore};
