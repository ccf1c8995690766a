//! Prepared-statement writers for cache content
//!
//! Writers prepare their statement once and reuse it for every row. Failing
//! to prepare is fatal; failing to insert a single row is not: callers log
//! it and carry on with the remaining rows.

mod filelists;
mod other;
mod primary;

pub use filelists::FilelistWriter;
pub use other::ChangelogWriter;
pub use primary::{DependencyWriter, FileWriter, PackageWriter};

use crate::error::{RepoCacheError, RepoCacheResult};
use crate::package::Package;
use rusqlite::{params, Connection, Statement};
use std::collections::HashMap;
use tracing::error;

/// Rows written and rows that failed during one multi-row write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCount {
    pub written: usize,
    pub failed: usize,
}

impl WriteCount {
    /// Count a row result, logging the error of a failed row
    pub fn record(&mut self, result: RepoCacheResult<()>) {
        match result {
            Ok(()) => self.written += 1,
            Err(e) => {
                error!("{}", e);
                self.failed += 1;
            }
        }
    }

    pub fn merge(&mut self, other: WriteCount) {
        self.written += other.written;
        self.failed += other.failed;
    }
}

/// Inserts `(pkgId)` rows into the `packages` table of filelists and other caches
pub struct PackageIdWriter<'conn> {
    stmt: Statement<'conn>,
}

impl<'conn> PackageIdWriter<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoCacheResult<Self> {
        let stmt = conn
            .prepare("INSERT INTO packages (pkgId) VALUES (?1)")
            .map_err(|e| RepoCacheError::prepare("package ids", e))?;
        Ok(Self { stmt })
    }

    /// Insert a package id, returning the new pkgKey
    pub fn write(&mut self, package: &Package) -> RepoCacheResult<i64> {
        self.stmt
            .insert(params![package.pkg_id])
            .map_err(|e| RepoCacheError::write("package", e))
    }
}

/// Map every stored pkgId to its pkgKey
pub fn read_package_ids(conn: &Connection) -> RepoCacheResult<HashMap<String, i64>> {
    let read_err = |source| RepoCacheError::PackageRead { source };

    let mut stmt = conn
        .prepare("SELECT pkgId, pkgKey FROM packages")
        .map_err(read_err)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .map_err(read_err)?;

    rows.collect::<rusqlite::Result<HashMap<_, _>>>()
        .map_err(read_err)
}

/// Delete a package; triggers remove its dependent rows
pub fn delete_package(conn: &Connection, pkg_key: i64) -> RepoCacheResult<()> {
    conn.execute("DELETE FROM packages WHERE pkgKey = ?1", params![pkg_key])
        .map(|_| ())
        .map_err(|e| RepoCacheError::write("package removal", e))
}
