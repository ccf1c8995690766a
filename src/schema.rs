//! Content tables for the three metadata caches
//!
//! | Kind | Tables | Cascade trigger |
//! |------|--------|-----------------|
//! | primary | packages, files, requires, provides, conflicts, obsoletes | removals |
//! | filelists | packages, filelist | remove_filelist |
//! | other | packages, changelog | remove_changelogs |
//!
//! Deleting a row from `packages` removes every dependent row through the
//! trigger, which is how an updated cache drops packages that went away.

use crate::error::{RepoCacheError, RepoCacheResult};
use crate::package::DependencyTable;
use clap::ValueEnum;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Creates the content tables of one cache kind
pub trait ContentSchema {
    /// Create all tables, indexes and triggers in a fresh store
    fn create_content_tables(&self, conn: &Connection) -> RepoCacheResult<()>;
}

/// Kind of metadata cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SchemaKind {
    /// Package records and their dependencies
    Primary,
    /// Per-package file lists, directory-encoded
    Filelists,
    /// Changelogs
    Other,
}

impl SchemaKind {
    /// Default file prefix for this kind inside a cache directory
    pub fn file_prefix(&self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Filelists => "filelists",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_prefix())
    }
}

impl ContentSchema for SchemaKind {
    fn create_content_tables(&self, conn: &Connection) -> RepoCacheResult<()> {
        match self {
            Self::Primary => create_primary_tables(conn),
            Self::Filelists => create_filelist_tables(conn),
            Self::Other => create_other_tables(conn),
        }
    }
}

/// Run one DDL statement, naming the object on failure
fn create(conn: &Connection, what: &str, sql: &str) -> RepoCacheResult<()> {
    conn.execute_batch(sql)
        .map_err(|e| RepoCacheError::schema(what, e))
}

const PRIMARY_PACKAGES: &str = "CREATE TABLE packages (
    pkgKey INTEGER PRIMARY KEY,
    pkgId TEXT,
    name TEXT,
    arch TEXT,
    version TEXT,
    epoch TEXT,
    release TEXT,
    summary TEXT,
    description TEXT,
    url TEXT,
    time_file TEXT,
    time_build TEXT,
    rpm_license TEXT,
    rpm_vendor TEXT,
    rpm_group TEXT,
    rpm_buildhost TEXT,
    rpm_sourcerpm TEXT,
    rpm_header_start TEXT,
    rpm_header_end TEXT,
    rpm_packager TEXT,
    size_package TEXT,
    size_installed TEXT,
    size_archive TEXT,
    location_href TEXT,
    location_base TEXT,
    checksum_type TEXT,
    checksum_value TEXT)";

fn create_primary_tables(conn: &Connection) -> RepoCacheResult<()> {
    create(conn, "packages table", PRIMARY_PACKAGES)?;
    create(
        conn,
        "packagename index",
        "CREATE INDEX packagename ON packages (name)",
    )?;
    create(
        conn,
        "packageId index",
        "CREATE INDEX packageId ON packages (pkgId)",
    )?;
    create(
        conn,
        "files table",
        "CREATE TABLE files (name TEXT, type TEXT, pkgKey INTEGER)",
    )?;

    for dep in DependencyTable::all() {
        let sql = format!(
            "CREATE TABLE {} (name TEXT, flags TEXT, epoch TEXT, version TEXT, release TEXT, pkgKey INTEGER)",
            dep.table()
        );
        create(conn, &format!("{} table", dep.table()), &sql)?;
    }

    create(
        conn,
        "providesname index",
        "CREATE INDEX providesname ON provides (name)",
    )?;
    create(
        conn,
        "removals trigger",
        "CREATE TRIGGER removals AFTER DELETE ON packages
         BEGIN
           DELETE FROM files WHERE pkgKey = old.pkgKey;
           DELETE FROM requires WHERE pkgKey = old.pkgKey;
           DELETE FROM provides WHERE pkgKey = old.pkgKey;
           DELETE FROM conflicts WHERE pkgKey = old.pkgKey;
           DELETE FROM obsoletes WHERE pkgKey = old.pkgKey;
         END;",
    )
}

fn create_filelist_tables(conn: &Connection) -> RepoCacheResult<()> {
    create(
        conn,
        "packages table",
        "CREATE TABLE packages (pkgKey INTEGER PRIMARY KEY, pkgId TEXT)",
    )?;
    create(
        conn,
        "filelist table",
        "CREATE TABLE filelist (pkgKey INTEGER, dirname TEXT, filenames TEXT, filetypes TEXT)",
    )?;
    create(
        conn,
        "keyfile index",
        "CREATE INDEX keyfile ON filelist (pkgKey)",
    )?;
    create(conn, "pkgId index", "CREATE INDEX pkgId ON packages (pkgId)")?;
    create(
        conn,
        "remove_filelist trigger",
        "CREATE TRIGGER remove_filelist AFTER DELETE ON packages
         BEGIN
           DELETE FROM filelist WHERE pkgKey = old.pkgKey;
         END;",
    )
}

fn create_other_tables(conn: &Connection) -> RepoCacheResult<()> {
    create(
        conn,
        "packages table",
        "CREATE TABLE packages (pkgKey INTEGER PRIMARY KEY, pkgId TEXT)",
    )?;
    create(
        conn,
        "changelog table",
        "CREATE TABLE changelog (pkgKey INTEGER, author TEXT, date TEXT, changelog TEXT)",
    )?;
    create(
        conn,
        "keychange index",
        "CREATE INDEX keychange ON changelog (pkgKey)",
    )?;
    create(conn, "pkgId index", "CREATE INDEX pkgId ON packages (pkgId)")?;
    create(
        conn,
        "remove_changelogs trigger",
        "CREATE TRIGGER remove_changelogs AFTER DELETE ON packages
         BEGIN
           DELETE FROM changelog WHERE pkgKey = old.pkgKey;
         END;",
    )
}
