//! Writers for the primary cache

use crate::error::{RepoCacheError, RepoCacheResult};
use crate::package::{Dependency, DependencyTable, FileEntry, Package};
use crate::writer::WriteCount;
use rusqlite::{params, Connection, Statement};

const INSERT_PACKAGE: &str = "INSERT INTO packages (
    pkgId, name, arch, version, epoch, release, summary, description,
    url, time_file, time_build, rpm_license, rpm_vendor, rpm_group,
    rpm_buildhost, rpm_sourcerpm, rpm_header_start, rpm_header_end,
    rpm_packager, size_package, size_installed, size_archive,
    location_href, location_base, checksum_type, checksum_value)
  VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
    ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26)";

/// Inserts full package rows
pub struct PackageWriter<'conn> {
    stmt: Statement<'conn>,
}

impl<'conn> PackageWriter<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoCacheResult<Self> {
        let stmt = conn
            .prepare(INSERT_PACKAGE)
            .map_err(|e| RepoCacheError::prepare("packages", e))?;
        Ok(Self { stmt })
    }

    /// Insert a package, returning its new pkgKey
    pub fn write(&mut self, p: &Package) -> RepoCacheResult<i64> {
        self.stmt
            .insert(params![
                p.pkg_id,
                p.name,
                p.arch,
                p.version,
                p.epoch,
                p.release,
                p.summary,
                p.description,
                p.url,
                p.time_file,
                p.time_build,
                p.rpm_license,
                p.rpm_vendor,
                p.rpm_group,
                p.rpm_buildhost,
                p.rpm_sourcerpm,
                p.rpm_header_start,
                p.rpm_header_end,
                p.rpm_packager,
                p.size_package,
                p.size_installed,
                p.size_archive,
                p.location_href,
                p.location_base,
                p.checksum_type,
                p.checksum_value,
            ])
            .map_err(|e| RepoCacheError::write("package", e))
    }
}

/// Inserts rows into one dependency table
pub struct DependencyWriter<'conn> {
    table: DependencyTable,
    stmt: Statement<'conn>,
}

impl<'conn> DependencyWriter<'conn> {
    pub fn new(conn: &'conn Connection, table: DependencyTable) -> RepoCacheResult<Self> {
        let sql = format!(
            "INSERT INTO {} (name, flags, epoch, version, release, pkgKey) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            table.table()
        );
        let stmt = conn
            .prepare(&sql)
            .map_err(|e| RepoCacheError::prepare(format!("{} dependency", table.table()), e))?;
        Ok(Self { table, stmt })
    }

    pub fn write(&mut self, pkg_key: i64, dep: &Dependency) -> RepoCacheResult<()> {
        self.stmt
            .execute(params![
                dep.name,
                dep.flags,
                dep.epoch,
                dep.version,
                dep.release,
                pkg_key
            ])
            .map(|_| ())
            .map_err(|e| RepoCacheError::write(format!("{} dependency", self.table.table()), e))
    }

    /// Write every dependency of `package` that belongs in this table
    pub fn write_all(&mut self, pkg_key: i64, package: &Package) -> WriteCount {
        let mut count = WriteCount::default();
        for dep in package.dependencies(self.table) {
            count.record(self.write(pkg_key, dep));
        }
        count
    }
}

/// Inserts uncompressed `(name, type, pkgKey)` rows into the primary `files` table
pub struct FileWriter<'conn> {
    stmt: Statement<'conn>,
}

impl<'conn> FileWriter<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoCacheResult<Self> {
        let stmt = conn
            .prepare("INSERT INTO files (name, type, pkgKey) VALUES (?1, ?2, ?3)")
            .map_err(|e| RepoCacheError::prepare("file", e))?;
        Ok(Self { stmt })
    }

    pub fn write(&mut self, pkg_key: i64, file: &FileEntry) -> RepoCacheResult<()> {
        self.stmt
            .execute(params![file.path, file.kind.as_str(), pkg_key])
            .map(|_| ())
            .map_err(|e| RepoCacheError::write("package file", e))
    }
}
