//! SQLite handle for one cache artifact
//!
//! Wraps a `rusqlite::Connection` together with the file it belongs to.
//! The connection is closed when the store is dropped, on every exit path.

use crate::cache::identity::CacheIdentity;
use crate::error::{RepoCacheError, RepoCacheResult};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Identity table holding the `(dbversion, checksum)` row
pub const IDENTITY_TABLE: &str = "db_info";

/// Files SQLite may keep next to the main database file
const SIDECAR_SUFFIXES: &[&str] = &["-journal", "-wal", "-shm"];

/// An open cache store
#[derive(Debug)]
pub struct CacheStore {
    conn: Connection,
    path: PathBuf,
}

impl CacheStore {
    /// Open (creating if needed) the store at `path`.
    ///
    /// SQLite only notices a damaged container on first access, so the
    /// schema catalog is read once here; failing that counts as an open
    /// failure.
    pub fn open(path: &Path) -> RepoCacheResult<Self> {
        Self::open_with_flags(path, OpenFlags::default())
    }

    /// Open an existing store without write access
    pub fn open_read_only(path: &Path) -> RepoCacheResult<Self> {
        Self::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn open_with_flags(path: &Path, flags: OpenFlags) -> RepoCacheResult<Self> {
        let open_err = |source| RepoCacheError::Open {
            path: path.to_path_buf(),
            source,
        };

        let conn = Connection::open_with_flags(path, flags).map_err(open_err)?;
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(open_err)?;

        debug!("Opened cache store {}", path.display());
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Run one or more SQL statements
    pub fn exec(&self, sql: &str) -> rusqlite::Result<()> {
        self.conn.execute_batch(sql)
    }

    /// Read the stored identity record.
    ///
    /// `Ok(None)` means the table exists but holds no row. A missing table
    /// or a row of the wrong shape is an `IdentityRead` error.
    pub fn read_identity(&self) -> RepoCacheResult<Option<CacheIdentity>> {
        self.conn
            .query_row(
                &format!("SELECT dbversion, checksum FROM {} LIMIT 1", IDENTITY_TABLE),
                [],
                |row| {
                    Ok(CacheIdentity {
                        version: row.get(0)?,
                        checksum: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(RepoCacheError::IdentityRead)
    }

    /// Create the identity table in a fresh store
    pub fn create_identity_table(&self) -> RepoCacheResult<()> {
        self.exec(&format!(
            "CREATE TABLE {} (dbversion INTEGER, checksum TEXT)",
            IDENTITY_TABLE
        ))
        .map_err(|e| RepoCacheError::schema(format!("{} table", IDENTITY_TABLE), e))
    }

    /// Remove the identity record, leaving content tables untouched
    pub fn clear_identity(&self) -> RepoCacheResult<()> {
        self.exec(&format!("DELETE FROM {}", IDENTITY_TABLE))
            .map_err(|source| RepoCacheError::IdentityReset { source })
    }

    /// Replace the identity record in a single transaction
    pub fn insert_identity(&mut self, identity: &CacheIdentity) -> RepoCacheResult<()> {
        let commit_err = |source| RepoCacheError::Commit { source };

        let tx = self.conn.transaction().map_err(commit_err)?;
        tx.execute(&format!("DELETE FROM {}", IDENTITY_TABLE), [])
            .map_err(commit_err)?;
        tx.execute(
            &format!(
                "INSERT INTO {} (dbversion, checksum) VALUES (?1, ?2)",
                IDENTITY_TABLE
            ),
            params![identity.version, identity.checksum],
        )
        .map_err(commit_err)?;
        tx.commit().map_err(commit_err)
    }

    /// Relax durability for bulk population.
    ///
    /// Failure only costs throughput, so it is logged and ignored.
    pub fn enable_fast_write(&self) {
        if let Err(e) = self.conn.pragma_update(None, "synchronous", 0) {
            warn!("Could not enable fast-write mode on {}: {}", self.path.display(), e);
        }
    }

    /// Whether a table with this name exists
    pub fn table_exists(&self, name: &str) -> rusqlite::Result<bool> {
        self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![name],
            |row| row.get(0),
        )
    }
}

/// Delete a store file and any journal files SQLite left next to it.
///
/// A stale hot journal would otherwise be replayed into the new file.
pub fn remove_store_files(path: &Path) -> RepoCacheResult<()> {
    remove_if_exists(path)?;
    for suffix in SIDECAR_SUFFIXES {
        let mut sidecar = path.as_os_str().to_os_string();
        sidecar.push(suffix);
        remove_if_exists(Path::new(&sidecar))?;
    }
    Ok(())
}

fn remove_if_exists(path: &Path) -> RepoCacheResult<()> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(RepoCacheError::io(format!("removing {}", path.display()), e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("primary.sqlite");

        let store = CacheStore::open(&path).unwrap();

        assert!(path.exists());
        assert_eq!(store.path(), path);
    }

    #[test]
    fn open_rejects_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.sqlite");
        fs::write(&path, vec![0xABu8; 4096]).unwrap();

        let err = CacheStore::open(&path).unwrap_err();
        assert!(matches!(err, RepoCacheError::Open { .. }));
    }

    #[test]
    fn open_read_only_does_not_create() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.sqlite");

        assert!(CacheStore::open_read_only(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn identity_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut store = CacheStore::open(&dir.path().join("c.sqlite")).unwrap();
        store.create_identity_table().unwrap();

        assert_eq!(store.read_identity().unwrap(), None);

        let identity = CacheIdentity::new(10, "deadbeef");
        store.insert_identity(&identity).unwrap();
        assert_eq!(store.read_identity().unwrap(), Some(identity.clone()));

        // Insert replaces rather than accumulates
        let next = CacheIdentity::new(10, "cafef00d");
        store.insert_identity(&next).unwrap();
        let rows: i64 = store
            .connection()
            .query_row("SELECT count(*) FROM db_info", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
        assert_eq!(store.read_identity().unwrap(), Some(next));

        store.clear_identity().unwrap();
        assert_eq!(store.read_identity().unwrap(), None);
    }

    #[test]
    fn read_identity_without_table_is_read_error() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(&dir.path().join("c.sqlite")).unwrap();

        let err = store.read_identity().unwrap_err();
        assert!(matches!(err, RepoCacheError::IdentityRead(_)));
    }

    #[test]
    fn read_identity_with_text_version_is_read_error() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(&dir.path().join("c.sqlite")).unwrap();
        store
            .exec(
                "CREATE TABLE db_info (dbversion TEXT, checksum TEXT);
                 INSERT INTO db_info VALUES ('ten', 'abc');",
            )
            .unwrap();

        assert!(store.read_identity().is_err());
    }

    #[test]
    fn table_exists_reports_tables() {
        let dir = TempDir::new().unwrap();
        let store = CacheStore::open(&dir.path().join("c.sqlite")).unwrap();
        store.create_identity_table().unwrap();

        assert!(store.table_exists(IDENTITY_TABLE).unwrap());
        assert!(!store.table_exists("packages").unwrap());
    }

    #[test]
    fn remove_store_files_cleans_sidecars() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.sqlite");
        let journal = dir.path().join("other.sqlite-journal");
        fs::write(&path, b"x").unwrap();
        fs::write(&journal, b"y").unwrap();

        remove_store_files(&path).unwrap();

        assert!(!path.exists());
        assert!(!journal.exists());
        // Missing files are fine
        remove_store_files(&path).unwrap();
    }
}
