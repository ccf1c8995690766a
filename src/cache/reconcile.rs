//! Cache freshness reconciliation
//!
//! Decides whether an existing cache file can be reused unchanged, reused
//! after dropping its identity record, or must be rebuilt from scratch.

use crate::cache::identity::CacheIdentity;
use crate::cache::store::{remove_store_files, CacheStore};
use crate::error::{RepoCacheError, RepoCacheResult};
use crate::schema::ContentSchema;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// State of a cache file relative to a target identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// No file exists
    Absent,
    /// Version and checksum match, reusable as-is
    Fresh,
    /// Version matches but checksum differs; content tables are kept
    StaleChecksum,
    /// Version differs or the identity record is unreadable; rebuilt
    StaleVersion,
}

impl CacheState {
    /// Whether the caller has to write content for this state
    pub fn needs_write(&self) -> bool {
        !matches!(self, Self::Fresh)
    }

    /// Whether the store keeps its previous content tables
    pub fn keeps_content(&self) -> bool {
        matches!(self, Self::StaleChecksum)
    }
}

impl fmt::Display for CacheState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Fresh => write!(f, "fresh"),
            Self::StaleChecksum => write!(f, "stale-checksum"),
            Self::StaleVersion => write!(f, "stale-version"),
        }
    }
}

/// Outcome of [`reconcile`]
#[derive(Debug)]
pub enum Reconciled {
    /// The cache is up to date; nothing may be written
    Fresh,
    /// The cache needs content; write it, then call [`CacheSession::commit`]
    Writable(CacheSession),
}

/// Exclusive write access to a cache file that is not yet fresh.
///
/// The file stays unidentified (no identity row) until [`commit`] runs, so
/// a crash at any point before that makes the next reconciliation rebuild.
///
/// [`commit`]: CacheSession::commit
#[derive(Debug)]
pub struct CacheSession {
    state: CacheState,
    store: CacheStore,
}

impl CacheSession {
    /// State the file was in before this session
    pub fn state(&self) -> CacheState {
        self.state
    }

    pub fn path(&self) -> &Path {
        self.store.path()
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn connection(&self) -> &Connection {
        self.store.connection()
    }

    /// Mutable connection, for opening the content-write transaction
    pub fn connection_mut(&mut self) -> &mut Connection {
        self.store.connection_mut()
    }

    /// Record `identity` as the file's identity and close it.
    ///
    /// Must run only after every content write succeeded. Consuming the
    /// session makes a second commit impossible.
    pub fn commit(mut self, identity: &CacheIdentity) -> RepoCacheResult<PathBuf> {
        self.store.insert_identity(identity)?;
        info!(
            "Cache {} committed at {}",
            self.store.path().display(),
            identity
        );
        Ok(self.store.path().to_path_buf())
    }
}

/// Compare a store's identity record with the target
fn classify(store: &CacheStore, target: &CacheIdentity) -> CacheState {
    match store.read_identity() {
        Ok(Some(stored)) if stored.version != target.version => {
            info!(
                "Cache file is version {}, we need {}, will regenerate",
                stored.version, target.version
            );
            CacheState::StaleVersion
        }
        Ok(Some(stored)) if stored.checksum != target.checksum => {
            info!("Cache {} needs updating, reading in metadata", store.path().display());
            CacheState::StaleChecksum
        }
        Ok(Some(_)) => CacheState::Fresh,
        Ok(None) => {
            info!(
                "Cache {} has no identity record, will regenerate",
                store.path().display()
            );
            CacheState::StaleVersion
        }
        Err(e) => {
            info!("{}, will regenerate {}", e, store.path().display());
            CacheState::StaleVersion
        }
    }
}

/// Prepare the cache file at `path` for `target`.
///
/// - missing file: created with empty content tables (`Absent`)
/// - matching identity: [`Reconciled::Fresh`], the file is not touched
/// - checksum mismatch: identity row erased, content kept (`StaleChecksum`)
/// - version mismatch, missing or unreadable identity: file deleted and
///   recreated (`StaleVersion`)
///
/// A file that SQLite cannot open is deleted and opened once more; a second
/// failure is returned as an `Open` error. Schema creation failures are
/// fatal. Fast-write mode is enabled on every writable session.
pub fn reconcile(
    path: &Path,
    target: &CacheIdentity,
    schema: &dyn ContentSchema,
) -> RepoCacheResult<Reconciled> {
    let existed = path.exists();
    debug!(
        "Reconciling {} (exists: {}) against {}",
        path.display(),
        existed,
        target
    );

    let opened = match CacheStore::open(path) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!("{}; deleting and retrying", e);
            if let Err(e) = remove_store_files(path) {
                warn!("Could not delete damaged cache file: {}", e);
            }
            None
        }
    };

    let (state, store) = match opened {
        Some(store) if existed => match classify(&store, target) {
            CacheState::Fresh => {
                debug!("Cache {} is up to date", path.display());
                return Ok(Reconciled::Fresh);
            }
            CacheState::StaleChecksum => {
                store.clear_identity()?;
                store.enable_fast_write();
                return Ok(Reconciled::Writable(CacheSession {
                    state: CacheState::StaleChecksum,
                    store,
                }));
            }
            state => {
                drop(store);
                (state, recreate(path)?)
            }
        },
        Some(store) => (CacheState::Absent, store),
        None => {
            let state = if existed {
                CacheState::StaleVersion
            } else {
                CacheState::Absent
            };
            (state, CacheStore::open(path)?)
        }
    };

    store.create_identity_table()?;
    schema.create_content_tables(store.connection())?;
    store.enable_fast_write();

    info!("Creating cache {} ({})", path.display(), state);
    Ok(Reconciled::Writable(CacheSession { state, store }))
}

/// Delete a stale store and open an empty one in its place.
///
/// Both halves are open failures from the caller's point of view.
fn recreate(path: &Path) -> RepoCacheResult<CacheStore> {
    remove_store_files(path).map_err(|e| match e {
        RepoCacheError::Io { source, .. } => RepoCacheError::Recreate {
            path: path.to_path_buf(),
            source,
        },
        other => other,
    })?;
    CacheStore::open(path)
}

/// Classify the cache file at `path` without modifying it
pub fn probe(path: &Path, target: &CacheIdentity) -> RepoCacheResult<CacheState> {
    if !path.exists() {
        return Ok(CacheState::Absent);
    }

    match CacheStore::open_read_only(path) {
        Ok(store) => Ok(classify(&store, target)),
        Err(e) => {
            debug!("Probe could not open {}: {}", path.display(), e);
            Ok(CacheState::StaleVersion)
        }
    }
}
