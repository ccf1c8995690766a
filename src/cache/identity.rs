//! Cache identity: schema version plus source checksum
//!
//! The checksum is the SHA-256 of the metadata file a cache was built from.
//! Same source file + same schema version = reusable cache.

use crate::error::{RepoCacheError, RepoCacheResult};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Schema version of the cache files written by this crate.
/// Increment whenever a content table changes shape.
pub const CACHE_DBVERSION: i64 = 10;

/// Suffix appended to a cache prefix to form the store file name
pub const DB_SUFFIX: &str = ".sqlite";

/// Expected state of a cache artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheIdentity {
    /// Schema version
    pub version: i64,
    /// Hex content hash of the source metadata file
    pub checksum: String,
}

impl CacheIdentity {
    pub fn new(version: i64, checksum: impl Into<String>) -> Self {
        Self {
            version,
            checksum: checksum.into(),
        }
    }

    /// Identity at the current schema version
    pub fn current(checksum: impl Into<String>) -> Self {
        Self::new(CACHE_DBVERSION, checksum)
    }

    /// Identity for a cache built from `source` at the current schema version
    pub fn for_source(source: &Path) -> RepoCacheResult<Self> {
        Ok(Self::current(checksum_file(source)?))
    }
}

impl fmt::Display for CacheIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}:{}", self.version, self.checksum)
    }
}

/// Hash a file's contents with SHA-256, returning lowercase hex
pub fn checksum_file(path: &Path) -> RepoCacheResult<String> {
    let file = File::open(path)
        .map_err(|e| RepoCacheError::io(format!("opening {}", path.display()), e))?;
    let mut reader = BufReader::new(file);

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 64 * 1024];
    loop {
        let n = reader
            .read(&mut buf)
            .map_err(|e| RepoCacheError::io(format!("reading {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let checksum = hex::encode(hasher.finalize());
    debug!("Checksum of {}: {}", path.display(), checksum);
    Ok(checksum)
}

/// Hash an in-memory buffer with SHA-256, returning lowercase hex
pub fn checksum_bytes(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Store file name for a cache prefix (`<prefix>.sqlite`)
pub fn db_filename(prefix: impl AsRef<Path>) -> PathBuf {
    let mut name = prefix.as_ref().as_os_str().to_os_string();
    name.push(DB_SUFFIX);
    PathBuf::from(name)
}
