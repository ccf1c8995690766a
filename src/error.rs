//! Error types for repocache
//!
//! All modules use `RepoCacheResult<T>` as their return type.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for repocache operations
pub type RepoCacheResult<T> = Result<T, RepoCacheError>;

/// Coarse error category, used by callers that only care about the class of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The store file could not be opened or recreated
    Open,
    /// Table, index or trigger creation failed
    Schema,
    /// The identity record (or another stored row set) could not be read
    Read,
    /// A row or statement write failed
    Write,
    /// Configuration could not be loaded or saved
    Config,
    /// Filesystem error outside the store itself
    Io,
    /// Anything else
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Schema => "schema",
            Self::Read => "read",
            Self::Write => "write",
            Self::Config => "config",
            Self::Io => "io",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// All errors that can occur in repocache
#[derive(Error, Debug)]
pub enum RepoCacheError {
    // Store errors
    #[error("Can not open SQL database {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Can not delete stale SQL database {path}: {source}")]
    Recreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Can not create {what}: {source}")]
    Schema {
        what: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Can not read cache identity: {0}")]
    IdentityRead(#[source] rusqlite::Error),

    #[error("Can not reset db_info table: {source}")]
    IdentityReset {
        #[source]
        source: rusqlite::Error,
    },

    #[error("Can not prepare {what} insertion: {source}")]
    Prepare {
        what: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Error adding {what} to SQL: {source}")]
    Write {
        what: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Can not update db_info table: {source}")]
    Commit {
        #[source]
        source: rusqlite::Error,
    },

    #[error("Can not {action} write transaction: {source}")]
    Transaction {
        action: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Error reading package ids: {source}")]
    PackageRead {
        #[source]
        source: rusqlite::Error,
    },

    // Input errors
    #[error("Unknown file kind: {0:?} (expected dir, file or ghost)")]
    UnknownFileKind(String),

    #[error("Invalid package record at line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl RepoCacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a schema error naming the object that failed
    pub fn schema(what: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Schema {
            what: what.into(),
            source,
        }
    }

    /// Create a row write error
    pub fn write(what: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Write {
            what: what.into(),
            source,
        }
    }

    /// Create a statement preparation error
    pub fn prepare(what: impl Into<String>, source: rusqlite::Error) -> Self {
        Self::Prepare {
            what: what.into(),
            source,
        }
    }

    /// Category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Open { .. } | Self::Recreate { .. } => ErrorKind::Open,
            Self::Schema { .. } => ErrorKind::Schema,
            Self::IdentityRead(_) | Self::PackageRead { .. } => ErrorKind::Read,
            Self::IdentityReset { .. }
            | Self::Prepare { .. }
            | Self::Write { .. }
            | Self::Commit { .. }
            | Self::Transaction { .. } => ErrorKind::Write,
            Self::ConfigInvalid { .. }
            | Self::ConfigDirCreate { .. }
            | Self::TomlParse(_)
            | Self::TomlSerialize(_) => ErrorKind::Config,
            Self::Io { .. } => ErrorKind::Io,
            Self::UnknownFileKind(_) | Self::InvalidRecord { .. } | Self::Json(_) => {
                ErrorKind::Other
            }
        }
    }

    /// Whether this error must abort the current cache build.
    ///
    /// Identity read failures turn into a rebuild and single-row write
    /// failures are reported and skipped; everything else is fatal.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::IdentityRead(_) | Self::Write { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Open { .. } | Self::Recreate { .. } => {
                Some("Check that the cache directory exists and is writable")
            }
            Self::ConfigInvalid { .. } => Some("Run: repocache config init --force"),
            Self::UnknownFileKind(_) => Some("File entries must use kind dir, file or ghost"),
            Self::InvalidRecord { .. } => Some("Input must contain one JSON package record per line"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_err() -> rusqlite::Error {
        rusqlite::Error::InvalidQuery
    }

    #[test]
    fn error_display() {
        let err = RepoCacheError::schema("filelist table", sqlite_err());
        assert!(err.to_string().contains("Can not create filelist table"));
    }

    #[test]
    fn error_kind_mapping() {
        let open = RepoCacheError::Open {
            path: PathBuf::from("/tmp/x.sqlite"),
            source: sqlite_err(),
        };
        assert_eq!(open.kind(), ErrorKind::Open);
        let recreate = RepoCacheError::Recreate {
            path: PathBuf::from("/tmp/x.sqlite"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert_eq!(recreate.kind(), ErrorKind::Open);
        assert!(recreate.is_fatal());
        assert_eq!(RepoCacheError::IdentityRead(sqlite_err()).kind(), ErrorKind::Read);
        assert_eq!(RepoCacheError::write("file", sqlite_err()).kind(), ErrorKind::Write);
        assert_eq!(
            RepoCacheError::UnknownFileKind("socket".into()).kind(),
            ErrorKind::Other
        );
    }

    #[test]
    fn error_fatality() {
        assert!(!RepoCacheError::IdentityRead(sqlite_err()).is_fatal());
        assert!(!RepoCacheError::write("changelog", sqlite_err()).is_fatal());
        assert!(RepoCacheError::schema("packages table", sqlite_err()).is_fatal());
        assert!(RepoCacheError::Commit { source: sqlite_err() }.is_fatal());
    }

    #[test]
    fn error_hint() {
        let err = RepoCacheError::UnknownFileKind("fifo".into());
        assert_eq!(
            err.hint(),
            Some("File entries must use kind dir, file or ghost")
        );
        assert_eq!(RepoCacheError::IdentityRead(sqlite_err()).hint(), None);
    }
}
