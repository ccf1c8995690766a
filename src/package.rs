//! Package records fed to the cache writers
//!
//! One `Package` per line of the ingestion input. Every scalar field is
//! optional text so that partially populated records still load.

use crate::error::RepoCacheError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a packaged file entry.
///
/// Deserialization goes through [`FromStr`], so a record with an unknown
/// kind fails with the `UnknownFileKind` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum FileKind {
    /// A directory owned by the package
    #[serde(rename = "dir")]
    Directory,
    /// A regular file
    #[serde(rename = "file")]
    Regular,
    /// A file the package owns but does not ship
    #[serde(rename = "ghost")]
    Ghost,
}

impl FileKind {
    /// Single-character code used in encoded file lists
    pub fn code(&self) -> char {
        match self {
            Self::Directory => 'd',
            Self::Regular => 'f',
            Self::Ghost => 'g',
        }
    }

    /// Name used in package metadata and the `files` table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Directory => "dir",
            Self::Regular => "file",
            Self::Ghost => "ghost",
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileKind {
    type Err = RepoCacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dir" => Ok(Self::Directory),
            "file" => Ok(Self::Regular),
            "ghost" => Ok(Self::Ghost),
            other => Err(RepoCacheError::UnknownFileKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for FileKind {
    type Error = RepoCacheError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// A single file listed by a package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Absolute path inside the package payload
    pub path: String,
    /// Entry kind (serialized as `type` in package metadata)
    #[serde(rename = "type", default = "default_kind")]
    pub kind: FileKind,
}

fn default_kind() -> FileKind {
    FileKind::Regular
}

impl FileEntry {
    pub fn new(path: impl Into<String>, kind: FileKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }
}

/// A versioned dependency (requires, provides, conflicts or obsoletes)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dependency {
    pub name: String,
    pub flags: Option<String>,
    pub epoch: Option<String>,
    pub version: Option<String>,
    pub release: Option<String>,
}

/// One changelog entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChangelogEntry {
    pub author: Option<String>,
    pub date: Option<String>,
    pub changelog: Option<String>,
}

/// Dependency tables in the primary cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencyTable {
    Requires,
    Provides,
    Conflicts,
    Obsoletes,
}

impl DependencyTable {
    /// Table name in the primary schema
    pub fn table(&self) -> &'static str {
        match self {
            Self::Requires => "requires",
            Self::Provides => "provides",
            Self::Conflicts => "conflicts",
            Self::Obsoletes => "obsoletes",
        }
    }

    /// All dependency tables in creation order
    pub fn all() -> &'static [Self] {
        &[
            Self::Requires,
            Self::Provides,
            Self::Conflicts,
            Self::Obsoletes,
        ]
    }
}

/// A package record as produced by the metadata parser
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    /// Package checksum, the stable identifier across cache rebuilds
    #[serde(rename = "pkgId")]
    pub pkg_id: String,
    pub name: Option<String>,
    pub arch: Option<String>,
    pub version: Option<String>,
    pub epoch: Option<String>,
    pub release: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub time_file: Option<String>,
    pub time_build: Option<String>,
    pub rpm_license: Option<String>,
    pub rpm_vendor: Option<String>,
    pub rpm_group: Option<String>,
    pub rpm_buildhost: Option<String>,
    pub rpm_sourcerpm: Option<String>,
    pub rpm_header_start: Option<String>,
    pub rpm_header_end: Option<String>,
    pub rpm_packager: Option<String>,
    pub size_package: Option<String>,
    pub size_installed: Option<String>,
    pub size_archive: Option<String>,
    pub location_href: Option<String>,
    pub location_base: Option<String>,
    pub checksum_type: Option<String>,
    pub checksum_value: Option<String>,

    pub files: Vec<FileEntry>,
    pub requires: Vec<Dependency>,
    pub provides: Vec<Dependency>,
    pub conflicts: Vec<Dependency>,
    pub obsoletes: Vec<Dependency>,
    pub changelogs: Vec<ChangelogEntry>,
}

impl Package {
    /// Dependencies stored in the given table
    pub fn dependencies(&self, table: DependencyTable) -> &[Dependency] {
        match table {
            DependencyTable::Requires => &self.requires,
            DependencyTable::Provides => &self.provides,
            DependencyTable::Conflicts => &self.conflicts,
            DependencyTable::Obsoletes => &self.obsoletes,
        }
    }
}
