//! Cache build pipeline
//!
//! Reads package records from a JSON Lines file, reconciles the target cache
//! against the file's checksum and writes whatever content is missing. All
//! content rows go through one transaction; the identity row is written
//! after that transaction commits.

use crate::cache::{
    checksum_bytes, reconcile, remove_store_files, CacheIdentity, CacheState, Reconciled,
};
use crate::error::{RepoCacheError, RepoCacheResult};
use crate::package::{DependencyTable, Package};
use crate::schema::SchemaKind;
use crate::writer::{
    delete_package, read_package_ids, ChangelogWriter, DependencyWriter, FileWriter,
    FilelistWriter, PackageIdWriter, PackageWriter, WriteCount,
};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Package records loaded from an input file
#[derive(Debug, Default)]
pub struct PackageInput {
    pub packages: Vec<Package>,
    /// Lines that could not be used
    pub skipped: usize,
}

/// Parse JSON Lines package records.
///
/// Blank lines are ignored. Lines that fail to parse, lack a `pkgId`, or
/// repeat an earlier `pkgId` are logged and counted as skipped.
pub fn parse_packages<R: BufRead>(reader: R) -> RepoCacheResult<PackageInput> {
    let mut input = PackageInput::default();
    let mut seen = HashSet::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| RepoCacheError::io("reading package records", e))?;
        let line_no = idx + 1;
        let record = line.trim();
        if record.is_empty() {
            continue;
        }

        let reason = match serde_json::from_str::<Package>(record) {
            Ok(pkg) if pkg.pkg_id.is_empty() => "missing pkgId".to_string(),
            Ok(pkg) if !seen.insert(pkg.pkg_id.clone()) => {
                format!("duplicate pkgId {}", pkg.pkg_id)
            }
            Ok(pkg) => {
                input.packages.push(pkg);
                continue;
            }
            Err(e) => e.to_string(),
        };

        let err = RepoCacheError::InvalidRecord {
            line: line_no,
            reason,
        };
        warn!("{}, skipping", err);
        input.skipped += 1;
    }

    debug!(
        "Parsed {} package records ({} skipped)",
        input.packages.len(),
        input.skipped
    );
    Ok(input)
}

/// Read package records from a JSON Lines file
pub fn read_packages(path: &Path) -> RepoCacheResult<PackageInput> {
    let file = File::open(path)
        .map_err(|e| RepoCacheError::io(format!("opening {}", path.display()), e))?;
    parse_packages(BufReader::new(file))
}

/// An input file read once: its identity and the records parsed from the
/// same bytes
#[derive(Debug)]
pub struct SourceInput {
    pub identity: CacheIdentity,
    pub input: PackageInput,
}

/// Read `path` once, checksum the bytes and parse them.
///
/// The committed checksum therefore always describes the records written,
/// even if the file changes while a build runs.
pub fn load_source(path: &Path) -> RepoCacheResult<SourceInput> {
    let data =
        fs::read(path).map_err(|e| RepoCacheError::io(format!("reading {}", path.display()), e))?;
    let identity = CacheIdentity::current(checksum_bytes(&data));
    debug!("Loaded {} ({} bytes, {})", path.display(), data.len(), identity);

    Ok(SourceInput {
        identity,
        input: parse_packages(data.as_slice())?,
    })
}

/// What to build and where
#[derive(Debug, Clone)]
pub struct BuildRequest {
    pub kind: SchemaKind,
    /// JSON Lines metadata file; its checksum becomes the cache checksum
    pub input: PathBuf,
    pub db_path: PathBuf,
    /// Remove stored packages that no longer appear in the input
    pub prune: bool,
    /// Delete the cache file before reconciling
    pub force: bool,
}

/// Summary of one build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub path: PathBuf,
    /// State of the cache before the build
    pub state: CacheState,
    /// Packages inserted
    pub written: usize,
    /// Packages already present and left alone
    pub unchanged: usize,
    /// Packages pruned
    pub removed: usize,
    /// Rows (packages or their children) that failed to insert
    pub failed: usize,
    /// Input lines that were not usable
    pub skipped: usize,
}

impl BuildReport {
    fn new(path: &Path, state: CacheState) -> Self {
        Self {
            path: path.to_path_buf(),
            state,
            written: 0,
            unchanged: 0,
            removed: 0,
            failed: 0,
            skipped: 0,
        }
    }
}

/// Progress of the content write loop
#[derive(Debug, Clone, Copy)]
pub struct PackageProgress<'a> {
    /// 1-based position in the input
    pub position: usize,
    pub total: usize,
    pub package: &'a Package,
}

/// Build or refresh a cache. `on_package` is called once per input package
/// while content is written; it is never called for a fresh cache.
pub fn build_cache(
    request: &BuildRequest,
    mut on_package: impl FnMut(PackageProgress<'_>),
) -> RepoCacheResult<BuildReport> {
    let db_path = &request.db_path;
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| RepoCacheError::io(format!("creating {}", parent.display()), e))?;
    }

    if request.force {
        info!("Removing {} before rebuild", db_path.display());
        remove_store_files(db_path)?;
    }

    let SourceInput { identity, input } = load_source(&request.input)?;
    let mut session = match reconcile(db_path, &identity, &request.kind)? {
        Reconciled::Fresh => return Ok(BuildReport::new(db_path, CacheState::Fresh)),
        Reconciled::Writable(session) => session,
    };

    let mut report = BuildReport::new(db_path, session.state());
    report.skipped = input.skipped;

    let tx = session
        .connection_mut()
        .transaction()
        .map_err(|source| RepoCacheError::Transaction {
            action: "begin",
            source,
        })?;
    write_content(&tx, request, &input.packages, &mut report, &mut on_package)?;
    tx.commit().map_err(|source| RepoCacheError::Transaction {
        action: "commit",
        source,
    })?;

    session.commit(&identity)?;
    info!(
        "Built {} cache {}: {} written, {} unchanged, {} removed, {} failed",
        request.kind,
        db_path.display(),
        report.written,
        report.unchanged,
        report.removed,
        report.failed
    );
    Ok(report)
}

fn write_content(
    conn: &Connection,
    request: &BuildRequest,
    packages: &[Package],
    report: &mut BuildReport,
    on_package: &mut dyn FnMut(PackageProgress<'_>),
) -> RepoCacheResult<()> {
    let existing = if report.state.keeps_content() {
        read_package_ids(conn)?
    } else {
        HashMap::new()
    };

    if request.prune && !existing.is_empty() {
        let wanted: HashSet<&str> = packages.iter().map(|p| p.pkg_id.as_str()).collect();
        for (pkg_id, pkg_key) in &existing {
            if wanted.contains(pkg_id.as_str()) {
                continue;
            }
            debug!("Removing package {}", pkg_id);
            delete_package(conn, *pkg_key)?;
            report.removed += 1;
        }
    }

    let mut writers = ContentWriters::new(conn, request.kind)?;
    let total = packages.len();
    for (idx, package) in packages.iter().enumerate() {
        on_package(PackageProgress {
            position: idx + 1,
            total,
            package,
        });

        if existing.contains_key(&package.pkg_id) {
            report.unchanged += 1;
            continue;
        }

        match writers.write(package) {
            Ok(rows) => {
                report.written += 1;
                report.failed += rows.failed;
            }
            Err(e) if !e.is_fatal() => {
                warn!("{}, package {} skipped", e, package.pkg_id);
                report.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Prepared writers for one cache kind
enum ContentWriters<'conn> {
    Primary {
        packages: PackageWriter<'conn>,
        dependencies: Vec<DependencyWriter<'conn>>,
        files: FileWriter<'conn>,
    },
    Filelists {
        ids: PackageIdWriter<'conn>,
        filelist: FilelistWriter<'conn>,
    },
    Other {
        ids: PackageIdWriter<'conn>,
        changelog: ChangelogWriter<'conn>,
    },
}

impl<'conn> ContentWriters<'conn> {
    fn new(conn: &'conn Connection, kind: SchemaKind) -> RepoCacheResult<Self> {
        Ok(match kind {
            SchemaKind::Primary => Self::Primary {
                packages: PackageWriter::new(conn)?,
                dependencies: DependencyTable::all()
                    .iter()
                    .map(|table| DependencyWriter::new(conn, *table))
                    .collect::<RepoCacheResult<_>>()?,
                files: FileWriter::new(conn)?,
            },
            SchemaKind::Filelists => Self::Filelists {
                ids: PackageIdWriter::new(conn)?,
                filelist: FilelistWriter::new(conn)?,
            },
            SchemaKind::Other => Self::Other {
                ids: PackageIdWriter::new(conn)?,
                changelog: ChangelogWriter::new(conn)?,
            },
        })
    }

    /// Write a package and its child rows. An error means the package row
    /// itself was not written; child row failures are counted instead.
    fn write(&mut self, package: &Package) -> RepoCacheResult<WriteCount> {
        let mut rows = WriteCount::default();
        match self {
            Self::Primary {
                packages,
                dependencies,
                files,
            } => {
                let key = packages.write(package)?;
                for writer in dependencies.iter_mut() {
                    rows.merge(writer.write_all(key, package));
                }
                for file in &package.files {
                    rows.record(files.write(key, file));
                }
            }
            Self::Filelists { ids, filelist } => {
                let key = ids.write(package)?;
                rows.merge(filelist.write(key, &package.files));
            }
            Self::Other { ids, changelog } => {
                let key = ids.write(package)?;
                rows.merge(changelog.write(key, &package.changelogs));
            }
        }
        Ok(rows)
    }
}
