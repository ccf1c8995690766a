//! Compact file-list encoding
//!
//! A package's file list is grouped by containing directory. Each group is
//! stored as one row: the directory, the basenames joined by `/`, and one
//! kind code per basename (`d`, `f` or `g`). Directory names are stored once
//! per group instead of once per file.

use crate::package::{FileEntry, FileKind};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Separator placed between basenames inside a group
pub const NAME_SEPARATOR: char = '/';

/// Initial capacity for a group's name buffer
const GROUP_NAMES_CAPACITY: usize = 2048;

/// Initial capacity for a group's kind-code buffer
const GROUP_KINDS_CAPACITY: usize = 60;

/// Basenames and kind codes for all entries sharing one directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryGroup {
    names: String,
    kinds: String,
}

impl DirectoryGroup {
    fn new() -> Self {
        Self {
            names: String::with_capacity(GROUP_NAMES_CAPACITY),
            kinds: String::with_capacity(GROUP_KINDS_CAPACITY),
        }
    }

    /// Append a basename and its kind code
    pub fn push(&mut self, name: &str, kind: FileKind) {
        if !self.kinds.is_empty() {
            self.names.push(NAME_SEPARATOR);
        }
        self.names.push_str(name);
        self.kinds.push(kind.code());
    }

    /// Basenames joined by `/`
    pub fn names(&self) -> &str {
        &self.names
    }

    /// One kind code per basename, in the same order
    pub fn kinds(&self) -> &str {
        &self.kinds
    }

    /// Number of entries in the group
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Split a path into (dirname, basename).
///
/// Trailing slashes are ignored, so a directory entry lands in its parent.
/// A path without any separator has dirname `.`; a top-level entry has
/// dirname `/`.
pub fn split_path(path: &str) -> (&str, &str) {
    let trimmed = path.trim_end_matches(NAME_SEPARATOR);
    if trimmed.is_empty() {
        return if path.is_empty() { (".", ".") } else { ("/", "/") };
    }

    match trimmed.rfind(NAME_SEPARATOR) {
        None => (".", trimmed),
        Some(idx) => {
            let base = &trimmed[idx + 1..];
            let dir = trimmed[..idx].trim_end_matches(NAME_SEPARATOR);
            if dir.is_empty() {
                ("/", base)
            } else {
                (dir, base)
            }
        }
    }
}

/// Group a package's file list by directory.
///
/// Entries are consumed once, in order; each group keeps its basenames in
/// input order. The input is not modified. Entries naming the root itself
/// (`/`, or an empty path) have no basename and are left out, so a group's
/// names always split into exactly as many parts as it has kind codes.
pub fn encode_files(entries: &[FileEntry]) -> BTreeMap<String, DirectoryGroup> {
    let mut groups: BTreeMap<String, DirectoryGroup> = BTreeMap::new();

    for entry in entries {
        if entry.path.trim_end_matches(NAME_SEPARATOR).is_empty() {
            debug!("Skipping file entry without a basename: {:?}", entry.path);
            continue;
        }

        let (dir, base) = split_path(&entry.path);
        groups
            .entry(dir.to_string())
            .or_insert_with(DirectoryGroup::new)
            .push(base, entry.kind);
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str) -> FileEntry {
        FileEntry::new(path, FileKind::Regular)
    }

    #[test]
    fn split_path_cases() {
        assert_eq!(split_path("/a/b/c.txt"), ("/a/b", "c.txt"));
        assert_eq!(split_path("/etc"), ("/", "etc"));
        assert_eq!(split_path("/usr/share/doc/"), ("/usr/share", "doc"));
        assert_eq!(split_path("relative"), (".", "relative"));
        assert_eq!(split_path("a//b"), ("a", "b"));
        assert_eq!(split_path("/"), ("/", "/"));
        assert_eq!(split_path(""), (".", "."));
    }

    #[test]
    fn empty_input_gives_empty_mapping() {
        assert!(encode_files(&[]).is_empty());
    }

    #[test]
    fn single_file() {
        let groups = encode_files(&[file("/a/b/c.txt")]);

        assert_eq!(groups.len(), 1);
        let group = &groups["/a/b"];
        assert_eq!(group.names(), "c.txt");
        assert_eq!(group.kinds(), "f");
    }

    #[test]
    fn same_directory_joins_names_in_order() {
        let entries = [
            file("/a/x"),
            FileEntry::new("/a/y", FileKind::Directory),
        ];
        let groups = encode_files(&entries);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups["/a"].names(), "x/y");
        assert_eq!(groups["/a"].kinds(), "fd");
    }

    #[test]
    fn directory_entry_grouped_under_parent() {
        let entries = [
            FileEntry::new("/usr/lib/foo", FileKind::Directory),
            file("/usr/lib/foo/libfoo.so"),
            FileEntry::new("/usr/lib/foo/cache", FileKind::Ghost),
        ];
        let groups = encode_files(&entries);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups["/usr/lib"].names(), "foo");
        assert_eq!(groups["/usr/lib"].kinds(), "d");
        assert_eq!(groups["/usr/lib/foo"].names(), "libfoo.so/cache");
        assert_eq!(groups["/usr/lib/foo"].kinds(), "fg");
        assert!(!groups.contains_key("/usr/lib/foo/libfoo.so"));
    }

    #[test]
    fn interleaved_directories_keep_per_group_order() {
        let entries = [
            file("/bin/a"),
            file("/etc/a.conf"),
            file("/bin/b"),
            FileEntry::new("/etc/b.d", FileKind::Directory),
            file("/bin/c"),
        ];
        let groups = encode_files(&entries);

        assert_eq!(groups["/bin"].names(), "a/b/c");
        assert_eq!(groups["/bin"].kinds(), "fff");
        assert_eq!(groups["/bin"].len(), 3);
        assert_eq!(groups["/etc"].names(), "a.conf/b.d");
        assert_eq!(groups["/etc"].kinds(), "fd");
    }

    #[test]
    fn kinds_match_name_count() {
        let entries = [
            file("/opt/x/1"),
            FileEntry::new("/opt/x/2", FileKind::Ghost),
            FileEntry::new("/opt/x/3", FileKind::Directory),
        ];
        let groups = encode_files(&entries);
        let group = &groups["/opt/x"];

        assert_eq!(group.names().split(NAME_SEPARATOR).count(), group.kinds().len());
    }

    #[test]
    fn root_entry_is_left_out() {
        let entries = [
            FileEntry::new("/", FileKind::Directory),
            FileEntry::new("/etc", FileKind::Directory),
            file(""),
        ];
        let groups = encode_files(&entries);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups["/"].names(), "etc");
        assert_eq!(groups["/"].kinds(), "d");
        assert!(!groups.contains_key("."));
    }

    #[test]
    fn encoding_is_deterministic() {
        let entries = [file("/a/1"), file("/b/2"), file("/a/3")];
        let first = encode_files(&entries);
        let second = encode_files(&entries);

        assert_eq!(first, second);
        assert_eq!(entries[0].path, "/a/1");
    }
}
