//! Writer for the filelists cache

use crate::encode::{encode_files, DirectoryGroup};
use crate::error::{RepoCacheError, RepoCacheResult};
use crate::package::FileEntry;
use crate::writer::WriteCount;
use rusqlite::{params, Connection, Statement};
use std::collections::BTreeMap;

/// Persists directory-encoded file lists, one row per directory
pub struct FilelistWriter<'conn> {
    stmt: Statement<'conn>,
}

impl<'conn> FilelistWriter<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoCacheResult<Self> {
        let stmt = conn
            .prepare(
                "INSERT INTO filelist (pkgKey, dirname, filenames, filetypes) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| RepoCacheError::prepare("filelist", e))?;
        Ok(Self { stmt })
    }

    /// Write one `(pkgKey, dirname, filenames, filetypes)` row
    pub fn write_group(
        &mut self,
        pkg_key: i64,
        dirname: &str,
        group: &DirectoryGroup,
    ) -> RepoCacheResult<()> {
        self.stmt
            .execute(params![pkg_key, dirname, group.names(), group.kinds()])
            .map(|_| ())
            .map_err(|e| RepoCacheError::write("file", e))
    }

    /// Write already encoded groups; failed rows are logged and counted
    pub fn write_groups(
        &mut self,
        pkg_key: i64,
        groups: &BTreeMap<String, DirectoryGroup>,
    ) -> WriteCount {
        let mut count = WriteCount::default();
        for (dirname, group) in groups {
            count.record(self.write_group(pkg_key, dirname, group));
        }
        count
    }

    /// Encode a package's file list and write it
    pub fn write(&mut self, pkg_key: i64, files: &[FileEntry]) -> WriteCount {
        self.write_groups(pkg_key, &encode_files(files))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::FileKind;
    use crate::schema::{ContentSchema, SchemaKind};

    #[test]
    fn writes_one_row_per_directory() {
        let conn = Connection::open_in_memory().unwrap();
        SchemaKind::Filelists.create_content_tables(&conn).unwrap();

        let files = vec![
            FileEntry::new("/usr/bin/bash", FileKind::Regular),
            FileEntry::new("/usr/bin/sh", FileKind::Regular),
            FileEntry::new("/etc/skel", FileKind::Directory),
            FileEntry::new("/var/log/bash.log", FileKind::Ghost),
        ];
        let count = FilelistWriter::new(&conn).unwrap().write(7, &files);
        assert_eq!(count, WriteCount { written: 3, failed: 0 });

        let mut stmt = conn
            .prepare("SELECT pkgKey, dirname, filenames, filetypes FROM filelist ORDER BY dirname")
            .unwrap();
        let rows: Vec<(i64, String, String, String)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(
            rows,
            vec![
                (7, "/etc".to_string(), "skel".to_string(), "d".to_string()),
                (7, "/usr/bin".to_string(), "bash/sh".to_string(), "ff".to_string()),
                (7, "/var/log".to_string(), "bash.log".to_string(), "g".to_string()),
            ]
        );
    }

    #[test]
    fn empty_file_list_writes_nothing() {
        let conn = Connection::open_in_memory().unwrap();
        SchemaKind::Filelists.create_content_tables(&conn).unwrap();

        let count = FilelistWriter::new(&conn).unwrap().write(1, &[]);
        assert_eq!(count, WriteCount::default());
    }

    #[test]
    fn failed_rows_do_not_stop_the_rest() {
        let conn = Connection::open_in_memory().unwrap();
        SchemaKind::Filelists.create_content_tables(&conn).unwrap();
        conn.execute_batch(
            "CREATE TRIGGER reject_etc BEFORE INSERT ON filelist
             WHEN new.dirname = '/etc'
             BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
        )
        .unwrap();

        let files = vec![
            FileEntry::new("/etc/a", FileKind::Regular),
            FileEntry::new("/usr/b", FileKind::Regular),
        ];
        let count = FilelistWriter::new(&conn).unwrap().write(1, &files);

        assert_eq!(count, WriteCount { written: 1, failed: 1 });
    }
}
