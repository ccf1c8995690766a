//! Writer for the other (changelog) cache

use crate::error::{RepoCacheError, RepoCacheResult};
use crate::package::ChangelogEntry;
use crate::writer::WriteCount;
use rusqlite::{params, Connection, Statement};

pub struct ChangelogWriter<'conn> {
    stmt: Statement<'conn>,
}

impl<'conn> ChangelogWriter<'conn> {
    pub fn new(conn: &'conn Connection) -> RepoCacheResult<Self> {
        let stmt = conn
            .prepare("INSERT INTO changelog (pkgKey, author, date, changelog) VALUES (?1, ?2, ?3, ?4)")
            .map_err(|e| RepoCacheError::prepare("changelog", e))?;
        Ok(Self { stmt })
    }

    pub fn write_entry(&mut self, pkg_key: i64, entry: &ChangelogEntry) -> RepoCacheResult<()> {
        self.stmt
            .execute(params![pkg_key, entry.author, entry.date, entry.changelog])
            .map(|_| ())
            .map_err(|e| RepoCacheError::write("changelog", e))
    }

    pub fn write(&mut self, pkg_key: i64, entries: &[ChangelogEntry]) -> WriteCount {
        let mut count = WriteCount::default();
        for entry in entries {
            count.record(self.write_entry(pkg_key, entry));
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ContentSchema, SchemaKind};

    #[test]
    fn changelog_rows_keep_order() {
        let conn = Connection::open_in_memory().unwrap();
        SchemaKind::Other.create_content_tables(&conn).unwrap();

        let entries = vec![
            ChangelogEntry {
                author: Some("Jane <jane@example.org> - 5.2-1".to_string()),
                date: Some("1700000000".to_string()),
                changelog: Some("- Update to 5.2".to_string()),
            },
            ChangelogEntry {
                author: Some("Joe <joe@example.org> - 5.1-3".to_string()),
                date: Some("1690000000".to_string()),
                changelog: None,
            },
        ];
        let count = ChangelogWriter::new(&conn).unwrap().write(3, &entries);
        assert_eq!(count.written, 2);

        let mut stmt = conn
            .prepare("SELECT date, changelog FROM changelog WHERE pkgKey = 3 ORDER BY rowid")
            .unwrap();
        let rows: Vec<(String, Option<String>)> = stmt
            .query_map([], |r| Ok((r.get(0)?, r.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert_eq!(rows[0], ("1700000000".to_string(), Some("- Update to 5.2".to_string())));
        assert_eq!(rows[1].1, None);
    }
}
