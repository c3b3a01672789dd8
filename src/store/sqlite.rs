//! SQLite table store
//!
//! A single SQLite file used as a flat table store: whole-table replace on
//! write, full scan on read. Each replace runs in its own transaction, so a
//! table is either fully rewritten or left untouched.

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};

use super::error::{StoreError, StoreResult};
use super::frame::{Cell, Frame};

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Cell::Integer(i) => ToSqlOutput::from(*i),
            Cell::Real(f) => ToSqlOutput::from(*f),
            Cell::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

impl FromSql for Cell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Null => Ok(Cell::Null),
            ValueRef::Integer(i) => Ok(Cell::Integer(i)),
            ValueRef::Real(f) => Ok(Cell::real(f)),
            ValueRef::Text(bytes) => Ok(Cell::Text(String::from_utf8_lossy(bytes).into_owned())),
            ValueRef::Blob(_) => Err(FromSqlError::InvalidType),
        }
    }
}

/// File-backed table store
pub struct TableStore {
    conn: Connection,
    path: PathBuf,
}

impl TableStore {
    /// Open the store for writing, creating the file if needed
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&path)?;
        Ok(Self { conn, path })
    }

    /// Open an existing store read-only.
    ///
    /// Fails with [`StoreError::NotFound`] instead of creating an empty file.
    pub fn open_existing(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.is_file() {
            return Err(StoreError::NotFound(path));
        }
        let conn = Connection::open_with_flags(
            &path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn, path })
    }

    /// Location of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drop `table` and recreate it from `frame`'s columns and rows.
    ///
    /// Returns the number of rows written.
    pub fn replace_table(&mut self, table: &str, frame: &Frame) -> StoreResult<usize> {
        if frame.columns().is_empty() {
            return Err(StoreError::EmptySchema(table.to_string()));
        }

        let table_ident = quote_ident(table)?;
        let column_defs = frame
            .columns()
            .iter()
            .map(|c| Ok(format!("{} {}", quote_ident(&c.name)?, c.kind.sql_type())))
            .collect::<StoreResult<Vec<_>>>()?;
        let column_names = frame
            .columns()
            .iter()
            .map(|c| quote_ident(&c.name))
            .collect::<StoreResult<Vec<_>>>()?;
        let placeholders = (1..=column_names.len())
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>();

        let tx = self.conn.transaction()?;
        tx.execute(&format!("DROP TABLE IF EXISTS {}", table_ident), [])?;
        tx.execute(
            &format!("CREATE TABLE {} ({})", table_ident, column_defs.join(", ")),
            [],
        )?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table_ident,
                column_names.join(", "),
                placeholders.join(", ")
            ))?;
            for row in frame.rows() {
                stmt.execute(params_from_iter(row.iter()))?;
            }
        }
        tx.commit()?;

        tracing::debug!(
            table,
            rows = frame.len(),
            columns = frame.columns().len(),
            "Table replaced"
        );
        Ok(frame.len())
    }

    /// Whether a table exists
    pub fn has_table(&self, table: &str) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names of a table, in schema order
    pub fn table_columns(&self, table: &str) -> StoreResult<Vec<String>> {
        if !self.has_table(table)? {
            return Err(StoreError::TableMissing(table.to_string()));
        }
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
        let rows = stmt.query_map(params![table], |row| row.get::<_, String>(0))?;
        let names = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Full scan of `columns` in insertion order.
    ///
    /// The table and every requested column must exist; a missing one is
    /// reported by name rather than surfacing as a SQL error.
    pub fn scan<T, F>(&self, table: &str, columns: &[&str], mut map: F) -> StoreResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> StoreResult<T>,
    {
        let present = self.table_columns(table)?;
        let mut selected = Vec::with_capacity(columns.len());
        for column in columns {
            if !present.iter().any(|p| p == column) {
                return Err(StoreError::MissingColumn {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
            selected.push(quote_ident(column)?);
        }

        let sql = format!(
            "SELECT {} FROM {} ORDER BY rowid",
            selected.join(", "),
            quote_ident(table)?
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            out.push(map(row)?);
        }
        Ok(out)
    }

    /// Every cell of a table, in insertion order
    pub fn dump(&self, table: &str) -> StoreResult<Vec<Vec<Cell>>> {
        let columns = self.table_columns(table)?;
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        self.scan(table, &names, |row| {
            (0..names.len())
                .map(|i| row.get::<_, Cell>(i).map_err(StoreError::from))
                .collect()
        })
    }
}

/// Quote a table or column name as a SQL identifier
fn quote_ident(name: &str) -> StoreResult<String> {
    if name.is_empty() || name.contains('\0') {
        return Err(StoreError::InvalidIdentifier(name.to_string()));
    }
    Ok(format!("\"{}\"", name.replace('"', "\"\"")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::frame::ColumnKind;
    use tempfile::tempdir;

    fn sample_frame() -> Frame {
        Frame::from_csv_str(
            "date,state,positive
2020-03-01,OH,100
2020-03-01,MA,",
        )
        .unwrap()
    }

    #[test]
    fn test_replace_and_dump() {
        let dir = tempdir().unwrap();
        let mut store = TableStore::open(dir.path().join("covid.db")).unwrap();

        let written = store.replace_table("covid_states", &sample_frame()).unwrap();
        assert_eq!(written, 2);

        let rows = store.dump("covid_states").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][1], Cell::Text("OH".to_string()));
        assert_eq!(rows[0][2], Cell::Integer(100));
        assert_eq!(rows[1][2], Cell::Null);
    }

    #[test]
    fn test_replace_redefines_schema() {
        let dir = tempdir().unwrap();
        let mut store = TableStore::open(dir.path().join("covid.db")).unwrap();
        store.replace_table("t", &sample_frame()).unwrap();

        let narrower = Frame::from_csv_str("state,hospitalized\nOH,5").unwrap();
        store.replace_table("t", &narrower).unwrap();

        assert_eq!(store.table_columns("t").unwrap(), vec!["state", "hospitalized"]);
        assert_eq!(store.dump("t").unwrap().len(), 1);
    }

    #[test]
    fn test_open_existing_missing_file() {
        let dir = tempdir().unwrap();
        let err = TableStore::open_existing(dir.path().join("absent.db"))
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(!dir.path().join("absent.db").exists());
    }

    #[test]
    fn test_scan_reports_missing_table_and_column() {
        let dir = tempdir().unwrap();
        let mut store = TableStore::open(dir.path().join("covid.db")).unwrap();
        store.replace_table("covid_states", &sample_frame()).unwrap();

        let err = store
            .scan("covid_world", &["location"], |_| Ok(()))
            .unwrap_err();
        assert!(matches!(err, StoreError::TableMissing(_)));

        let err = store
            .scan("covid_states", &["state", "negative"], |_| Ok(()))
            .unwrap_err();
        match err {
            StoreError::MissingColumn { column, .. } => assert_eq!(column, "negative"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_schema_rejected() {
        let dir = tempdir().unwrap();
        let mut store = TableStore::open(dir.path().join("covid.db")).unwrap();
        let err = store.replace_table("t", &Frame::default()).unwrap_err();
        assert!(matches!(err, StoreError::EmptySchema(_)));
    }

    #[test]
    fn test_quote_ident_escapes() {
        assert_eq!(quote_ident("a\"b").unwrap(), "\"a\"\"b\"");
        assert!(quote_ident("").is_err());
        assert_eq!(ColumnKind::Real.sql_type(), "REAL");
    }
}
