use crate::model::{RawTable, SourceTables, StorageError, columns};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source of the two record sets the pipeline works on.
pub trait CaseSource {
    fn load(&self) -> Result<SourceTables, StorageError>;
}

/// Reads the complaint and case-detail tables from a SQLite export of the
/// desktop database.
pub struct SqliteSource {
    db_path: PathBuf,
    complaints_table: String,
    details_table: String,
}

impl SqliteSource {
    pub fn new(db_path: impl AsRef<Path>, complaints_table: &str, details_table: &str) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            complaints_table: complaints_table.to_string(),
            details_table: details_table.to_string(),
        }
    }

    /// Reads every row of `table`, rendering each cell as text.
    fn read_table(conn: &Connection, table: &str) -> Result<RawTable, StorageError> {
        let sql = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
        let mut stmt = conn.prepare(&sql)?;
        let column_names: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();
        let width = column_names.len();

        let rows = stmt.query_map([], |row| Self::map_row(row, width))?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }

        debug!("Read {} rows from {}", result.len(), table);
        Ok(RawTable {
            name: table.to_string(),
            columns: column_names,
            rows: result,
        })
    }

    fn map_row(row: &Row, width: usize) -> Result<Vec<Option<String>>, rusqlite::Error> {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            let cell = match row.get_ref(idx)? {
                ValueRef::Null | ValueRef::Blob(_) => None,
                ValueRef::Integer(i) => Some(i.to_string()),
                ValueRef::Real(f) => Some(f.to_string()),
                ValueRef::Text(t) => Some(String::from_utf8_lossy(t).into_owned()),
            };
            cells.push(cell);
        }
        Ok(cells)
    }

    fn require_key(table: &RawTable) -> Result<(), StorageError> {
        if table.column_index(columns::ID).is_none() {
            return Err(StorageError::MissingColumn {
                table: table.name.clone(),
                column: columns::ID.to_string(),
            });
        }
        Ok(())
    }
}

impl CaseSource for SqliteSource {
    fn load(&self) -> Result<SourceTables, StorageError> {
        info!("Opening {}", self.db_path.display());
        let conn = Connection::open_with_flags(
            &self.db_path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;

        let complaints = Self::read_table(&conn, &self.complaints_table)?;
        let details = Self::read_table(&conn, &self.details_table)?;
        drop(conn);

        Self::require_key(&complaints)?;
        Self::require_key(&details)?;

        info!(
            "Loaded {} complaint rows and {} detail rows",
            complaints.rows.len(),
            details.rows.len()
        );
        Ok(SourceTables { complaints, details })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(
            "
            CREATE TABLE Quejas (
                Expediente TEXT,
                SubProcu TEXT,
                FechaInicio TEXT,
                GrupoVulnerable INTEGER
            );
            CREATE TABLE Expediente (
                Expediente TEXT,
                \"Conclusión\" TEXT,
                F_Conclusion TEXT,
                Monto REAL,
                Adjunto BLOB
            );
            INSERT INTO Quejas VALUES ('C1', 'Zona A', '2021-01-01', -1);
            INSERT INTO Quejas VALUES ('C2', NULL, '2021-03-01', 0);
            INSERT INTO Expediente VALUES ('C1', 'Admisión', '2021-01-10', 12.5, x'00');
            ",
        )
        .unwrap();
        file
    }

    #[test]
    fn loads_both_tables_as_text() {
        let db = fixture();
        let source = SqliteSource::new(db.path(), "Quejas", "Expediente");
        let tables = source.load().unwrap();

        assert_eq!(
            tables.complaints.columns,
            vec!["Expediente", "SubProcu", "FechaInicio", "GrupoVulnerable"]
        );
        assert_eq!(tables.complaints.rows.len(), 2);
        assert_eq!(tables.complaints.rows[0][3].as_deref(), Some("-1"));
        assert_eq!(tables.complaints.rows[1][1], None);

        let detail = &tables.details.rows[0];
        assert_eq!(detail[1].as_deref(), Some("Admisión"));
        assert_eq!(detail[3].as_deref(), Some("12.5"));
        assert_eq!(detail[4], None);
    }

    #[test]
    fn missing_table_is_fatal() {
        let db = fixture();
        let source = SqliteSource::new(db.path(), "Quejas", "NoSuchTable");
        assert!(matches!(source.load(), Err(StorageError::Database(_))));
    }

    #[test]
    fn missing_key_column_is_fatal() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let conn = Connection::open(file.path()).unwrap();
        conn.execute_batch(
            "CREATE TABLE Quejas (Expediente TEXT);
             CREATE TABLE Expediente (Folio TEXT);",
        )
        .unwrap();
        drop(conn);

        let source = SqliteSource::new(file.path(), "Quejas", "Expediente");
        match source.load() {
            Err(StorageError::MissingColumn { table, column }) => {
                assert_eq!(table, "Expediente");
                assert_eq!(column, "Expediente");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let source = SqliteSource::new(dir.path().join("absent.db"), "Quejas", "Expediente");
        assert!(source.load().is_err());
    }
}
