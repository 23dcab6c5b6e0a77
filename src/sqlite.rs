use rusqlite::{Connection, OpenFlags, Transaction};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Location of the local database, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "data/local.db";

/// Tables emptied by a run, in deletion order. Children come before parents.
pub const DEFAULT_TABLES: [&str; 3] = ["output_rolls", "input_rolls", "jobs"];

/// Errors raised while clearing tables.
#[derive(Debug, Error)]
pub enum ClearError {
    #[error("failed to open database at {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),
    #[error("failed to begin transaction")]
    Transaction(#[source] rusqlite::Error),
    #[error("failed to delete rows from table {table}")]
    Delete {
        table: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("failed to commit transaction")]
    Commit(#[source] rusqlite::Error),
    #[error("failed to write progress output")]
    Output(#[from] std::io::Error),
}

pub type Result<T, E = ClearError> = std::result::Result<T, E>;

/// Unconditional delete of every row in one table.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteOperation {
    pub table: String,
}

impl DeleteOperation {
    /// Build a delete-all operation, rejecting names that cannot be an identifier.
    pub fn all_rows(table: &str) -> Result<Self> {
        if table.is_empty() || table.contains('\0') {
            return Err(ClearError::InvalidTableName(table.to_string()));
        }
        Ok(Self {
            table: table.to_string(),
        })
    }

    pub fn statement(&self) -> String {
        format!("DELETE FROM \"{}\"", self.table.replace('"', "\"\""))
    }

    /// Run against an open transaction, returning the number of rows removed.
    fn execute(&self, tx: &Transaction<'_>) -> Result<usize> {
        tx.execute(&self.statement(), [])
            .map_err(|source| ClearError::Delete {
                table: self.table.clone(),
                source,
            })
    }
}

/// Outcome for a single table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCleared {
    pub table: String,
    pub rows: usize,
}

/// Per-table outcomes of a committed run, in deletion order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClearReport {
    pub tables: Vec<TableCleared>,
}

impl ClearReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }
}

/// Table clearer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ClearConfig {
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Tables to empty, in order
    pub tables: Vec<String>,
}

impl ClearConfig {
    /// Create a config with an explicit path and table list
    pub fn new<I, S>(db_path: impl Into<PathBuf>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            db_path: db_path.into(),
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for ClearConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DB_PATH, DEFAULT_TABLES)
    }
}

/// Read-write without create; the path is always a plain filename, never a URI.
fn open_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

/// Open an existing database read-write. A missing file is an error, not a new database.
///
/// The header is read before returning, so a file that is not a database fails
/// here rather than on the first delete.
pub fn open_database(path: &Path) -> Result<Connection> {
    let open_err = |source: rusqlite::Error| ClearError::Open {
        path: path.to_path_buf(),
        source,
    };
    let conn = Connection::open_with_flags(path, open_flags()).map_err(open_err)?;
    conn.query_row("PRAGMA schema_version", [], |row| row.get::<_, i64>(0))
        .map_err(open_err)?;
    Ok(conn)
}

pub struct TableClearer {
    config: ClearConfig,
}

impl TableClearer {
    pub fn new(config: ClearConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClearConfig {
        &self.config
    }

    /// Open the configured database, empty every configured table, commit once,
    /// then print the completion line.
    ///
    /// The connection is closed when this returns, on every path.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<ClearReport> {
        let path = self.config.db_path.as_path();
        info!(path = %path.display(), "opening database");
        let mut conn = open_database(path)?;

        let report = self.clear_tables(&mut conn, out)?;
        drop(conn);

        writeln!(out, "All specified tables have been emptied.")?;
        Ok(report)
    }

    /// Delete all rows from each configured table inside one transaction.
    ///
    /// Nothing is committed unless every delete succeeds; an early return drops
    /// the transaction, which rolls it back.
    pub fn clear_tables<W: Write>(
        &self,
        conn: &mut Connection,
        out: &mut W,
    ) -> Result<ClearReport> {
        let tx = conn.transaction().map_err(ClearError::Transaction)?;

        let mut report = ClearReport::default();
        for table in &self.config.tables {
            match self.clear_one(&tx, table, out) {
                Ok(cleared) => report.tables.push(cleared),
                Err(err) => {
                    warn!(table = %table, error = %err, "aborting, rolling back deletes");
                    return Err(err);
                }
            }
        }

        tx.commit().map_err(ClearError::Commit)?;
        info!(
            tables = report.tables.len(),
            rows = report.total_rows(),
            "committed"
        );
        Ok(report)
    }

    fn clear_one<W: Write>(
        &self,
        tx: &Transaction<'_>,
        table: &str,
        out: &mut W,
    ) -> Result<TableCleared> {
        let op = DeleteOperation::all_rows(table)?;
        let rows = op.execute(tx)?;
        debug!(table = %op.table, rows, "deleted rows");
        writeln!(out, "Emptied table: {}", op.table)?;
        Ok(TableCleared {
            table: op.table,
            rows,
        })
    }
}
