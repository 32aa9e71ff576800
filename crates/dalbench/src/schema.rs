//! Schema bootstrap for the benchmark table.
//!
//! Runs once before probing. The statements for each dialect are kept as a
//! list so nothing has to split a script on delimiters.

use std::path::Path;

use rusqlite::Connection;

use crate::error::{Error, Result};

/// Name of the table every backend reads and writes.
pub const TABLE: &str = "dalbench_student";

/// SQL dialect of the shared store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Dialect {
    Sqlite,
}

const SQLITE_STATEMENTS: &[&str] = &[
    "DROP TABLE IF EXISTS dalbench_student",
    r#"CREATE TABLE dalbench_student (
        student_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        sex INTEGER NOT NULL,
        birthday TEXT,
        birth_time TEXT,
        enrollment_time TEXT,
        major INTEGER NOT NULL,
        photo BLOB,
        remark TEXT,
        readonly INTEGER NOT NULL
    )"#,
    "CREATE INDEX idx_dalbench_student_id ON dalbench_student(student_id)",
];

impl Dialect {
    /// Resolve a dialect by name.
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(Error::setup(
                format!("schema/{}", other),
                "no bootstrap statements for this dialect",
            )),
        }
    }

    /// Dialect name.
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
        }
    }

    /// Ordered DDL statements creating the benchmark table.
    pub fn statements(&self) -> &'static [&'static str] {
        match self {
            Dialect::Sqlite => SQLITE_STATEMENTS,
        }
    }
}

/// Create the benchmark table in one transaction.
///
/// Any failing statement rolls the whole bootstrap back. Returns the number
/// of statements executed.
pub fn bootstrap(conn: &mut Connection, dialect: Dialect) -> Result<usize> {
    let resource = format!("schema/{}", dialect.name());
    tracing::info!(dialect = dialect.name(), "creating table {}", TABLE);

    let tx = conn
        .transaction()
        .map_err(|e| Error::setup(&resource, e))?;

    for statement in dialect.statements() {
        tx.execute_batch(statement).map_err(|e| {
            tracing::error!(error = %e, statement, "bootstrap statement failed, rolling back");
            Error::setup(&resource, e)
        })?;
        tracing::debug!(statement, "executed");
    }

    tx.commit().map_err(|e| Error::setup(&resource, e))?;
    Ok(dialect.statements().len())
}

/// Open the database file at `path` and bootstrap it.
pub fn bootstrap_file(path: &Path, dialect: Dialect) -> Result<usize> {
    let mut conn =
        Connection::open(path).map_err(|e| Error::setup(path.display().to_string(), e))?;
    bootstrap(&mut conn, dialect)
}
