//! rusqlite backend that reuses prepared statements.

use std::cell::Cell;
use std::path::Path;

use rusqlite::{Connection, Statement};

use super::sqlite::{
    execute_insert, open_connection, query_field_maps, query_students, DELETE_SQL, INSERT_SQL,
    SELECT_SQL,
};
use crate::adapter::{Adapter, Tuning};
use crate::error::BackendError;
use crate::fixtures::{example_student, generate_students, FieldMap, Student};

/// Statements kept prepared per connection.
const STATEMENT_CACHE_CAPACITY: usize = 16;

/// rusqlite backend going through the connection's statement cache.
///
/// The cache can be switched off with [`Tuning::StatementCache`], which makes
/// this backend behave like [`super::SqliteAdapter`] until switched back on.
pub struct CachedSqliteAdapter {
    conn: Connection,
    cache_enabled: Cell<bool>,
}

impl CachedSqliteAdapter {
    /// Open the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let conn = open_connection(path)?;
        conn.set_prepared_statement_cache_capacity(STATEMENT_CACHE_CAPACITY);
        Ok(Self {
            conn,
            cache_enabled: Cell::new(true),
        })
    }

    /// Whether statements are currently reused.
    pub fn cache_enabled(&self) -> bool {
        self.cache_enabled.get()
    }

    fn with_statement<T>(
        &self,
        conn: &Connection,
        sql: &str,
        f: impl FnOnce(&mut Statement<'_>) -> rusqlite::Result<T>,
    ) -> rusqlite::Result<T> {
        if self.cache_enabled.get() {
            let mut stmt = conn.prepare_cached(sql)?;
            f(&mut *stmt)
        } else {
            let mut stmt = conn.prepare(sql)?;
            f(&mut stmt)
        }
    }
}

impl Adapter for CachedSqliteAdapter {
    fn name(&self) -> &str {
        "rusqlite-cached"
    }

    fn insert(&self) -> Result<usize, BackendError> {
        let student = example_student();
        Ok(self.with_statement(&self.conn, INSERT_SQL, |stmt| {
            execute_insert(stmt, &student)
        })?)
    }

    fn batch_insert(&self, rows: usize) -> Result<Vec<usize>, BackendError> {
        if rows == 0 {
            return Ok(Vec::new());
        }

        let students = generate_students(rows);
        let tx = self.conn.unchecked_transaction()?;
        let counts = self.with_statement(&tx, INSERT_SQL, |stmt| {
            students
                .iter()
                .map(|student| execute_insert(stmt, student))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?;
        tx.commit()?;
        Ok(counts)
    }

    fn list(&self) -> Result<Vec<Student>, BackendError> {
        Ok(self.with_statement(&self.conn, SELECT_SQL, query_students)?)
    }

    fn map_list(&self) -> Result<Vec<FieldMap>, BackendError> {
        Ok(self.with_statement(&self.conn, SELECT_SQL, query_field_maps)?)
    }

    fn delete(&self) -> Result<usize, BackendError> {
        Ok(self.with_statement(&self.conn, DELETE_SQL, |stmt| stmt.execute([]))?)
    }

    fn tune(&self, tuning: Tuning) -> Result<bool, BackendError> {
        match tuning {
            Tuning::StatementCache(enabled) => {
                if !enabled {
                    self.conn.flush_prepared_statement_cache();
                }
                self.cache_enabled.set(enabled);
                Ok(true)
            }
        }
    }
}
