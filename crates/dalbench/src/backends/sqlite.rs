//! Plain rusqlite backend.
//!
//! Prepares every statement afresh on each call, the way a hand-written
//! data-access layer without a statement cache behaves.

use std::path::Path;
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row, Statement};

use crate::adapter::Adapter;
use crate::error::BackendError;
use crate::fixtures::{example_student, generate_students, FieldMap, Student, Value};

pub(crate) const INSERT_SQL: &str = "INSERT INTO dalbench_student (student_id, name, sex, birthday, birth_time, enrollment_time, major, photo, remark, readonly) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";
pub(crate) const SELECT_SQL: &str = "SELECT student_id, name, sex, birthday, birth_time, enrollment_time, major, photo, remark, readonly FROM dalbench_student";
pub(crate) const DELETE_SQL: &str = "DELETE FROM dalbench_student";

/// How long a connection waits on a locked database before failing.
pub(crate) const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// rusqlite backend without statement caching.
pub struct SqliteAdapter {
    conn: Connection,
}

impl SqliteAdapter {
    /// Open the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let conn = open_connection(path)?;
        conn.set_prepared_statement_cache_capacity(0);
        Ok(Self { conn })
    }
}

impl Adapter for SqliteAdapter {
    fn name(&self) -> &str {
        "rusqlite"
    }

    fn insert(&self) -> Result<usize, BackendError> {
        let mut stmt = self.conn.prepare(INSERT_SQL)?;
        Ok(execute_insert(&mut stmt, &example_student())?)
    }

    fn batch_insert(&self, rows: usize) -> Result<Vec<usize>, BackendError> {
        if rows == 0 {
            return Ok(Vec::new());
        }

        let tx = self.conn.unchecked_transaction()?;
        let counts = {
            let mut stmt = tx.prepare(INSERT_SQL)?;
            generate_students(rows)
                .iter()
                .map(|student| execute_insert(&mut stmt, student))
                .collect::<rusqlite::Result<Vec<_>>>()?
        };
        tx.commit()?;
        Ok(counts)
    }

    fn list(&self) -> Result<Vec<Student>, BackendError> {
        let mut stmt = self.conn.prepare(SELECT_SQL)?;
        Ok(query_students(&mut stmt)?)
    }

    fn map_list(&self) -> Result<Vec<FieldMap>, BackendError> {
        let mut stmt = self.conn.prepare(SELECT_SQL)?;
        Ok(query_field_maps(&mut stmt)?)
    }

    fn delete(&self) -> Result<usize, BackendError> {
        Ok(self.conn.execute(DELETE_SQL, [])?)
    }
}

/// Open a read-write connection to an existing benchmark database.
pub(crate) fn open_connection(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

pub(crate) fn execute_insert(stmt: &mut Statement<'_>, s: &Student) -> rusqlite::Result<usize> {
    stmt.execute(params![
        s.student_id,
        s.name,
        s.sex,
        s.birthday,
        s.birth_time,
        s.enrollment_time,
        s.major,
        s.photo,
        s.remark,
        s.readonly
    ])
}

pub(crate) fn query_students(stmt: &mut Statement<'_>) -> rusqlite::Result<Vec<Student>> {
    stmt.query_map([], student_from_row)?.collect()
}

pub(crate) fn query_field_maps(stmt: &mut Statement<'_>) -> rusqlite::Result<Vec<FieldMap>> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

    stmt.query_map([], |row| {
        let mut fields = FieldMap::with_capacity(columns.len());
        for (i, column) in columns.iter().enumerate() {
            fields.push((column.clone(), decode_value(row.get_ref(i)?)));
        }
        Ok(fields)
    })?
    .collect()
}

fn student_from_row(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        student_id: row.get(0)?,
        name: row.get(1)?,
        sex: row.get(2)?,
        birthday: row.get(3)?,
        birth_time: row.get(4)?,
        enrollment_time: row.get(5)?,
        major: row.get(6)?,
        photo: row.get(7)?,
        remark: row.get(8)?,
        readonly: row.get(9)?,
    })
}

fn decode_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Real(f),
        ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Blob(b.to_vec()),
    }
}
