//! sqlx backend for comparison benchmarks.
//!
//! sqlx is async-only; each call is driven to completion on a private
//! current-thread runtime so the harness itself stays synchronous.

use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tokio::runtime::{Builder, Runtime};

use super::sqlite::{BUSY_TIMEOUT, DELETE_SQL, INSERT_SQL, SELECT_SQL};
use crate::adapter::Adapter;
use crate::error::BackendError;
use crate::fixtures::{example_student, generate_students, FieldMap, Student, Value};

/// sqlx backend over a single-connection SQLite pool.
pub struct SqlxAdapter {
    pool: SqlitePool,
    rt: Runtime,
}

impl SqlxAdapter {
    /// Open the database file at `path`.
    pub fn open(path: &Path) -> Result<Self, BackendError> {
        let rt = Builder::new_current_thread().enable_all().build()?;

        let options = SqliteConnectOptions::new()
            .filename(path)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = rt.block_on(async {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect_with(options)
                .await
        })?;

        Ok(Self { pool, rt })
    }
}

impl Adapter for SqlxAdapter {
    fn name(&self) -> &str {
        "sqlx"
    }

    fn insert(&self) -> Result<usize, BackendError> {
        let student = example_student();
        self.rt.block_on(async {
            let result = bind_student(sqlx::query(INSERT_SQL), &student)
                .execute(&self.pool)
                .await?;
            Ok::<_, BackendError>(result.rows_affected() as usize)
        })
    }

    fn batch_insert(&self, rows: usize) -> Result<Vec<usize>, BackendError> {
        if rows == 0 {
            return Ok(Vec::new());
        }

        let students = generate_students(rows);
        self.rt.block_on(async {
            let mut tx = self.pool.begin().await?;
            let mut counts = Vec::with_capacity(students.len());
            for student in &students {
                let result = bind_student(sqlx::query(INSERT_SQL), student)
                    .execute(&mut *tx)
                    .await?;
                counts.push(result.rows_affected() as usize);
            }
            tx.commit().await?;
            Ok::<_, BackendError>(counts)
        })
    }

    fn list(&self) -> Result<Vec<Student>, BackendError> {
        self.rt.block_on(async {
            let rows = sqlx::query(SELECT_SQL).fetch_all(&self.pool).await?;
            rows.iter()
                .map(student_from_row)
                .collect::<Result<Vec<_>, sqlx::Error>>()
                .map_err(BackendError::from)
        })
    }

    fn map_list(&self) -> Result<Vec<FieldMap>, BackendError> {
        self.rt.block_on(async {
            let rows = sqlx::query(SELECT_SQL).fetch_all(&self.pool).await?;
            rows.iter()
                .map(fields_from_row)
                .collect::<Result<Vec<_>, sqlx::Error>>()
                .map_err(BackendError::from)
        })
    }

    fn delete(&self) -> Result<usize, BackendError> {
        self.rt.block_on(async {
            let result = sqlx::query(DELETE_SQL).execute(&self.pool).await?;
            Ok::<_, BackendError>(result.rows_affected() as usize)
        })
    }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;

fn bind_student<'q>(query: SqliteQuery<'q>, s: &Student) -> SqliteQuery<'q> {
    query
        .bind(s.student_id)
        .bind(s.name.clone())
        .bind(s.sex)
        .bind(s.birthday)
        .bind(s.birth_time)
        .bind(s.enrollment_time)
        .bind(s.major)
        .bind(s.photo.clone())
        .bind(s.remark.clone())
        .bind(s.readonly)
}

fn student_from_row(row: &SqliteRow) -> Result<Student, sqlx::Error> {
    Ok(Student {
        student_id: row.try_get("student_id")?,
        name: row.try_get("name")?,
        sex: row.try_get("sex")?,
        birthday: row.try_get("birthday")?,
        birth_time: row.try_get("birth_time")?,
        enrollment_time: row.try_get("enrollment_time")?,
        major: row.try_get("major")?,
        photo: row.try_get("photo")?,
        remark: row.try_get("remark")?,
        readonly: row.try_get("readonly")?,
    })
}

/// Decode a row by the storage class of each value rather than its column type.
fn fields_from_row(row: &SqliteRow) -> Result<FieldMap, sqlx::Error> {
    let mut fields = FieldMap::with_capacity(row.columns().len());
    for column in row.columns() {
        let i = column.ordinal();
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::Integer(row.try_get_unchecked(i)?),
                "REAL" => Value::Real(row.try_get_unchecked(i)?),
                "BLOB" => Value::Blob(row.try_get_unchecked(i)?),
                _ => Value::Text(row.try_get_unchecked(i)?),
            }
        };
        fields.push((column.name().to_string(), value));
    }
    Ok(fields)
}
