//! Concrete backends compared by the harness.
//!
//! All of them open the same SQLite file, so rows written through one are
//! visible through every other.

pub mod cached;
pub mod sqlite;

#[cfg(feature = "sqlx")]
pub mod sqlx;

use std::path::Path;

pub use cached::CachedSqliteAdapter;
pub use sqlite::SqliteAdapter;

#[cfg(feature = "sqlx")]
pub use self::sqlx::SqlxAdapter;

use crate::adapter::Adapter;
use crate::error::BackendError;
use crate::fixtures::{FieldMap, Student};

/// Backends this build knows how to construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Rusqlite,
    RusqliteCached,
    #[cfg(feature = "sqlx")]
    Sqlx,
}

impl BackendKind {
    /// Every backend, in report column order.
    pub fn all() -> Vec<BackendKind> {
        vec![
            BackendKind::Rusqlite,
            BackendKind::RusqliteCached,
            #[cfg(feature = "sqlx")]
            BackendKind::Sqlx,
        ]
    }

    /// Display name.
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Rusqlite => "rusqlite",
            BackendKind::RusqliteCached => "rusqlite-cached",
            #[cfg(feature = "sqlx")]
            BackendKind::Sqlx => "sqlx",
        }
    }

    /// Open this backend against the database at `path`.
    pub fn open(&self, path: &Path) -> Result<Box<dyn Adapter>, BackendError> {
        let adapter: Box<dyn Adapter> = match self {
            BackendKind::Rusqlite => Box::new(SqliteAdapter::open(path)?),
            BackendKind::RusqliteCached => Box::new(CachedSqliteAdapter::open(path)?),
            #[cfg(feature = "sqlx")]
            BackendKind::Sqlx => Box::new(SqlxAdapter::open(path)?),
        };
        Ok(adapter)
    }
}

/// Open the selected backends in report order.
///
/// An empty `only` list selects every backend. A backend that cannot even be
/// constructed is still registered, as an [`UnavailableAdapter`], so probing
/// disables it and the report keeps its column.
pub fn open_all(path: &Path, only: &[String]) -> Vec<Box<dyn Adapter>> {
    BackendKind::all()
        .into_iter()
        .filter(|kind| only.is_empty() || only.iter().any(|name| name == kind.name()))
        .map(|kind| match kind.open(path) {
            Ok(adapter) => adapter,
            Err(e) => {
                tracing::warn!(adapter = kind.name(), error = %e, "failed to open backend");
                Box::new(UnavailableAdapter::new(kind.name(), e.to_string())) as Box<dyn Adapter>
            }
        })
        .collect()
}

/// Stand-in for a backend that failed to open. Every call fails.
#[derive(Debug)]
pub struct UnavailableAdapter {
    name: String,
    reason: String,
}

impl UnavailableAdapter {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }

    fn fail<T>(&self) -> Result<T, BackendError> {
        Err(BackendError::Unavailable(self.reason.clone()))
    }
}

impl Adapter for UnavailableAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn insert(&self) -> Result<usize, BackendError> {
        self.fail()
    }

    fn batch_insert(&self, _rows: usize) -> Result<Vec<usize>, BackendError> {
        self.fail()
    }

    fn list(&self) -> Result<Vec<Student>, BackendError> {
        self.fail()
    }

    fn map_list(&self) -> Result<Vec<FieldMap>, BackendError> {
        self.fail()
    }

    fn delete(&self) -> Result<usize, BackendError> {
        self.fail()
    }
}
