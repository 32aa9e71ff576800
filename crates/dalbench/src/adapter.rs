//! The operation contract every backend implements.

use std::fmt;

use crate::error::BackendError;
use crate::fixtures::{FieldMap, Student};

/// One data-access technology under comparison.
///
/// All calls are synchronous and may block on the underlying store. No call
/// retries; a fault is returned to the caller as soon as it happens.
pub trait Adapter {
    /// Display name used verbatim in reports.
    fn name(&self) -> &str;

    /// Insert the fixed example row. Returns rows affected.
    fn insert(&self) -> Result<usize, BackendError>;

    /// Insert `rows` generated records as one bulk operation.
    ///
    /// Returns one affected-row count per record. `rows == 0` is a no-op.
    fn batch_insert(&self, rows: usize) -> Result<Vec<usize>, BackendError>;

    /// Fetch every row as a typed record, in backend order.
    fn list(&self) -> Result<Vec<Student>, BackendError>;

    /// Fetch every row through the backend's generic decoding path.
    fn map_list(&self) -> Result<Vec<FieldMap>, BackendError>;

    /// Delete every row. Returns rows affected.
    fn delete(&self) -> Result<usize, BackendError>;

    /// Apply a tuning switch. Returns `false` when the backend has no such knob.
    fn tune(&self, _tuning: Tuning) -> Result<bool, BackendError> {
        Ok(false)
    }
}

/// Identifies one call of the adapter contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterCall {
    Insert,
    BatchInsert,
    List,
    MapList,
    Delete,
}

impl fmt::Display for AdapterCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterCall::Insert => write!(f, "insert"),
            AdapterCall::BatchInsert => write!(f, "batchInsert"),
            AdapterCall::List => write!(f, "list"),
            AdapterCall::MapList => write!(f, "mapList"),
            AdapterCall::Delete => write!(f, "delete"),
        }
    }
}

/// Backend-specific switches a scenario can flip for its duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tuning {
    /// Reuse prepared statements across calls.
    StatementCache(bool),
}

impl Tuning {
    /// The setting backends start with.
    pub fn default_of(self) -> Tuning {
        match self {
            Tuning::StatementCache(_) => Tuning::StatementCache(true),
        }
    }
}

impl fmt::Display for Tuning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tuning::StatementCache(on) => write!(f, "statement-cache={}", on),
        }
    }
}
