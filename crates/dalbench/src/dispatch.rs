//! Timed execution of one operation against one backend.

use std::fmt;
use std::hint::black_box;
use std::time::{Duration, Instant};

use crate::adapter::Adapter;
use crate::error::BackendError;

/// Operations a scenario can time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// `rows` sequential single-row inserts.
    Insert,
    /// One bulk insert of `rows` records.
    BatchInsert,
    /// One typed fetch of every row.
    ListFetch,
    /// One generic fetch of every row.
    MapListFetch,
}

impl OperationKind {
    /// Whether the operation adds rows to the shared store.
    pub fn writes(&self) -> bool {
        matches!(self, OperationKind::Insert | OperationKind::BatchInsert)
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Insert => write!(f, "insert"),
            OperationKind::BatchInsert => write!(f, "batchInsert"),
            OperationKind::ListFetch => write!(f, "list"),
            OperationKind::MapListFetch => write!(f, "mapList"),
        }
    }
}

/// Run `kind` once against `adapter` and return the wall-clock time it took.
///
/// `Insert` issues `rows` separate single-row calls so that it measures
/// per-row round trips; it is never folded into a batch. For fetches `rows`
/// only describes how much data is already in place. Faults are returned as
/// they come, with no retry.
pub fn dispatch(
    kind: OperationKind,
    adapter: &dyn Adapter,
    rows: usize,
) -> Result<Duration, BackendError> {
    let start = Instant::now();

    match kind {
        OperationKind::Insert => {
            for _ in 0..rows {
                adapter.insert()?;
            }
        }
        OperationKind::BatchInsert => {
            black_box(adapter.batch_insert(rows)?);
        }
        OperationKind::ListFetch => {
            black_box(adapter.list()?);
        }
        OperationKind::MapListFetch => {
            black_box(adapter.map_list()?);
        }
    }

    Ok(start.elapsed())
}
