//! Scenario definitions and the fixed run list.

use crate::adapter::Tuning;
use crate::config::Profile;
use crate::dispatch::OperationKind;
use crate::runner::Aggregation;

/// What must be true of the shared store before a scenario's first trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preparation {
    /// Leave the store as it is.
    None,
    /// Delete every row.
    Clear,
    /// Delete every row, then bulk insert this many.
    Seed(usize),
}

/// A named, parameterized unit of repeated timing work.
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,
    pub kind: OperationKind,
    pub loops: usize,
    pub rows: usize,
    pub aggregation: Aggregation,
    pub preparation: Preparation,
    /// Switch applied to every enabled backend for the scenario's duration.
    pub tuning: Option<Tuning>,
}

impl Scenario {
    /// Create a scenario with the defaults for its operation.
    ///
    /// Writes are reported as throughput and start from an empty table.
    /// Fetches are reported as mean latency over `rows` seeded rows.
    pub fn new(name: impl Into<String>, kind: OperationKind, loops: usize, rows: usize) -> Self {
        let (aggregation, preparation) = if kind.writes() {
            (Aggregation::Throughput, Preparation::Clear)
        } else {
            (Aggregation::Mean, Preparation::Seed(rows))
        };

        Self {
            name: name.into(),
            kind,
            loops,
            rows,
            aggregation,
            preparation,
            tuning: None,
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_preparation(mut self, preparation: Preparation) -> Self {
        self.preparation = preparation;
        self
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = Some(tuning);
        self
    }
}

/// The fixed, ordered scenario list for a profile.
pub fn standard_scenarios(profile: Profile) -> Vec<Scenario> {
    let loops = profile.loops();
    let fetch_rows = profile.fetch_rows();

    vec![
        Scenario::new("insert", OperationKind::Insert, loops, profile.insert_rows()),
        Scenario::new(
            "batchInsert",
            OperationKind::BatchInsert,
            loops,
            profile.batch_rows(),
        ),
        Scenario::new("getList", OperationKind::ListFetch, loops, fetch_rows),
        Scenario::new("getList-uncached", OperationKind::ListFetch, loops, fetch_rows)
            .with_tuning(Tuning::StatementCache(false)),
        Scenario::new("getMapList", OperationKind::MapListFetch, loops, fetch_rows),
    ]
}
