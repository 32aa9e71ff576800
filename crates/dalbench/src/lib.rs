//! dalbench - comparative benchmark harness for data-access backends.
//!
//! Several interchangeable backends run the same workload against one shared
//! SQLite store, one after another, and their timings are reported side by
//! side.
//!
//! # Run phases
//!
//! - **Bootstrap**: create the benchmark table ([`schema`])
//! - **Probe**: run one full operation cycle per backend and disable the ones that fail ([`probe`])
//! - **Scenarios**: prepare the store, time every trial, aggregate ([`driver`], [`runner`])
//! - **Report**: aligned table and JSON ([`report`])

pub mod adapter;
pub mod backends;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod fixtures;
pub mod probe;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod schema;

#[cfg(test)]
mod testing;

pub use adapter::{Adapter, AdapterCall, Tuning};
pub use backends::{open_all, BackendKind, CachedSqliteAdapter, SqliteAdapter, UnavailableAdapter};
#[cfg(feature = "sqlx")]
pub use backends::SqlxAdapter;
pub use config::{Args, BenchConfig, OutputFormat, Profile};
pub use context::ExecutionContext;
pub use dispatch::{dispatch, OperationKind};
pub use driver::ScenarioDriver;
pub use error::{BackendError, Error, ErrorKind, ProbeError, Result};
pub use fixtures::{example_student, generate_students, FieldMap, Student, Value};
pub use probe::{probe, Availability, ProbedAdapter, Registry};
pub use report::{Report, ReportEntry};
pub use runner::{run_scenario, Aggregation, Metric};
pub use scenario::{standard_scenarios, Preparation, Scenario};
pub use schema::{bootstrap, bootstrap_file, Dialect};
