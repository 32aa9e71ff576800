//! Harness error types.

use thiserror::Error;

use crate::adapter::AdapterCall;

/// Errors raised by a backend adapter.
///
/// Adapters never retry; whatever the underlying driver reports is wrapped
/// here and handed straight back to the caller.
#[derive(Debug, Error)]
pub enum BackendError {
    /// SQLite driver error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// sqlx driver error.
    #[cfg(feature = "sqlx")]
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Failed to build the runtime an async backend runs on.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// The backend could not be constructed at all.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend answered, but with something other than what the contract requires.
    #[error("unexpected result: {0}")]
    UnexpectedResult(String),
}

/// A backend failed one step of its availability cycle.
#[derive(Debug, Error)]
#[error("probe of {adapter} failed at {step}: {source}")]
pub struct ProbeError {
    pub adapter: String,
    pub step: AdapterCall,
    #[source]
    pub source: BackendError,
}

/// Coarse classification callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Schema bootstrap failed.
    Setup,
    /// A backend failed its availability cycle.
    Probe,
    /// A timed operation or scenario preparation failed.
    Operation,
    /// Invalid configuration.
    Config,
    /// Output could not be written.
    Io,
}

/// Harness errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Schema bootstrap failed; the run cannot continue.
    #[error("setup error ({resource}): {message}")]
    Setup { resource: String, message: String },

    /// A backend failed its availability cycle.
    #[error(transparent)]
    Probe(#[from] ProbeError),

    /// A backend failed while a scenario was running or being prepared.
    #[error("{adapter} failed during {scenario}: {source}")]
    Operation {
        scenario: String,
        adapter: String,
        #[source]
        source: BackendError,
    },

    /// No enabled backend is left to seed or clear data through.
    #[error("no enabled backend to seed data through")]
    NoReference,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Build a setup error for the named resource.
    pub fn setup(resource: impl Into<String>, message: impl ToString) -> Self {
        Error::Setup {
            resource: resource.into(),
            message: message.to_string(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Setup { .. } => ErrorKind::Setup,
            Error::Probe(_) => ErrorKind::Probe,
            Error::Operation { .. } | Error::NoReference => ErrorKind::Operation,
            Error::Config(_) => ErrorKind::Config,
            Error::Io(_) | Error::Json(_) => ErrorKind::Io,
        }
    }

    /// Whether this error ends the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Setup | ErrorKind::Config | ErrorKind::Io
        )
    }
}

/// Result alias for harness operations.
pub type Result<T> = std::result::Result<T, Error>;
