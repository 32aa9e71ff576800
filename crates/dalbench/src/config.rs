//! Harness configuration.

use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::error::{Error, Result};

/// Backend that seeds and clears data unless told otherwise.
pub const DEFAULT_REFERENCE: &str = "rusqlite";

/// Trial loops per scenario in the full profile.
pub const FULL_LOOPS: usize = 3;

/// Trial loops per scenario in the fast profile.
pub const FAST_LOOPS: usize = 10;

/// Trial sizing. Both profiles run the same scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    /// Three trials over the full row counts.
    #[default]
    Full,
    /// Ten trials over a tenth of the rows.
    Fast,
}

impl Profile {
    /// Trials per scenario.
    pub fn loops(&self) -> usize {
        match self {
            Profile::Full => FULL_LOOPS,
            Profile::Fast => FAST_LOOPS,
        }
    }

    /// Rows per trial of the single-row insert scenario.
    pub fn insert_rows(&self) -> usize {
        match self {
            Profile::Full => 200,
            Profile::Fast => 20,
        }
    }

    /// Rows per trial of the batch insert scenario.
    pub fn batch_rows(&self) -> usize {
        match self {
            Profile::Full => 50_000,
            Profile::Fast => 5_000,
        }
    }

    /// Rows in place for the fetch scenarios.
    pub fn fetch_rows(&self) -> usize {
        self.batch_rows()
    }
}

/// How the final report is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// JSON object (scenario -> backend -> metric)
    Json,
    /// Table followed by JSON
    Both,
}

impl OutputFormat {
    pub fn includes_table(&self) -> bool {
        matches!(self, OutputFormat::Table | OutputFormat::Both)
    }

    pub fn includes_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Both => write!(f, "both"),
        }
    }
}

/// Benchmark run configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Database file shared by every backend. `None` uses a temporary file.
    pub database_path: Option<PathBuf>,

    /// Trial sizing.
    pub profile: Profile,

    /// Backend that seeds and clears data.
    pub reference: String,

    /// Report format.
    pub output: OutputFormat,

    /// Backends to run. Empty runs all of them.
    pub backends: Vec<String>,
}

impl BenchConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self {
            database_path: None,
            profile: Profile::Full,
            reference: DEFAULT_REFERENCE.to_string(),
            output: OutputFormat::Table,
            backends: Vec::new(),
        }
    }

    /// Use a persistent database file.
    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Set the trial profile.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the reference backend.
    pub fn with_reference(mut self, name: impl Into<String>) -> Self {
        self.reference = name.into();
        self
    }

    /// Set the report format.
    pub fn with_output(mut self, output: OutputFormat) -> Self {
        self.output = output;
        self
    }

    /// Restrict the run to the named backends.
    pub fn with_backends(mut self, backends: Vec<String>) -> Self {
        self.backends = backends;
        self
    }

    /// Check names against the backends this build knows.
    pub fn validate(&self, known: &[&str]) -> Result<()> {
        if let Some(unknown) = self.backends.iter().find(|b| !known.contains(&b.as_str())) {
            return Err(Error::Config(format!(
                "unknown backend '{}', expected one of: {}",
                unknown,
                known.join(", ")
            )));
        }
        if !known.contains(&self.reference.as_str()) {
            return Err(Error::Config(format!(
                "unknown reference backend '{}'",
                self.reference
            )));
        }
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Command-line arguments for the harness.
#[derive(Parser, Debug)]
#[command(name = "dalbench")]
#[command(version, about = "Comparative benchmark of data-access backends", long_about = None)]
pub struct Args {
    /// Run ten short trials per scenario instead of three full ones.
    #[arg(long)]
    pub fast: bool,

    /// SQLite database file shared by every backend (a temporary file when omitted).
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Backend used to seed and clear data.
    #[arg(long, default_value = DEFAULT_REFERENCE)]
    pub reference: String,

    /// Report format.
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Only run the named backend. Repeat to select several.
    #[arg(short, long = "backend")]
    pub backends: Vec<String>,
}

impl Args {
    /// Convert command-line arguments to a run configuration.
    pub fn into_config(self) -> BenchConfig {
        let profile = if self.fast { Profile::Fast } else { Profile::Full };

        BenchConfig {
            database_path: self.database,
            profile,
            reference: self.reference,
            output: self.format,
            backends: self.backends,
        }
    }
}
