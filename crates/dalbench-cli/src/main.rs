//! dalbench command-line runner.
//!
//! Bootstraps the shared table, probes every backend, runs the standard
//! scenarios and prints the report.

use std::io;
use std::path::PathBuf;

use clap::Parser;
use tempfile::TempDir;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dalbench::{
    bootstrap_file, open_all, probe, Args, BackendKind, Dialect, ExecutionContext, OutputFormat,
    ScenarioDriver,
};

const SCRATCH_FILE: &str = "dalbench.db";

fn main() {
    // Logs go to stderr; stdout carries only the report.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dalbench=info,dalbench_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.into_config();

    let known: Vec<&str> = BackendKind::all().iter().map(|k| k.name()).collect();
    config.validate(&known)?;

    let (_scratch, path) = database_file(config.database_path.clone())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %path.display(),
        profile = ?config.profile,
        reference = %config.reference,
        "starting benchmark"
    );

    bootstrap_file(&path, Dialect::Sqlite)?;

    let registry = probe(open_all(&path, &config.backends));
    let enabled = registry.enabled().count();
    tracing::info!(backends = registry.len(), enabled, "probing complete");
    if enabled == 0 {
        tracing::warn!("no backend passed probing, every scenario will be skipped");
    }

    let mut ctx = ExecutionContext::new(registry, &config.reference);
    if config.output == OutputFormat::Json {
        ctx = ctx.with_progress(io::stderr());
    }

    let report = ScenarioDriver::standard(config.profile).run(&mut ctx)?;

    if config.output.includes_table() {
        println!("{}", report.render_table());
    }
    if config.output.includes_json() {
        println!("{}", report.to_json_string()?);
    }

    Ok(())
}

/// Resolve the database file, creating a scratch directory when none was given.
///
/// The returned guard must outlive every backend connection.
fn database_file(path: Option<PathBuf>) -> io::Result<(Option<TempDir>, PathBuf)> {
    match path {
        Some(path) => Ok((None, path)),
        None => {
            let dir = tempfile::tempdir()?;
            let path = dir.path().join(SCRATCH_FILE);
            Ok((Some(dir), path))
        }
    }
}
