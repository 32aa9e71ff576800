//! Scenario driver: preparation, ordering and report accumulation.

use crate::config::Profile;
use crate::context::ExecutionContext;
use crate::error::{BackendError, Error, Result};
use crate::report::Report;
use crate::runner::run_scenario;
use crate::scenario::{standard_scenarios, Preparation, Scenario};

/// Runs a fixed, ordered list of scenarios.
pub struct ScenarioDriver {
    scenarios: Vec<Scenario>,
}

impl ScenarioDriver {
    pub fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Driver over the standard scenario list for `profile`.
    pub fn standard(profile: Profile) -> Self {
        Self::new(standard_scenarios(profile))
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Run every scenario in order and return the report.
    ///
    /// Preparation goes through the reference backend only. A scenario whose
    /// preparation fails is logged and left out of the report; the next one
    /// still runs. Only fatal errors (progress output failing) end the run
    /// early. The table is cleared once the last scenario is done.
    pub fn run(&self, ctx: &mut ExecutionContext) -> Result<Report> {
        let mut report = Report::new(ctx.registry().names());
        let mut seeded: Option<usize> = None;

        for scenario in &self.scenarios {
            if let Err(e) = prepare(ctx, scenario, &mut seeded) {
                tracing::error!(
                    scenario = %scenario.name,
                    error = %e,
                    "scenario preparation failed, skipping scenario"
                );
                continue;
            }

            match run_scenario(ctx, scenario) {
                Ok(entry) => report.push(entry),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::error!(scenario = %scenario.name, error = %e, "scenario failed");
                }
            }

            if scenario.kind.writes() {
                seeded = None;
            }
        }

        match ctx.reference() {
            Ok(reference) => {
                if let Err(e) = reference.delete() {
                    tracing::warn!(adapter = reference.name(), error = %e, "final cleanup failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "final cleanup skipped"),
        }

        tracing::info!(scenarios = report.entries().len(), "run complete");
        Ok(report)
    }
}

/// Bring the shared store into the state `scenario` expects.
///
/// `seeded` records how many rows the last seed left in place; a seed of the
/// same size is skipped.
fn prepare(
    ctx: &ExecutionContext,
    scenario: &Scenario,
    seeded: &mut Option<usize>,
) -> Result<()> {
    let rows = match scenario.preparation {
        Preparation::None => return Ok(()),
        Preparation::Seed(rows) if *seeded == Some(rows) => {
            tracing::debug!(scenario = %scenario.name, rows, "rows already seeded");
            return Ok(());
        }
        Preparation::Clear => None,
        Preparation::Seed(rows) => Some(rows),
    };

    *seeded = None;
    let reference = ctx.reference()?;
    let fail = |source: BackendError| Error::Operation {
        scenario: scenario.name.clone(),
        adapter: reference.name().to_string(),
        source,
    };

    let deleted = reference.delete().map_err(fail)?;
    tracing::debug!(
        scenario = %scenario.name,
        adapter = reference.name(),
        deleted,
        "table cleared"
    );

    if let Some(rows) = rows {
        let counts = reference.batch_insert(rows).map_err(fail)?;
        if counts.len() != rows {
            return Err(fail(BackendError::UnexpectedResult(format!(
                "seeding {} rows returned {} results",
                rows,
                counts.len()
            ))));
        }
        *seeded = Some(rows);
        tracing::info!(
            scenario = %scenario.name,
            adapter = reference.name(),
            rows,
            "table seeded"
        );
    }

    Ok(())
}
