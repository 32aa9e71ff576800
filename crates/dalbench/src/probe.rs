//! Availability probing and the registry of probed backends.
//!
//! Several backends may be missing or misconfigured in a given deployment.
//! Probing runs one full cycle of the adapter contract against each backend,
//! once, before any timed trial. A backend that fails any step is disabled
//! for the whole run; the others are unaffected.

use crate::adapter::{Adapter, AdapterCall};
use crate::error::{BackendError, ProbeError};

/// Outcome of probing one backend. Fixed for the rest of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Passed the full cycle.
    Enabled,
    /// Failed at `step`.
    Disabled { step: AdapterCall, reason: String },
}

impl Availability {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Availability::Enabled)
    }
}

/// A backend together with its probe outcome.
pub struct ProbedAdapter {
    adapter: Box<dyn Adapter>,
    availability: Availability,
}

impl ProbedAdapter {
    /// Backend display name.
    pub fn name(&self) -> &str {
        self.adapter.name()
    }

    /// The adapter itself.
    pub fn adapter(&self) -> &dyn Adapter {
        self.adapter.as_ref()
    }

    /// Probe outcome.
    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    pub fn is_enabled(&self) -> bool {
        self.availability.is_enabled()
    }
}

/// Every configured backend in registration order, each with its probe outcome.
///
/// There is no way to change an outcome once the registry is built.
pub struct Registry {
    adapters: Vec<ProbedAdapter>,
}

impl Registry {
    /// All backends, enabled or not, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ProbedAdapter> {
        self.adapters.iter()
    }

    /// Enabled backends in registration order.
    pub fn enabled(&self) -> impl Iterator<Item = &ProbedAdapter> {
        self.adapters.iter().filter(|a| a.is_enabled())
    }

    /// Display names of all backends in registration order.
    pub fn names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// Find a backend by display name.
    pub fn get(&self, name: &str) -> Option<&ProbedAdapter> {
        self.adapters.iter().find(|a| a.name() == name)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Probe every backend in order and build the registry.
pub fn probe(adapters: Vec<Box<dyn Adapter>>) -> Registry {
    tracing::info!(backends = adapters.len(), "probing backends");

    let adapters = adapters
        .into_iter()
        .map(|adapter| {
            let availability = match probe_one(adapter.as_ref()) {
                Ok(()) => {
                    tracing::info!(adapter = adapter.name(), "backend enabled");
                    Availability::Enabled
                }
                Err(e) => {
                    tracing::warn!(
                        adapter = adapter.name(),
                        step = %e.step,
                        error = %e.source,
                        "backend disabled"
                    );
                    Availability::Disabled {
                        step: e.step,
                        reason: e.source.to_string(),
                    }
                }
            };
            ProbedAdapter {
                adapter,
                availability,
            }
        })
        .collect();

    Registry { adapters }
}

/// Run insert → batch insert of one → list → map list → delete.
///
/// Stops at the first failing step.
pub fn probe_one(adapter: &dyn Adapter) -> Result<(), ProbeError> {
    let fail = |step: AdapterCall| {
        let name = adapter.name().to_string();
        move |source: BackendError| ProbeError {
            adapter: name,
            step,
            source,
        }
    };

    let inserted = adapter.insert().map_err(fail(AdapterCall::Insert))?;
    if inserted != 1 {
        return Err(fail(AdapterCall::Insert)(BackendError::UnexpectedResult(
            format!("insert affected {} rows, expected 1", inserted),
        )));
    }

    let counts = adapter
        .batch_insert(1)
        .map_err(fail(AdapterCall::BatchInsert))?;
    if counts.len() != 1 {
        return Err(fail(AdapterCall::BatchInsert)(
            BackendError::UnexpectedResult(format!(
                "batch insert of 1 returned {} results",
                counts.len()
            )),
        ));
    }

    adapter.list().map_err(fail(AdapterCall::List))?;
    adapter.map_list().map_err(fail(AdapterCall::MapList))?;
    adapter.delete().map_err(fail(AdapterCall::Delete))?;

    tracing::debug!(adapter = adapter.name(), "probe cycle complete");
    Ok(())
}
