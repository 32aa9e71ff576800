//! Execution context threaded through a run.

use std::io::{self, Write};

use crate::adapter::Adapter;
use crate::error::{Error, Result};
use crate::probe::Registry;

/// Everything a run needs, passed explicitly from the driver down to dispatch.
pub struct ExecutionContext {
    registry: Registry,
    reference: Option<usize>,
    progress: Box<dyn Write>,
}

impl ExecutionContext {
    /// Build a context over a probed registry.
    ///
    /// Data is seeded and cleared through the backend named `reference`. When
    /// that backend is disabled or missing, the first enabled backend is used
    /// instead, since all backends share one store.
    pub fn new(registry: Registry, reference: &str) -> Self {
        let named = registry
            .iter()
            .position(|a| a.name() == reference && a.is_enabled());
        let reference_index = named.or_else(|| {
            let fallback = registry.iter().position(|a| a.is_enabled());
            if let Some(i) = fallback {
                let chosen = registry.iter().nth(i).map(|a| a.name()).unwrap_or_default();
                tracing::warn!(
                    requested = reference,
                    chosen,
                    "reference backend unavailable, seeding through another backend"
                );
            }
            fallback
        });

        Self {
            registry,
            reference: reference_index,
            progress: Box::new(io::stdout()),
        }
    }

    /// Send the per-trial progress table somewhere other than stdout.
    pub fn with_progress(mut self, progress: impl Write + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// The probed backends.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Backend used to seed and clear the shared store.
    pub fn reference(&self) -> Result<&dyn Adapter> {
        self.reference
            .and_then(|i| self.registry.iter().nth(i))
            .map(|a| a.adapter())
            .ok_or(Error::NoReference)
    }

    /// Name of the reference backend, if there is one.
    pub fn reference_name(&self) -> Option<&str> {
        self.reference
            .and_then(|i| self.registry.iter().nth(i))
            .map(|a| a.name())
    }

    pub(crate) fn parts(&mut self) -> (&Registry, &mut dyn Write) {
        (&self.registry, self.progress.as_mut())
    }
}
