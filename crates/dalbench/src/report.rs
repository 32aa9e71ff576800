//! Ordered benchmark report and its renderings.

use comfy_table::presets::ASCII_MARKDOWN;
use comfy_table::{Cell, CellAlignment, Table};

use crate::error::Result;
use crate::runner::Metric;

/// One scenario's aggregated metrics, one per backend in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub unit: String,
    pub metrics: Vec<(String, Metric)>,
}

impl ReportEntry {
    /// Metric for the named backend.
    pub fn metric(&self, adapter: &str) -> Option<Metric> {
        self.metrics
            .iter()
            .find(|(name, _)| name == adapter)
            .map(|(_, m)| *m)
    }
}

/// Scenario results in execution order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    adapters: Vec<String>,
    entries: Vec<ReportEntry>,
}

impl Report {
    /// Create an empty report with one column per backend.
    pub fn new(adapters: Vec<String>) -> Self {
        Self {
            adapters,
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Backend columns in registration order.
    pub fn adapters(&self) -> &[String] {
        &self.adapters
    }

    /// Entries in the order their scenarios ran.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Find an entry by scenario name.
    pub fn get(&self, scenario: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.name == scenario)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render as an aligned text table, one row per scenario.
    ///
    /// Values are rounded to two decimals here only.
    pub fn render_table(&self) -> String {
        let mut table = Table::new();
        table.load_preset(ASCII_MARKDOWN);

        let mut headers: Vec<Cell> = vec![Cell::new("scenario"), Cell::new("unit")];
        for adapter in &self.adapters {
            headers.push(Cell::new(adapter));
        }
        table.set_header(headers);

        for entry in &self.entries {
            let mut cells: Vec<Cell> = vec![Cell::new(&entry.name), Cell::new(&entry.unit)];
            for adapter in &self.adapters {
                let shown = entry
                    .metric(adapter)
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| Metric::Disabled.to_string());
                cells.push(Cell::new(shown).set_alignment(CellAlignment::Right));
            }
            table.add_row(cells);
        }

        table.to_string()
    }

    /// Nested `scenario -> backend -> metric` object.
    ///
    /// Values keep full precision; every sentinel becomes `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();

        for entry in &self.entries {
            let mut backends = serde_json::Map::new();
            for (adapter, metric) in &entry.metrics {
                backends.insert(adapter.clone(), metric_to_json(metric));
            }
            obj.insert(entry.name.clone(), serde_json::Value::Object(backends));
        }

        serde_json::Value::Object(obj)
    }

    /// Pretty-printed JSON rendering.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }
}

fn metric_to_json(metric: &Metric) -> serde_json::Value {
    metric
        .value()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}
