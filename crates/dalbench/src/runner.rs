//! Trial runner and metric aggregation.

use std::fmt;
use std::io::Write;
use std::time::Duration;

use crate::adapter::Tuning;
use crate::context::ExecutionContext;
use crate::dispatch::dispatch;
use crate::error::{Error, Result};
use crate::probe::ProbedAdapter;
use crate::report::ReportEntry;
use crate::scenario::Scenario;

const LABEL_WIDTH: usize = 8;
const CELL_WIDTH: usize = 18;

/// How a scenario's trials are summarized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Mean elapsed milliseconds per trial.
    Mean,
    /// Mean rows per second per trial.
    Throughput,
}

impl Aggregation {
    /// Unit of the aggregated value.
    pub fn unit(&self) -> &'static str {
        match self {
            Aggregation::Mean => "ms",
            Aggregation::Throughput => "rows/s",
        }
    }

    /// Value of one trial in this aggregation's unit.
    ///
    /// Returns `None` for a zero-duration throughput trial.
    pub fn trial_value(&self, elapsed: Duration, rows: usize) -> Option<f64> {
        match self {
            Aggregation::Mean => Some(millis(elapsed)),
            Aggregation::Throughput => {
                let secs = elapsed.as_secs_f64();
                if secs > 0.0 {
                    Some(rows as f64 / secs)
                } else {
                    None
                }
            }
        }
    }

    /// Summarize `trials` over `loops`.
    ///
    /// The divisor is `loops`, not `trials.len()`, so a caller must only pass
    /// complete trial lists.
    pub fn aggregate(&self, trials: &[Duration], loops: usize, rows: usize) -> Metric {
        if loops == 0 {
            return Metric::NoData;
        }

        let mut sum = 0.0;
        for &elapsed in trials {
            match self.trial_value(elapsed, rows) {
                Some(value) => sum += value,
                None => return Metric::Unmeasurable,
            }
        }
        Metric::Value(sum / loops as f64)
    }
}

fn millis(elapsed: Duration) -> f64 {
    elapsed.as_nanos() as f64 / 1_000_000.0
}

/// Aggregated result of one scenario for one backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Metric {
    /// Full-precision aggregate.
    Value(f64),
    /// The backend failed probing and was never dispatched to.
    Disabled,
    /// An operation failed mid-scenario; remaining trials were abandoned.
    Failed,
    /// The scenario ran zero trials.
    NoData,
    /// A throughput trial completed in zero time.
    Unmeasurable,
}

impl Metric {
    pub fn value(&self) -> Option<f64> {
        match self {
            Metric::Value(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Value(v) => write!(f, "{:.2}", v),
            Metric::Disabled => write!(f, "-"),
            Metric::Failed => write!(f, "failed"),
            Metric::NoData => write!(f, "n/a"),
            Metric::Unmeasurable => write!(f, "unmeasurable"),
        }
    }
}

/// Run every trial of `scenario` against the enabled backends.
///
/// Trials run in order and, within a trial, backends run in registration
/// order. One progress row per trial goes to the context's progress sink.
/// A backend whose operation fails is logged and skipped for the rest of the
/// scenario; the others carry on. Disabled backends are never dispatched to.
pub fn run_scenario(ctx: &mut ExecutionContext, scenario: &Scenario) -> Result<ReportEntry> {
    let (registry, out) = ctx.parts();
    let enabled: Vec<&ProbedAdapter> = registry.enabled().collect();

    tracing::info!(
        scenario = %scenario.name,
        kind = %scenario.kind,
        loops = scenario.loops,
        rows = scenario.rows,
        backends = enabled.len(),
        "scenario started"
    );

    if let Some(tuning) = scenario.tuning {
        apply_tuning(&enabled, tuning, &scenario.name);
    }

    writeln!(
        out,
        "{} ({}, {} rows, {})",
        scenario.name,
        scenario.kind,
        scenario.rows,
        scenario.aggregation.unit()
    )?;
    let names: Vec<String> = enabled.iter().map(|a| a.name().to_string()).collect();
    writeln!(out, "{}", progress_line("trial", &names))?;

    let mut trials: Vec<Vec<Duration>> = vec![Vec::with_capacity(scenario.loops); enabled.len()];
    let mut failed = vec![false; enabled.len()];

    for trial in 0..scenario.loops {
        let mut cells = Vec::with_capacity(enabled.len());

        for (i, probed) in enabled.iter().enumerate() {
            if failed[i] {
                cells.push(Metric::Failed.to_string());
                continue;
            }

            match dispatch(scenario.kind, probed.adapter(), scenario.rows) {
                Ok(elapsed) => {
                    let cell = match scenario.aggregation.trial_value(elapsed, scenario.rows) {
                        Some(value) => format!("{:.2}", value),
                        None => Metric::Unmeasurable.to_string(),
                    };
                    cells.push(cell);
                    trials[i].push(elapsed);
                }
                Err(source) => {
                    let err = Error::Operation {
                        scenario: scenario.name.clone(),
                        adapter: probed.name().to_string(),
                        source,
                    };
                    tracing::error!(
                        scenario = %scenario.name,
                        adapter = probed.name(),
                        trial = trial + 1,
                        error = %err,
                        "operation failed, abandoning remaining trials"
                    );
                    failed[i] = true;
                    cells.push(Metric::Failed.to_string());
                }
            }
        }

        writeln!(out, "{}", progress_line(&format!("#{}", trial + 1), &cells))?;
    }

    if let Some(tuning) = scenario.tuning {
        apply_tuning(&enabled, tuning.default_of(), &scenario.name);
    }

    let mut metrics = Vec::with_capacity(registry.len());
    let mut position = 0;
    for probed in registry.iter() {
        let metric = if !probed.is_enabled() {
            Metric::Disabled
        } else {
            let i = position;
            position += 1;
            if failed[i] {
                Metric::Failed
            } else {
                scenario
                    .aggregation
                    .aggregate(&trials[i], scenario.loops, scenario.rows)
            }
        };
        metrics.push((probed.name().to_string(), metric));
    }

    let averages: Vec<String> = metrics
        .iter()
        .filter(|(name, _)| names.contains(name))
        .map(|(_, m)| m.to_string())
        .collect();
    writeln!(out, "{}", progress_line("AVG", &averages))?;
    writeln!(out)?;

    tracing::info!(scenario = %scenario.name, "scenario finished");

    Ok(ReportEntry {
        name: scenario.name.clone(),
        unit: scenario.aggregation.unit().to_string(),
        metrics,
    })
}

fn apply_tuning(enabled: &[&ProbedAdapter], tuning: Tuning, scenario: &str) {
    for probed in enabled {
        match probed.adapter().tune(tuning) {
            Ok(true) => {
                tracing::debug!(scenario, adapter = probed.name(), %tuning, "tuning applied");
            }
            Ok(false) => {}
            Err(e) => {
                tracing::warn!(
                    scenario,
                    adapter = probed.name(),
                    %tuning,
                    error = %e,
                    "tuning failed"
                );
            }
        }
    }
}

fn progress_line(label: &str, cells: &[String]) -> String {
    let mut line = format!("{:<width$}", label, width = LABEL_WIDTH);
    for cell in cells {
        line.push_str(&format!("{:>width$}", cell, width = CELL_WIDTH));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::AdapterCall;
    use crate::dispatch::OperationKind;
    use crate::probe::probe;
    use crate::testing::{RecordingAdapter, SharedStore};
    use std::cell::RefCell;
    use std::io;
    use std::rc::Rc;

    /// Progress sink the test can read back.
    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).into_owned()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_mean_is_sum_over_loops() {
        let trials = [ms(1), ms(2), ms(4)];
        let metric = Aggregation::Mean.aggregate(&trials, 3, 10);
        assert_eq!(metric, Metric::Value((1.0 + 2.0 + 4.0) / 3.0));

        let uneven = [Duration::from_nanos(1_234_567), Duration::from_nanos(7)];
        let expected = (1_234_567.0 / 1_000_000.0 + 7.0 / 1_000_000.0) / 2.0;
        assert_eq!(
            Aggregation::Mean.aggregate(&uneven, 2, 10),
            Metric::Value(expected)
        );
    }

    #[test]
    fn test_throughput_averages_per_trial_rates() {
        let trials = [ms(500), Duration::from_secs(1)];
        let metric = Aggregation::Throughput.aggregate(&trials, 2, 100);
        assert_eq!(metric, Metric::Value((200.0 + 100.0) / 2.0));
    }

    #[test]
    fn test_zero_loops_is_no_data() {
        assert_eq!(Aggregation::Mean.aggregate(&[], 0, 10), Metric::NoData);
        assert_eq!(Aggregation::Throughput.aggregate(&[], 0, 10), Metric::NoData);
        assert_eq!(Metric::NoData.to_string(), "n/a");
    }

    #[test]
    fn test_zero_duration_throughput_is_unmeasurable() {
        let trials = [ms(10), Duration::ZERO];
        let metric = Aggregation::Throughput.aggregate(&trials, 2, 100);
        assert_eq!(metric, Metric::Unmeasurable);
        assert!(metric.value().is_none());

        // Zero time is a valid mean latency.
        assert_eq!(
            Aggregation::Mean.aggregate(&[Duration::ZERO], 1, 100),
            Metric::Value(0.0)
        );
    }

    #[test]
    fn test_aggregation_is_deterministic() {
        let trials = [ms(3), Duration::from_micros(1_501), ms(9)];
        let first = Aggregation::Mean.aggregate(&trials, 3, 5);
        let second = Aggregation::Mean.aggregate(&trials, 3, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn test_metric_display_rounds_only_for_display() {
        let metric = Metric::Value(1.23456);
        assert_eq!(metric.to_string(), "1.23");
        assert_eq!(metric.value(), Some(1.23456));
        assert_eq!(Metric::Disabled.to_string(), "-");
    }

    #[test]
    fn test_disabled_backend_is_never_dispatched() {
        let store = SharedStore::default();
        let (a, a_calls) = RecordingAdapter::new("a", &store).build();
        let (b, b_calls) = RecordingAdapter::new("b", &store).failing_on(AdapterCall::List);
        let mut ctx = ExecutionContext::new(probe(vec![a, b]), "a").with_progress(io::sink());
        a_calls.reset();
        b_calls.reset();

        let scenario = Scenario::new("insert", OperationKind::Insert, 3, 5);
        let entry = run_scenario(&mut ctx, &scenario).unwrap();

        assert_eq!(a_calls.count(AdapterCall::Insert), 15);
        assert_eq!(b_calls.total(), 0);
        assert_eq!(entry.name, "insert");
        assert_eq!(entry.unit, "rows/s");
        assert_eq!(entry.metrics[0].0, "a");
        assert!(matches!(entry.metrics[0].1, Metric::Value(_) | Metric::Unmeasurable));
        assert_eq!(entry.metrics[1], ("b".to_string(), Metric::Disabled));
    }

    #[test]
    fn test_batch_insert_is_one_call_per_trial() {
        let store = SharedStore::default();
        let (a, a_calls) = RecordingAdapter::new("a", &store).build();
        let (b, b_calls) = RecordingAdapter::new("b", &store).build();
        let mut ctx = ExecutionContext::new(probe(vec![a, b]), "a").with_progress(io::sink());
        a_calls.reset();
        b_calls.reset();

        let scenario = Scenario::new("batchInsert", OperationKind::BatchInsert, 2, 100);
        run_scenario(&mut ctx, &scenario).unwrap();

        assert_eq!(a_calls.batch_sizes(), vec![100, 100]);
        assert_eq!(b_calls.batch_sizes(), vec![100, 100]);
        assert_eq!(a_calls.count(AdapterCall::Insert), 0);
        assert_eq!(store.len(), 400);
    }

    #[test]
    fn test_operation_fault_abandons_only_that_backend() {
        let store = SharedStore::default();
        // One successful list is spent by the probe, one by the first trial.
        let (a, a_calls) = RecordingAdapter::new("a", &store)
            .failing_after(AdapterCall::List, 2)
            .build();
        let (b, b_calls) = RecordingAdapter::new("b", &store).build();
        let mut ctx = ExecutionContext::new(probe(vec![a, b]), "b").with_progress(io::sink());

        let scenario = Scenario::new("getList", OperationKind::ListFetch, 4, 0);
        let entry = run_scenario(&mut ctx, &scenario).unwrap();

        // Probe, trial 1, then the failing trial 2; trials 3 and 4 skipped.
        assert_eq!(a_calls.count(AdapterCall::List), 3);
        assert_eq!(b_calls.count(AdapterCall::List), 5);
        assert_eq!(entry.metrics[0].1, Metric::Failed);
        assert!(entry.metrics[1].1.value().is_some());
    }

    #[test]
    fn test_tuning_applied_then_reverted() {
        let store = SharedStore::default();
        let (a, a_calls) = RecordingAdapter::new("a", &store).tunable().build();
        let (b, b_calls) = RecordingAdapter::new("b", &store).build();
        let mut ctx = ExecutionContext::new(probe(vec![a, b]), "a").with_progress(io::sink());

        let scenario = Scenario::new("getList-uncached", OperationKind::ListFetch, 1, 0)
            .with_tuning(Tuning::StatementCache(false));
        run_scenario(&mut ctx, &scenario).unwrap();

        assert_eq!(
            a_calls.tunings(),
            vec![Tuning::StatementCache(false), Tuning::StatementCache(true)]
        );
        assert!(b_calls.tunings().is_empty());
    }

    #[test]
    fn test_progress_has_one_row_per_trial() {
        let store = SharedStore::default();
        let (a, _) = RecordingAdapter::new("a", &store).build();
        let (b, _) = RecordingAdapter::new("b", &store).failing_on(AdapterCall::Delete);
        let captured = Captured::default();
        let mut ctx =
            ExecutionContext::new(probe(vec![a, b]), "a").with_progress(captured.clone());

        let scenario = Scenario::new("getMapList", OperationKind::MapListFetch, 3, 0);
        run_scenario(&mut ctx, &scenario).unwrap();

        let text = captured.text();
        assert!(text.starts_with("getMapList (mapList, 0 rows, ms)"));
        assert!(text.lines().any(|l| l.starts_with("#1")));
        assert!(text.lines().any(|l| l.starts_with("#3")));
        assert!(!text.lines().any(|l| l.starts_with("#4")));
        assert!(text.lines().any(|l| l.starts_with("AVG")));
        // Disabled backends get no progress column.
        let header = text.lines().nth(1).unwrap();
        assert!(header.contains('a'));
        assert!(!header.trim_start_matches("trial").contains('b'));
    }

    #[test]
    fn test_zero_loop_scenario_reports_no_data() {
        let store = SharedStore::default();
        let (a, a_calls) = RecordingAdapter::new("a", &store).build();
        let mut ctx = ExecutionContext::new(probe(vec![a]), "a").with_progress(io::sink());
        a_calls.reset();

        let scenario = Scenario::new("insert", OperationKind::Insert, 0, 5);
        let entry = run_scenario(&mut ctx, &scenario).unwrap();
        assert_eq!(a_calls.total(), 0);
        assert_eq!(entry.metrics[0].1, Metric::NoData);
    }
}
