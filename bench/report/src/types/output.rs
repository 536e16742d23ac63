use super::latency_stats::LatencyStats;
use super::result_row::flatten_into;
use super::throughput_stats::ThroughputStats;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Latency and windowed throughput of one logical stream of completions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default, derive_new::new)]
pub struct PhaseOutput {
    pub latency: LatencyStats,
    pub throughput: ThroughputStats,
}

/// Summary of a completed trial: statistics over every completion plus one entry per workload
/// phase label (e.g. `read` and `write`) found in the trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Output {
    pub overall: PhaseOutput,
    #[serde(default)]
    pub phases: BTreeMap<String, PhaseOutput>,
}

impl Output {
    pub fn new(overall: PhaseOutput) -> Self {
        Self {
            overall,
            phases: BTreeMap::new(),
        }
    }

    pub fn with_phase(mut self, label: &str, output: PhaseOutput) -> Self {
        self.phases.insert(label.to_owned(), output);
        self
    }

    pub fn phase(&self, label: &str) -> Option<&PhaseOutput> {
        self.phases.get(label)
    }

    /// Flattens the output into dotted column names: `latency.median_ms`,
    /// `throughput.p90_1s`, `read.latency.median_ms`, ...
    pub fn columns(&self) -> Map<String, Value> {
        let mut columns = Map::new();
        let overall = serde_json::to_value(self.overall).unwrap_or(Value::Null);
        flatten_into("", &overall, &mut columns);
        for (label, phase) in &self.phases {
            let phase = serde_json::to_value(phase).unwrap_or(Value::Null);
            flatten_into(label, &phase, &mut columns);
        }
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(median_ms: f64, p90_1s: f64) -> PhaseOutput {
        PhaseOutput::new(
            LatencyStats {
                count: 10,
                median_ms,
                ..Default::default()
            },
            ThroughputStats {
                num_windows: 3,
                p90_1s,
                ..Default::default()
            },
        )
    }

    #[test]
    fn columns_should_flatten_overall_and_phases() {
        let output = Output::new(phase(1.5, 100.0))
            .with_phase("read", phase(1.0, 80.0))
            .with_phase("write", phase(2.0, 20.0));

        let columns = output.columns();

        assert_eq!(columns["latency.median_ms"], Value::from(1.5));
        assert_eq!(columns["throughput.p90_1s"], Value::from(100.0));
        assert_eq!(columns["read.latency.median_ms"], Value::from(1.0));
        assert_eq!(columns["write.throughput.p90_1s"], Value::from(20.0));
        assert!(!columns.contains_key("phases"));
    }
}
