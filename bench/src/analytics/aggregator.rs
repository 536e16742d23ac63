use super::metrics::{latency, throughput};
use crate::bench_error::BenchError;
use crate::orchestrator::trace::{CompletionEvent, RawTrace};
use crate::orchestrator::MeasurementWindow;
use paxos_bench_report::output::{Output, PhaseOutput};
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_THROUGHPUT_WINDOW: Duration = Duration::from_secs(1);

/// Turns the raw completion traces of one trial into latency and windowed throughput
/// statistics.
#[derive(Debug, Clone, Copy)]
pub struct MetricsAggregator {
    window: Duration,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self {
            window: DEFAULT_THROUGHPUT_WINDOW,
        }
    }
}

impl MetricsAggregator {
    /// Statistics over the completions carrying `label`, or over all of them for `None`.
    /// Only completions inside the measurement window count, for latency and throughput alike.
    pub fn aggregate(
        &self,
        trace: &RawTrace,
        measurement: &MeasurementWindow,
        label: Option<&str>,
    ) -> Result<PhaseOutput, BenchError> {
        let stream = label.unwrap_or("all");
        let start = measurement.start_unix_micros;
        let end = start.saturating_add(measurement.duration.as_micros() as u64);
        let measured: Vec<&CompletionEvent> = trace
            .filter_label(label)
            .filter(|event| (start..end).contains(&event.completion_time_us))
            .collect();
        if measured.is_empty() {
            return Err(BenchError::InsufficientDataError(format!(
                "trace has no completions for {stream} inside the measurement window"
            )));
        }
        let latency =
            latency::from_latencies(measured.iter().map(|event| event.latency_ms()).collect())?;

        let counts = throughput::window_counts(
            measured.iter().map(|event| event.completion_time_us),
            start,
            measurement.duration,
            self.window,
        );
        debug!("Window counts for {stream}: {counts:?}");
        let throughput = throughput::from_window_counts(&counts, self.window)?;
        Ok(PhaseOutput::new(latency, throughput))
    }

    /// Overall statistics plus one entry per phase label. A phase without enough data is left
    /// out; the overall stream must have enough data for the trial to succeed.
    pub fn summarize(
        &self,
        trace: &RawTrace,
        measurement: &MeasurementWindow,
        phase_labels: &[&str],
    ) -> Result<Output, BenchError> {
        let mut output = Output::new(self.aggregate(trace, measurement, None)?);
        for label in phase_labels {
            match self.aggregate(trace, measurement, Some(*label)) {
                Ok(phase) => output = output.with_phase(label, phase),
                Err(BenchError::InsufficientDataError(reason)) => {
                    warn!("Skipping phase '{label}': {reason}");
                }
                Err(error) => return Err(error),
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: u64 = 1_000_000_000;
    const SECOND_US: u64 = 1_000_000;

    fn event(id: u64, completion_offset_us: u64, latency_us: u64, label: &str) -> CompletionEvent {
        let completion_time_us = START + completion_offset_us;
        CompletionEvent {
            request_id: id,
            issue_time_us: completion_time_us - latency_us,
            completion_time_us,
            label: Some(label.to_owned()),
        }
    }

    fn measurement() -> MeasurementWindow {
        MeasurementWindow {
            start_unix_micros: START,
            duration: Duration::from_secs(5),
        }
    }

    #[test]
    fn empty_trace_should_be_insufficient_data() {
        let result =
            MetricsAggregator::default().summarize(&RawTrace::default(), &measurement(), &[]);
        assert!(matches!(result, Err(BenchError::InsufficientDataError(_))));
    }

    #[test]
    fn phases_should_be_split_by_label() {
        let mut events = Vec::new();
        let mut id = 0;
        for second in 0..5 {
            for _ in 0..4 {
                id += 1;
                events.push(event(id, second * SECOND_US + 10, 2_000, "read"));
            }
            id += 1;
            events.push(event(id, second * SECOND_US + 20, 8_000, "write"));
        }
        let trace = RawTrace::new(events);

        let output = MetricsAggregator::default()
            .summarize(&trace, &measurement(), &["read", "write"])
            .unwrap();

        assert_eq!(output.overall.latency.count, 25);
        assert_eq!(output.overall.throughput.median_1s, 5.0);
        assert_eq!(output.phase("read").unwrap().latency.median_ms, 2.0);
        assert_eq!(output.phase("write").unwrap().latency.median_ms, 8.0);
        assert_eq!(output.phase("write").unwrap().throughput.median_1s, 1.0);
    }

    #[test]
    fn phase_without_data_should_be_skipped() {
        let events = (0..5)
            .map(|second| event(second + 1, second * SECOND_US, 1_000, "read"))
            .collect();
        let output = MetricsAggregator::default()
            .summarize(&RawTrace::new(events), &measurement(), &["read", "write"])
            .unwrap();
        assert!(output.phase("read").is_some());
        assert!(output.phase("write").is_none());
    }

    #[test]
    fn completions_outside_measurement_should_not_count_towards_latency() {
        let mut events: Vec<CompletionEvent> = (0..5)
            .map(|second| event(second + 1, second * SECOND_US + 10, 2_000, "read"))
            .collect();
        let warmup_completion = CompletionEvent {
            request_id: 100,
            issue_time_us: START - 500_000,
            completion_time_us: START - 100_000,
            label: Some("read".to_owned()),
        };
        events.push(warmup_completion);
        events.push(event(101, 5 * SECOND_US, 400_000, "read"));

        let output = MetricsAggregator::default()
            .summarize(&RawTrace::new(events), &measurement(), &[])
            .unwrap();

        assert_eq!(output.overall.latency.count, 5);
        assert_eq!(output.overall.latency.max_ms, 2.0);
    }
}
