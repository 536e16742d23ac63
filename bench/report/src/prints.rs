use crate::output::{Output, PhaseOutput};
use crate::result_row::ResultRow;
use colored::{Color, ColoredString, Colorize};
use human_repr::HumanCount;
use tracing::info;

impl PhaseOutput {
    pub fn formatted_string(&self, prefix: &str) -> String {
        format!(
            "{prefix}: {} requests, median latency: {:.3} ms, p90 latency: {:.3} ms, \
            p99 latency: {:.3} ms, median throughput: {}/s, p90 throughput: {}/s over {} windows",
            self.latency.count.human_count_bare(),
            self.latency.median_ms,
            self.latency.p90_ms,
            self.latency.p99_ms,
            (self.throughput.median_1s as u64).human_count_bare(),
            (self.throughput.p90_1s as u64).human_count_bare(),
            self.throughput.num_windows,
        )
    }
}

impl Output {
    pub fn print_summary(&self, trial_index: usize) {
        info!(
            "{}",
            self.overall
                .formatted_string(&format!("Trial {trial_index}"))
                .green()
        );
        for (label, phase) in &self.phases {
            info!(
                "{}",
                phase
                    .formatted_string(&format!("Trial {trial_index} [{label}]"))
                    .cyan()
            );
        }
    }
}

impl ResultRow {
    pub fn formatted_string(&self) -> ColoredString {
        let (text, color) = if self.is_completed() {
            (
                format!("Trial {} completed", self.trial_index),
                Color::Green,
            )
        } else {
            (
                format!(
                    "Trial {} failed during {}: {}",
                    self.trial_index,
                    self.failure_phase.as_deref().unwrap_or("unknown phase"),
                    self.failure_reason
                ),
                Color::Red,
            )
        };
        text.color(color)
    }
}
