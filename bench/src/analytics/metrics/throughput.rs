use crate::analytics::statistics::{mean, median, percentile, sort_ascending};
use crate::bench_error::BenchError;
use paxos_bench_report::throughput_stats::ThroughputStats;
use std::time::Duration;

/// Completions per fixed, non-overlapping window aligned to `start_us`, covering
/// `duration`. Completions outside the measured span are ignored.
pub fn window_counts(
    completion_times_us: impl IntoIterator<Item = u64>,
    start_us: u64,
    duration: Duration,
    window: Duration,
) -> Vec<u64> {
    let window_us = (window.as_micros() as u64).max(1);
    let duration_us = duration.as_micros() as u64;
    let num_windows = duration_us.div_ceil(window_us) as usize;
    let mut counts = vec![0u64; num_windows];
    for completion_us in completion_times_us {
        if completion_us < start_us || completion_us - start_us >= duration_us {
            continue;
        }
        let index = ((completion_us - start_us) / window_us) as usize;
        if let Some(count) = counts.get_mut(index) {
            *count += 1;
        }
    }
    counts
}

/// Statistics over window counts after dropping the first and last window, which are
/// partially ramping up or down. Empty windows are samples too.
pub fn from_window_counts(counts: &[u64], window: Duration) -> Result<ThroughputStats, BenchError> {
    if counts.len() < 3 {
        return Err(BenchError::InsufficientDataError(format!(
            "{} throughput window(s) leave no samples once the first and last are excluded",
            counts.len()
        )));
    }
    let per_second = 1.0 / window.as_secs_f64();
    let mut samples: Vec<f64> = counts[1..counts.len() - 1]
        .iter()
        .map(|count| *count as f64 * per_second)
        .collect();
    sort_ascending(&mut samples);
    let sorted = &samples;
    let rank = |p: f64| percentile(sorted, p).unwrap_or_default();

    Ok(ThroughputStats {
        num_windows: sorted.len() as u64,
        mean_1s: mean(sorted).unwrap_or_default(),
        min_1s: sorted[0],
        median_1s: median(sorted).unwrap_or_default(),
        p90_1s: rank(90.0),
        p99_1s: rank(99.0),
        max_1s: sorted[sorted.len() - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND_US: u64 = 1_000_000;

    #[test]
    fn windows_should_be_aligned_to_measurement_start() {
        let start = 5 * SECOND_US + 123;
        let mut completions = Vec::new();
        completions.extend(std::iter::repeat(start + 500).take(3));
        completions.extend(std::iter::repeat(start + SECOND_US).take(10));
        completions.extend(std::iter::repeat(start + 3 * SECOND_US + 1).take(20));
        completions.push(start - 1);
        completions.push(start + 5 * SECOND_US);

        let counts = window_counts(
            completions,
            start,
            Duration::from_secs(5),
            Duration::from_secs(1),
        );

        assert_eq!(counts, vec![3, 10, 0, 20, 0]);
    }

    #[test]
    fn first_and_last_windows_should_be_excluded() {
        let stats = from_window_counts(&[99, 10, 0, 20, 99], Duration::from_secs(1)).unwrap();
        assert_eq!(stats.num_windows, 3);
        assert_eq!(stats.median_1s, 10.0);
        assert_eq!(stats.min_1s, 0.0);
        assert_eq!(stats.p90_1s, 20.0);
        assert_eq!(stats.max_1s, 20.0);
    }

    #[test]
    fn too_few_windows_should_be_insufficient_data() {
        assert!(matches!(
            from_window_counts(&[5, 5], Duration::from_secs(1)),
            Err(BenchError::InsufficientDataError(_))
        ));
    }
}
