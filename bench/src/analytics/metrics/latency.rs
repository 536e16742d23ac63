use crate::analytics::statistics::{mean, median, percentile, sort_ascending};
use crate::bench_error::BenchError;
use paxos_bench_report::latency_stats::LatencyStats;

/// Latency statistics in milliseconds. No samples is an error, never a zero.
pub fn from_latencies(mut latencies_ms: Vec<f64>) -> Result<LatencyStats, BenchError> {
    if latencies_ms.is_empty() {
        return Err(BenchError::InsufficientDataError(
            "no completed requests to compute latency from".to_owned(),
        ));
    }
    sort_ascending(&mut latencies_ms);
    let sorted = &latencies_ms;
    let rank = |p: f64| percentile(sorted, p).unwrap_or_default();

    Ok(LatencyStats {
        count: sorted.len() as u64,
        mean_ms: mean(sorted).unwrap_or_default(),
        min_ms: sorted[0],
        median_ms: median(sorted).unwrap_or_default(),
        p90_ms: rank(90.0),
        p95_ms: rank(95.0),
        p99_ms: rank(99.0),
        max_ms: sorted[sorted.len() - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_compute_rank_statistics() {
        let stats = from_latencies(vec![40.0, 10.0, 50.0, 30.0, 20.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_eq!(stats.median_ms, 30.0);
        assert_eq!(stats.p90_ms, 50.0);
        assert_eq!(stats.min_ms, 10.0);
        assert_eq!(stats.max_ms, 50.0);
        assert_eq!(stats.mean_ms, 30.0);
    }

    #[test]
    fn empty_latencies_should_be_insufficient_data() {
        assert!(matches!(
            from_latencies(Vec::new()),
            Err(BenchError::InsufficientDataError(_))
        ));
    }
}
