use crate::utils::round_float;
use serde::{Deserialize, Serialize};

/// Percentiles over per-window completion counts, one sample per 1 second window.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ThroughputStats {
    pub num_windows: u64,
    #[serde(serialize_with = "round_float")]
    pub mean_1s: f64,
    #[serde(serialize_with = "round_float")]
    pub min_1s: f64,
    #[serde(serialize_with = "round_float")]
    pub median_1s: f64,
    #[serde(serialize_with = "round_float")]
    pub p90_1s: f64,
    #[serde(serialize_with = "round_float")]
    pub p99_1s: f64,
    #[serde(serialize_with = "round_float")]
    pub max_1s: f64,
}
