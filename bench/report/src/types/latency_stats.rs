use crate::utils::round_float;
use serde::{Deserialize, Serialize};

/// Order statistics over the completion latencies of one trial (or one phase of it).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct LatencyStats {
    pub count: u64,
    #[serde(serialize_with = "round_float")]
    pub mean_ms: f64,
    #[serde(serialize_with = "round_float")]
    pub min_ms: f64,
    #[serde(serialize_with = "round_float")]
    pub median_ms: f64,
    #[serde(serialize_with = "round_float")]
    pub p90_ms: f64,
    #[serde(serialize_with = "round_float")]
    pub p95_ms: f64,
    #[serde(serialize_with = "round_float")]
    pub p99_ms: f64,
    #[serde(serialize_with = "round_float")]
    pub max_ms: f64,
}
