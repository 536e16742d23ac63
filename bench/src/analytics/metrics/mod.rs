pub mod latency;
pub mod throughput;
