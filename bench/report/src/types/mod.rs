pub mod host;
pub mod latency_stats;
pub mod output;
pub mod report_error;
pub mod result_row;
pub mod result_table;
pub mod throughput_stats;
pub mod trial_status;
