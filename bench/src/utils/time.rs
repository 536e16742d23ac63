use chrono::{DateTime, Utc};

/// Wall clock in Unix microseconds, the time base shared with client trace files.
pub fn unix_micros_now() -> u64 {
    Utc::now().timestamp_micros().max(0) as u64
}

pub fn format_unix_micros(micros: u64) -> String {
    DateTime::<Utc>::from_timestamp_micros(micros as i64)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| String::from("unknown"))
}
