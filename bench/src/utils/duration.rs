use humantime::format_duration;
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
    time::Duration,
};

/// A duration that is written and parsed in human readable form (`"10s"`, `"1m 30s"`, `"200ms"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BenchDuration {
    duration: Duration,
}

impl BenchDuration {
    pub const ZERO: BenchDuration = BenchDuration {
        duration: Duration::ZERO,
    };

    pub const fn new(duration: Duration) -> BenchDuration {
        BenchDuration { duration }
    }

    pub const fn from_secs(secs: u64) -> BenchDuration {
        BenchDuration::new(Duration::from_secs(secs))
    }

    pub const fn from_millis(millis: u64) -> BenchDuration {
        BenchDuration::new(Duration::from_millis(millis))
    }

    pub fn as_human_time_string(&self) -> String {
        format!("{}", format_duration(self.duration))
    }

    pub fn as_millis(&self) -> u64 {
        self.duration.as_millis() as u64
    }

    pub fn as_micros(&self) -> u64 {
        self.duration.as_micros() as u64
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.duration.as_secs_f64()
    }

    pub fn get_duration(&self) -> Duration {
        self.duration
    }

    pub fn is_zero(&self) -> bool {
        self.duration.is_zero()
    }
}

impl FromStr for BenchDuration {
    type Err = humantime::DurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = &s.trim().to_lowercase();
        if s == "0" || s == "none" || s == "disabled" {
            Ok(BenchDuration::ZERO)
        } else {
            Ok(BenchDuration::new(humantime::parse_duration(s)?))
        }
    }
}

impl From<Duration> for BenchDuration {
    fn from(duration: Duration) -> Self {
        BenchDuration::new(duration)
    }
}

impl From<BenchDuration> for Duration {
    fn from(value: BenchDuration) -> Self {
        value.duration
    }
}

impl Display for BenchDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.duration.is_zero() {
            return write!(f, "0s");
        }
        write!(f, "{}", self.as_human_time_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let duration: BenchDuration = "1m 30s".parse().unwrap();
        assert_eq!(duration.get_duration(), Duration::from_secs(90));
    }

    #[test]
    fn test_millis_from_str() {
        let duration: BenchDuration = "200ms".parse().unwrap();
        assert_eq!(duration.as_millis(), 200);
    }

    #[test]
    fn test_display() {
        assert_eq!(BenchDuration::from_secs(3661).to_string(), "1h 1m 1s");
        assert_eq!(BenchDuration::ZERO.to_string(), "0s");
    }

    #[test]
    fn test_zero_duration() {
        let duration: BenchDuration = "0".parse().unwrap();
        assert!(duration.is_zero());
    }

    #[test]
    fn test_invalid_duration() {
        let result: Result<BenchDuration, _> = "ten seconds".parse();
        assert!(result.is_err());
    }
}
