use serde::Deserialize;
use std::time::{Duration, Instant};

/// Unit of time a request limit is expressed in.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Millis,
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl TimeUnit {
    /// Length of a single unit.
    pub fn as_duration(self) -> Duration {
        match self {
            TimeUnit::Millis => Duration::from_millis(1),
            TimeUnit::Seconds => Duration::from_secs(1),
            TimeUnit::Minutes => Duration::from_secs(60),
            TimeUnit::Hours => Duration::from_secs(60 * 60),
            TimeUnit::Days => Duration::from_secs(24 * 60 * 60),
        }
    }
}

pub fn now_instant() -> Instant {
    Instant::now()
}

pub fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_unit_durations() {
        assert_eq!(TimeUnit::Millis.as_duration(), Duration::from_millis(1));
        assert_eq!(TimeUnit::Seconds.as_duration(), Duration::from_secs(1));
        assert_eq!(TimeUnit::Minutes.as_duration(), Duration::from_secs(60));
        assert_eq!(TimeUnit::Hours.as_duration(), Duration::from_secs(3600));
        assert_eq!(TimeUnit::Days.as_duration(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_time_unit_deserializes_lowercase() {
        let unit: TimeUnit = serde_json::from_str("\"minutes\"").unwrap();
        assert_eq!(unit, TimeUnit::Minutes);

        assert!(serde_json::from_str::<TimeUnit>("\"fortnights\"").is_err());
    }
}
