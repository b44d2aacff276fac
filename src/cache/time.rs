//! Build-scoped timestamps
//!
//! Every entry written during one build carries the same `cached_at`: the
//! time the build commenced, not a fresh wall-clock read.

use chrono::{DateTime, TimeZone, Utc};

/// Supplies the timestamp stamped on new cache entries
pub trait BuildTimeProvider: Send + Sync {
    /// Milliseconds since the Unix epoch, stable for the whole build
    fn current_time(&self) -> i64;
}

/// Time the current build started, captured once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildCommencedTime {
    started_at: DateTime<Utc>,
}

impl BuildCommencedTime {
    /// Capture the current instant as the build start
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl Default for BuildCommencedTime {
    fn default() -> Self {
        Self::now()
    }
}

impl BuildTimeProvider for BuildCommencedTime {
    fn current_time(&self) -> i64 {
        self.started_at.timestamp_millis()
    }
}

/// Fixed epoch-millis timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedTime(pub i64);

impl BuildTimeProvider for FixedTime {
    fn current_time(&self) -> i64 {
        self.0
    }
}

/// Render epoch millis for humans, falling back to the raw number
pub fn format_millis(millis: i64) -> String {
    match Utc.timestamp_millis_opt(millis).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => millis.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_time_is_stable() {
        let time = BuildCommencedTime::now();
        let first = time.current_time();
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(time.current_time(), first);
    }

    #[test]
    fn build_time_from_instant() {
        let started = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let time = BuildCommencedTime::at(started);
        assert_eq!(time.current_time(), started.timestamp_millis());
        assert_eq!(format_millis(time.current_time()), "2024-03-01 12:00:00");
    }

    #[test]
    fn format_out_of_range_millis() {
        assert_eq!(format_millis(i64::MAX), i64::MAX.to_string());
    }
}
