use chrono::{DateTime, SecondsFormat, Utc};

/// Source of timestamps for likes and matches.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// RFC 3339 with microseconds, the format stored in the database. It
    /// sorts lexically in time order.
    fn timestamp(&self) -> String {
        self.now().to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_sort_in_time_order() {
        let early = FixedClock(Utc.with_ymd_and_hms(2025, 1, 9, 8, 0, 0).unwrap());
        let late = FixedClock(Utc.with_ymd_and_hms(2025, 1, 10, 7, 0, 0).unwrap());
        assert!(early.timestamp() < late.timestamp());
        assert_eq!(early.timestamp(), "2025-01-09T08:00:00.000000Z");
    }
}
