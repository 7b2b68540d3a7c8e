//! Backend timestamps.

use chrono::{DateTime, Utc};

/// Backend timestamp: nanoseconds since the Unix epoch.
pub type Time = i64;

/// Converts a backend timestamp to milliseconds since the epoch.
#[must_use]
pub const fn time_to_millis(time: Time) -> i64 {
    time / 1_000_000
}

/// Converts a backend timestamp to a UTC date-time.
#[must_use]
pub fn time_to_datetime(time: Time) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_to_millis() {
        assert_eq!(time_to_millis(1_700_000_000_123_456_789), 1_700_000_000_123);
    }

    #[test]
    fn test_time_to_datetime() {
        let dt = time_to_datetime(1_000_000_000);
        assert_eq!(dt.timestamp(), 1);
    }
}
