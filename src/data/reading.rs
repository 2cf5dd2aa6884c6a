//! A single validated sensor sample.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One validated (timestamp, value) sample.
///
/// The timestamp records arrival time, not measurement time, so a
/// sequence of readings appended in order always carries non-decreasing
/// timestamps. The value is guaranteed finite by the ingestion layer;
/// nothing constructs a `Reading` from an unparsed payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    /// Wall-clock capture time.
    pub timestamp: DateTime<Utc>,
    /// The scalar measurement.
    pub value: f64,
}

impl Reading {
    /// Create a reading with an explicit timestamp.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Create a reading stamped with the current wall-clock time.
    pub fn now(value: f64) -> Self {
        Self::new(Utc::now(), value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_stamps_current_time() {
        let before = Utc::now();
        let reading = Reading::now(21.5);
        let after = Utc::now();

        assert!(reading.timestamp >= before);
        assert!(reading.timestamp <= after);
        assert_eq!(reading.value, 21.5);
    }

    #[test]
    fn serializes_with_rfc3339_timestamp() {
        let reading = Reading::now(1.0);
        let json = serde_json::to_value(reading).unwrap();

        assert!(json["timestamp"].is_string());
        assert_eq!(json["value"], 1.0);
    }
}
