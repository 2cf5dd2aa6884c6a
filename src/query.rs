//! Read-only query surface for the dashboard.

use std::sync::Arc;

use chrono::SecondsFormat;
use serde::Serialize;

use crate::data::{History, Reading};

/// One reading in wire form: RFC 3339 timestamp plus value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRecord {
    pub timestamp: String,
    pub value: f64,
}

impl From<Reading> for ReadingRecord {
    fn from(reading: Reading) -> Self {
        Self {
            timestamp: reading
                .timestamp
                .to_rfc3339_opts(SecondsFormat::Secs, true),
            value: reading.value,
        }
    }
}

/// Translates history snapshots into serializable records.
///
/// Holds no state of its own and never fails: an empty history is an
/// empty vector.
#[derive(Debug, Clone)]
pub struct QueryFacade {
    history: Arc<History>,
}

impl QueryFacade {
    pub fn new(history: Arc<History>) -> Self {
        Self { history }
    }

    /// Current history contents, oldest first.
    pub fn latest(&self) -> Vec<ReadingRecord> {
        self.history
            .snapshot()
            .into_iter()
            .map(ReadingRecord::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    #[test]
    fn empty_history_yields_empty_list() {
        let facade = QueryFacade::new(Arc::new(History::new(10)));
        assert!(facade.latest().is_empty());
    }

    #[test]
    fn records_mirror_history_order() {
        let history = Arc::new(History::new(3));
        for value in [1.0, 2.0, 3.0, 4.0] {
            history.append(Reading::now(value));
        }
        let facade = QueryFacade::new(history);

        let records = facade.latest();
        assert_eq!(records.len(), 3);
        let values: Vec<f64> = records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn timestamps_round_trip_as_rfc3339() {
        let history = Arc::new(History::new(10));
        history.append(Reading::now(7.5));
        let facade = QueryFacade::new(history);

        let record = &facade.latest()[0];
        let parsed = DateTime::parse_from_rfc3339(&record.timestamp).unwrap();
        assert!(parsed.timestamp() > 0);
    }

    #[test]
    fn records_serialize_as_two_field_objects() {
        let history = Arc::new(History::new(10));
        history.append(Reading::now(22.5));
        let facade = QueryFacade::new(history);

        let json = serde_json::to_value(facade.latest()).unwrap();
        let first = &json[0];
        assert_eq!(first["value"], 22.5);
        assert!(first["timestamp"].is_string());
        assert_eq!(first.as_object().unwrap().len(), 2);
    }
}
