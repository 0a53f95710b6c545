//! Destinations for finished rows.

use tracing::debug;

use crate::error::SinkError;
use crate::models::record::{GroupedRecords, OrderRecord};

/// Something rows can be appended to, one destination at a time.
pub trait RowSink {
    /// Append one record as a row of `destination`.
    fn append_record(&mut self, row: &OrderRecord, destination: &str) -> Result<(), SinkError>;
}

/// Append every grouped record to its group's destination, in order.
///
/// Stops at the first failure. Returns the number of rows appended.
pub fn dispatch<S: RowSink + ?Sized>(grouped: &GroupedRecords, sink: &mut S) -> Result<usize, SinkError> {
    let mut appended = 0;

    for (destination, record) in grouped.rows() {
        sink.append_record(record, destination)?;
        appended += 1;
    }

    debug!("Dispatched {} rows to {} destinations", appended, grouped.groups.len());
    Ok(appended)
}

/// In-memory sink, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    rows: Vec<(String, OrderRecord)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows appended so far as `(destination, record)`.
    pub fn rows(&self) -> &[(String, OrderRecord)] {
        &self.rows
    }

    /// Rows appended to one destination.
    pub fn rows_for<'a>(&'a self, destination: &'a str) -> impl Iterator<Item = &'a OrderRecord> + 'a {
        self.rows
            .iter()
            .filter(move |(d, _)| d == destination)
            .map(|(_, r)| r)
    }
}

impl RowSink for MemorySink {
    fn append_record(&mut self, row: &OrderRecord, destination: &str) -> Result<(), SinkError> {
        self.rows.push((destination.to_string(), row.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::config::ParserConfig;
    use crate::transcript::TranscriptParser;

    struct FailingSink {
        accept: usize,
    }

    impl RowSink for FailingSink {
        fn append_record(&mut self, _row: &OrderRecord, destination: &str) -> Result<(), SinkError> {
            if self.accept == 0 {
                return Err(SinkError::Rejected {
                    destination: destination.to_string(),
                    reason: "quota exceeded".to_string(),
                });
            }
            self.accept -= 1;
            Ok(())
        }
    }

    fn grouped() -> GroupedRecords {
        let parser = TranscriptParser::from_config(ParserConfig::default()).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        parser.parse_grouped_at("note\nDD1\nGG1\nGG2", today)
    }

    #[test]
    fn test_dispatch_to_memory() {
        let mut sink = MemorySink::new();
        let count = dispatch(&grouped(), &mut sink).unwrap();

        assert_eq!(count, 4);
        let destinations: Vec<&str> = sink.rows().iter().map(|(d, _)| d.as_str()).collect();
        assert_eq!(destinations, vec!["GG", "GG", "DD", "Other"]);
        assert_eq!(sink.rows_for("GG").count(), 2);
        assert_eq!(sink.rows_for("Other").next().unwrap().product, "note");
    }

    #[test]
    fn test_dispatch_stops_on_failure() {
        let mut sink = FailingSink { accept: 1 };
        let err = dispatch(&grouped(), &mut sink).unwrap_err();

        assert!(matches!(err, SinkError::Rejected { ref destination, .. } if destination == "GG"));
    }
}
