//! Log of applied status changes.

use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{FlightNumber, FlightStatus};

/// One applied status change.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    pub flight: FlightNumber,
    pub status: FlightStatus,
    pub delay_minutes: u32,
    pub reason: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only status history.
#[derive(Debug, Default)]
pub struct StatusHistory {
    records: Vec<StatusRecord>,
}

impl StatusHistory {
    pub fn record(&mut self, record: StatusRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records made on the given UTC day.
    pub fn count_on(&self, day: NaiveDate) -> usize {
        self.records
            .iter()
            .filter(|r| r.recorded_at.date_naive() == day)
            .count()
    }

    /// Records for one flight, oldest first.
    pub fn for_flight(&self, number: &FlightNumber) -> Vec<StatusRecord> {
        self.records
            .iter()
            .filter(|r| &r.flight == number)
            .cloned()
            .collect()
    }
}
