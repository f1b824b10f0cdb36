//! Unified calendar entry model.
//!
//! An `Entry` is the in-memory representation of either an editable timed
//! appointment or a read-only all-day activation. The two remote record
//! shapes are converted into this one type by the normalizer; all merging,
//! filtering, and reminder logic works exclusively with it.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::time::{local_day, local_day_end, local_day_start};

/// Which source an entry came from. Determines mutability: only
/// appointments accept create/update/delete/move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Appointment,
    Activation,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Appointment => write!(f, "appointment"),
            EntryKind::Activation => write!(f, "activation"),
        }
    }
}

/// Start value of an entry: a full timestamp for appointments, a plain
/// calendar date for all-day activations. The `Date` variant never
/// carries a time-of-day, so rendering can never apply a timezone shift
/// to an all-day item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntryTime {
    DateTime(DateTime<Utc>),
    Date(NaiveDate),
}

impl EntryTime {
    /// UTC instant used for chronological ordering. Plain dates sort at
    /// their local start-of-day.
    pub fn sort_instant(&self) -> DateTime<Utc> {
        match self {
            EntryTime::DateTime(dt) => *dt,
            EntryTime::Date(d) => local_day_start(*d),
        }
    }

    /// Raw textual form of the start value, as text filters see it.
    pub fn raw_text(&self) -> String {
        match self {
            EntryTime::DateTime(dt) => dt.to_rfc3339(),
            EntryTime::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

/// A unified calendar item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub kind: EntryKind,
    /// Opaque, source-scoped identifier.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: EntryTime,
    /// Appointments only; activations never carry an end.
    pub end: Option<DateTime<Utc>>,
    pub all_day: bool,
    /// Always a valid `#rrggbb` value (defaults applied by the normalizer).
    pub color: String,
    /// Whether mutations may target this entry. False for activations and
    /// for degraded records carrying a synthetic placeholder id.
    pub editable: bool,
    /// The original source record, retained opaquely for detail rendering.
    pub raw: serde_json::Value,
}

impl Entry {
    /// Identity key, unique within a loaded window.
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }

    /// Local calendar day this entry belongs to (grouping key).
    pub fn day(&self) -> NaiveDate {
        match &self.start {
            EntryTime::DateTime(dt) => local_day(*dt),
            EntryTime::Date(d) => *d,
        }
    }

    /// Whether this entry lies in the past relative to `now`.
    ///
    /// Derived on every call, never cached: all-day entries are past once
    /// their local end-of-day has elapsed; timed entries once their end
    /// (or start, if no end) has elapsed.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        match &self.start {
            EntryTime::Date(d) => now >= local_day_end(*d),
            EntryTime::DateTime(start) => {
                let boundary = self.end.unwrap_or(*start);
                now > boundary
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn all_day_entry(date: NaiveDate) -> Entry {
        Entry {
            kind: EntryKind::Activation,
            id: "a1".into(),
            title: "Site activation".into(),
            description: None,
            location: None,
            start: EntryTime::Date(date),
            end: None,
            all_day: true,
            color: "#f59e0b".into(),
            editable: false,
            raw: serde_json::Value::Null,
        }
    }

    #[test]
    fn test_all_day_past_boundary_at_local_midnight() {
        let date = NaiveDate::from_ymd_opt(2026, 5, 10).unwrap();
        let entry = all_day_entry(date);

        // 23:59:59 local on the entry's day: not past yet
        let just_before = local_day_end(date) - Duration::seconds(1);
        assert!(!entry.is_past(just_before));

        // 00:00:00 local the next day: past
        assert!(entry.is_past(local_day_end(date)));
    }

    #[test]
    fn test_timed_entry_past_uses_end_then_start() {
        let start = Utc.with_ymd_and_hms(2026, 5, 10, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 5, 10, 9, 30, 0).unwrap();

        let mut entry = all_day_entry(NaiveDate::from_ymd_opt(2026, 5, 10).unwrap());
        entry.kind = EntryKind::Appointment;
        entry.all_day = false;
        entry.start = EntryTime::DateTime(start);
        entry.end = Some(end);

        assert!(!entry.is_past(end));
        assert!(entry.is_past(end + Duration::seconds(1)));

        entry.end = None;
        assert!(!entry.is_past(start));
        assert!(entry.is_past(start + Duration::seconds(1)));
    }

    #[test]
    fn test_key_combines_kind_and_id() {
        let entry = all_day_entry(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
        assert_eq!(entry.key(), "activation:a1");
    }
}
