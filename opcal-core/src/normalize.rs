//! Entry normalization.
//!
//! Converts the two remote record shapes (timed appointments, all-day
//! activations) into the unified [`Entry`] model. Degraded records never
//! raise: a missing id gets a positional placeholder (and the entry is
//! excluded from the mutation-eligible set), an absent or malformed color
//! falls back to a per-kind default, and an unparseable activation date
//! degrades to today.

use chrono::NaiveDate;
use tracing::warn;

use crate::constants::{DEFAULT_ACTIVATION_COLOR, DEFAULT_APPOINTMENT_COLOR};
use crate::entry::{Entry, EntryKind, EntryTime};
use crate::record::{ActivationRecord, AppointmentRecord, RangeSnapshot};
use crate::time::local_day;

/// Normalize a full range snapshot into entries, appointments first.
/// The positional index feeds placeholder ids for records missing one.
pub fn normalize_snapshot(snapshot: &RangeSnapshot) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(snapshot.appointments.len() + snapshot.activations.len());

    for (index, record) in snapshot.appointments.iter().enumerate() {
        entries.push(normalize_appointment(index, record));
    }
    for (index, record) in snapshot.activations.iter().enumerate() {
        entries.push(normalize_activation(index, record));
    }

    entries
}

/// Convert a raw appointment record into an entry.
pub fn normalize_appointment(index: usize, record: &AppointmentRecord) -> Entry {
    let (id, has_id) = id_or_placeholder(record.id.as_deref(), "appointment", index);
    let start = if record.all_day {
        // All-day appointments keep only the calendar day
        EntryTime::Date(local_day(record.start_at))
    } else {
        EntryTime::DateTime(record.start_at)
    };

    Entry {
        kind: EntryKind::Appointment,
        id,
        title: record.title.clone(),
        description: record.description.clone(),
        location: record.location.clone(),
        start,
        end: if record.all_day { None } else { record.end_at },
        all_day: record.all_day,
        color: normalize_color(record.color.as_deref(), DEFAULT_APPOINTMENT_COLOR),
        editable: has_id,
        raw: serde_json::to_value(record).unwrap_or(serde_json::Value::Null),
    }
}

/// Convert a raw activation record into a read-only all-day entry.
///
/// The plain date string is parsed as a calendar date only; no timestamp
/// is ever constructed from it, so rendering cannot shift it across a
/// timezone boundary.
pub fn normalize_activation(index: usize, record: &ActivationRecord) -> Entry {
    let (id, _) = id_or_placeholder(record.id.as_deref(), "activation", index);
    let date = match NaiveDate::parse_from_str(&record.date, "%Y-%m-%d") {
        Ok(d) => d,
        Err(_) => {
            warn!(date = %record.date, "activation carries unparseable date, degrading to today");
            local_day(chrono::Utc::now())
        }
    };

    Entry {
        kind: EntryKind::Activation,
        id,
        title: record.activation.clone(),
        description: record.description.clone(),
        location: None,
        start: EntryTime::Date(date),
        end: None,
        all_day: true,
        color: normalize_color(record.color.as_deref(), DEFAULT_ACTIVATION_COLOR),
        editable: false,
        raw: serde_json::to_value(record).unwrap_or(serde_json::Value::Null),
    }
}

fn id_or_placeholder(id: Option<&str>, kind: &str, index: usize) -> (String, bool) {
    match id {
        Some(id) if !id.trim().is_empty() => (id.to_string(), true),
        _ => (format!("{kind}-{index}"), false),
    }
}

/// Normalize a color value to `#rrggbb`.
///
/// Accepts 6-digit hex with or without the leading `#`, and 3-digit
/// shorthand (`#abc` expands to `#aabbcc`). Anything else yields the
/// fallback.
pub fn normalize_color(raw: Option<&str>, fallback: &str) -> String {
    let Some(raw) = raw else {
        return fallback.to_string();
    };
    let hex = raw.trim().trim_start_matches('#');

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return fallback.to_string();
    }

    match hex.len() {
        6 => format!("#{}", hex.to_ascii_lowercase()),
        3 => {
            let expanded: String = hex
                .chars()
                .flat_map(|c| [c.to_ascii_lowercase(); 2])
                .collect();
            format!("#{expanded}")
        }
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn appointment(id: Option<&str>, color: Option<&str>) -> AppointmentRecord {
        AppointmentRecord {
            id: id.map(String::from),
            title: "Quarterly review".into(),
            description: Some("with notes".into()),
            location: Some("HQ".into()),
            start_at: Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            end_at: Some(Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap()),
            all_day: false,
            color: color.map(String::from),
        }
    }

    #[test]
    fn test_color_expansion_and_fallback() {
        assert_eq!(normalize_color(Some("#3B82F6"), "#000000"), "#3b82f6");
        assert_eq!(normalize_color(Some("3b82f6"), "#000000"), "#3b82f6");
        assert_eq!(normalize_color(Some("#abc"), "#000000"), "#aabbcc");
        assert_eq!(normalize_color(Some("#12345"), "#000000"), "#000000");
        assert_eq!(normalize_color(Some("not-a-color"), "#000000"), "#000000");
        assert_eq!(normalize_color(None, "#000000"), "#000000");
    }

    #[test]
    fn test_missing_id_yields_placeholder_and_blocks_mutation() {
        let entry = normalize_appointment(3, &appointment(None, None));
        assert_eq!(entry.id, "appointment-3");
        assert!(!entry.editable);

        let entry = normalize_appointment(0, &appointment(Some("ap-1"), None));
        assert_eq!(entry.id, "ap-1");
        assert!(entry.editable);
    }

    #[test]
    fn test_activation_keeps_plain_date_without_time() {
        let record = ActivationRecord {
            id: Some("act-1".into()),
            date: "2026-03-02".into(),
            activation: "Go-live".into(),
            description: None,
            color: None,
            experts: vec![],
        };
        let entry = normalize_activation(0, &record);

        assert!(entry.all_day);
        assert!(!entry.editable);
        assert_eq!(
            entry.start,
            EntryTime::Date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
        );
        assert_eq!(entry.color, DEFAULT_ACTIVATION_COLOR);
    }

    #[test]
    fn test_snapshot_normalization_keeps_raw_record() {
        let snapshot = RangeSnapshot {
            appointments: vec![appointment(Some("ap-1"), Some("#fff"))],
            activations: vec![],
        };
        let entries = normalize_snapshot(&snapshot);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].color, "#ffffff");
        assert_eq!(entries[0].raw["title"], "Quarterly review");
    }
}
