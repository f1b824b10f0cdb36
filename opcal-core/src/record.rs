//! Wire shapes exchanged with the remote system of record.
//!
//! These mirror what the remote range query and mutation endpoints accept
//! and return. The engine never works with them directly after load; the
//! normalizer converts them into [`crate::entry::Entry`] values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timed appointment as returned by the remote range query.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentRecord {
    /// Missing ids happen with partially malformed upstream data; the
    /// normalizer substitutes a positional placeholder.
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
}

/// A read-only all-day activation as returned by the remote range query.
///
/// The date is a plain calendar date string, kept without time-of-day so
/// all-day semantics survive any timezone.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationRecord {
    #[serde(default)]
    pub id: Option<String>,
    /// Plain `YYYY-MM-DD` calendar date.
    pub date: String,
    /// Activation label (the entry title).
    pub activation: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    /// Linked sub-entities, retained opaquely for detail rendering.
    #[serde(default)]
    pub experts: Vec<serde_json::Value>,
}

/// Result of a remote range query over `[from, to)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RangeSnapshot {
    #[serde(default)]
    pub appointments: Vec<AppointmentRecord>,
    #[serde(default)]
    pub activations: Vec<ActivationRecord>,
}

/// Payload for appointment create/update submissions. Same field set as
/// [`AppointmentRecord`] minus the id, which the remote assigns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    pub start_at: DateTime<Utc>,
    #[serde(default)]
    pub end_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub all_day: bool,
    #[serde(default)]
    pub color: Option<String>,
}

impl AppointmentDraft {
    /// Duration between start and end, if an end is set.
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.end_at.map(|end| end - self.start_at)
    }
}

/// A remote-sourced notification inbox item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxRecord {
    pub id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub kind: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appointment_record_tolerates_missing_optionals() {
        let json = r#"{"title": "Visit", "startAt": "2026-03-02T09:00:00Z"}"#;
        let record: AppointmentRecord = serde_json::from_str(json).unwrap();
        assert!(record.id.is_none());
        assert!(record.end_at.is_none());
        assert!(!record.all_day);
    }

    #[test]
    fn test_activation_record_keeps_plain_date_verbatim() {
        let json = r#"{"id": "act-9", "date": "2026-03-02", "activation": "Go-live"}"#;
        let record: ActivationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.date, "2026-03-02");
        assert!(record.experts.is_empty());
    }
}
