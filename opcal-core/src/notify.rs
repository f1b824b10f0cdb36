//! Operator-facing notification list.
//!
//! Holds both remote-sourced inbox items and locally generated reminder
//! notifications. Local records never round-trip to the remote; their
//! read state is client-only. Records older than the retention window
//! are pruned on every periodic tick, and the unread count is always
//! derived from the current record set so pruning can never leave a
//! drifting counter behind.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::RETENTION_HOURS;
use crate::record::InboxRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationSource {
    Remote,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub title: String,
    pub message: String,
    pub kind: String,
    pub created_at: DateTime<Utc>,
    pub is_read: bool,
    pub source: NotificationSource,
}

impl From<InboxRecord> for NotificationRecord {
    fn from(record: InboxRecord) -> Self {
        NotificationRecord {
            id: record.id,
            title: record.title,
            message: record.message,
            kind: record.kind,
            created_at: record.created_at,
            is_read: record.is_read,
            source: NotificationSource::Remote,
        }
    }
}

/// In-memory notification list with a 24-hour retention window.
#[derive(Debug, Default)]
pub struct NotificationCenter {
    records: Vec<NotificationRecord>,
}

impl NotificationCenter {
    pub fn new() -> Self {
        NotificationCenter::default()
    }

    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    /// Append a locally generated record (e.g. a fired reminder).
    pub fn push_local(&mut self, record: NotificationRecord) {
        self.records.push(record);
    }

    /// Merge one page of the remote inbox. Records already present (by
    /// id) are updated in place; the remote read state wins for them.
    pub fn ingest_remote(&mut self, page: Vec<InboxRecord>) {
        for incoming in page {
            match self.records.iter_mut().find(|r| r.id == incoming.id) {
                Some(existing) => {
                    existing.is_read = incoming.is_read;
                    existing.title = incoming.title;
                    existing.message = incoming.message;
                }
                None => self.records.push(incoming.into()),
            }
        }
        self.records.sort_by_key(|r| std::cmp::Reverse(r.created_at));
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn mark_all_read(&mut self) {
        for record in &mut self.records {
            record.is_read = true;
        }
    }

    /// Always derived by counting the current set, never incremented.
    pub fn unread_count(&self) -> usize {
        self.records.iter().filter(|r| !r.is_read).count()
    }

    /// Drop records older than the retention window, read or not.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(RETENTION_HOURS);
        self.records.retain(|r| r.created_at > cutoff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn local_record(id: &str, created_at: DateTime<Utc>, is_read: bool) -> NotificationRecord {
        NotificationRecord {
            id: id.into(),
            title: "Upcoming appointment".into(),
            message: "Visit in 15 minutes".into(),
            kind: "reminder".into(),
            created_at,
            is_read,
            source: NotificationSource::Local,
        }
    }

    #[test]
    fn test_retention_prunes_at_24_hour_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let mut center = NotificationCenter::new();
        center.push_local(local_record("n-25h", now - Duration::hours(25), true));
        center.push_local(local_record("n-23h", now - Duration::hours(23), false));

        center.prune(now);

        let ids: Vec<&str> = center.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["n-23h"]);
    }

    #[test]
    fn test_unread_count_is_derived_after_prune() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let mut center = NotificationCenter::new();
        center.push_local(local_record("old-unread", now - Duration::hours(30), false));
        center.push_local(local_record("fresh-unread", now - Duration::hours(1), false));
        center.push_local(local_record("fresh-read", now - Duration::hours(2), true));

        assert_eq!(center.unread_count(), 2);
        center.prune(now);
        assert_eq!(center.unread_count(), 1);
    }

    #[test]
    fn test_ingest_remote_deduplicates_by_id() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let mut center = NotificationCenter::new();
        let inbox = |is_read| InboxRecord {
            id: "r-1".into(),
            title: "New lead assigned".into(),
            message: "Check the pipeline".into(),
            kind: "lead".into(),
            created_at: now,
            is_read,
        };

        center.ingest_remote(vec![inbox(false)]);
        assert_eq!(center.unread_count(), 1);

        // Re-ingesting the same id updates in place; remote read state wins
        center.ingest_remote(vec![inbox(true)]);
        assert_eq!(center.records().len(), 1);
        assert_eq!(center.unread_count(), 0);
    }

    #[test]
    fn test_mark_read_and_mark_all_read() {
        let now = Utc.with_ymd_and_hms(2026, 3, 2, 12, 0, 0).unwrap();
        let mut center = NotificationCenter::new();
        center.push_local(local_record("a", now, false));
        center.push_local(local_record("b", now, false));

        assert!(center.mark_read("a"));
        assert!(!center.mark_read("missing"));
        assert_eq!(center.unread_count(), 1);

        center.mark_all_read();
        assert_eq!(center.unread_count(), 0);
    }
}
