//! Local reminder scheduling.
//!
//! Arms one-shot timers for configured lead-times ahead of each timed
//! appointment and emits a notification record through an explicit
//! channel sink when one fires. Delivery is at-most-once per
//! (appointment, lead-time) key for the scheduler's lifetime; delivered
//! keys are pruned once their fire time plus the retention window has
//! elapsed. The scheduler never errors to its caller — a misconfigured
//! lead-time list simply yields no reminders.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::constants::{REMINDER_GRACE_SECONDS, RETENTION_HOURS};
use crate::entry::{Entry, EntryKind};
use crate::notify::{NotificationRecord, NotificationSource};

/// Lead-time configuration for reminders.
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// Minutes of lead time before each appointment start; one reminder
    /// per value. Negative values are ignored.
    pub minutes_before: Vec<i64>,
    /// Whether the consuming view may escalate to a platform-level alert.
    /// Delivery through the sink happens either way.
    pub allow_system_alert: bool,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        ReminderConfig {
            minutes_before: vec![15],
            allow_system_alert: false,
        }
    }
}

/// Cancellation handle for one scheduling pass. Owns every timer armed by
/// that pass; `cancel` (or drop) tears them all down atomically, so a
/// wholesale input replacement leaks no timers.
#[derive(Default)]
pub struct ScheduleGuard {
    timers: Vec<JoinHandle<()>>,
}

impl ScheduleGuard {
    pub fn cancel(&mut self) {
        for handle in self.timers.drain(..) {
            handle.abort();
        }
    }

    /// Number of timers still owned (armed or already fired).
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl Drop for ScheduleGuard {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Schedules at-most-once reminders for the current entry set.
///
/// The delivered-key registry lives on the scheduler, so repeated
/// `schedule` calls (the cancel-then-reschedule rebuild the caller
/// performs on every input replacement) never re-deliver a key.
#[derive(Default)]
pub struct ReminderScheduler {
    delivered: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
}

impl ReminderScheduler {
    pub fn new() -> Self {
        ReminderScheduler::default()
    }

    /// Arm timers for every qualifying (entry, lead-time) pair.
    ///
    /// Only timed appointment entries participate. Fire times within the
    /// grace window in the past fire immediately once; older ones are
    /// skipped so stale reminders are never delivered. The caller must
    /// cancel the previous guard before scheduling a replacement entry
    /// set.
    pub fn schedule(
        &self,
        entries: &[Entry],
        sink: &UnboundedSender<NotificationRecord>,
        config: &ReminderConfig,
    ) -> ScheduleGuard {
        let now = Utc::now();
        self.prune_delivered(now);

        let mut guard = ScheduleGuard::default();
        let mut armed: HashSet<String> = HashSet::new();

        for entry in entries {
            if entry.kind != EntryKind::Appointment || entry.all_day {
                continue;
            }
            let start = entry.start.sort_instant();

            for &minutes in &config.minutes_before {
                if minutes < 0 {
                    continue;
                }
                let key = format!("{}:{}", entry.id, minutes);
                if armed.contains(&key) || self.is_delivered(&key) {
                    continue;
                }

                let fire_at = start - Duration::minutes(minutes);
                let overdue = now - fire_at;
                if overdue > Duration::seconds(REMINDER_GRACE_SECONDS) {
                    // Further in the past than the grace window: stale
                    continue;
                }

                armed.insert(key.clone());
                let delay = (fire_at - now).to_std().unwrap_or_default();
                let delivered = Arc::clone(&self.delivered);
                let sink = sink.clone();
                let record = reminder_record(entry, minutes, fire_at);

                guard.timers.push(tokio::spawn(async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let fresh = {
                        let mut delivered = delivered.lock().unwrap();
                        delivered.insert(key.clone(), fire_at).is_none()
                    };
                    if fresh {
                        debug!(key, "reminder fired");
                        let _ = sink.send(record);
                    }
                }));
            }
        }

        guard
    }

    fn is_delivered(&self, key: &str) -> bool {
        self.delivered.lock().unwrap().contains_key(key)
    }

    /// Drop delivered-key state whose fire time plus the retention window
    /// has elapsed; those keys can never be re-armed as live reminders.
    fn prune_delivered(&self, now: DateTime<Utc>) {
        let cutoff = now - Duration::hours(RETENTION_HOURS);
        self.delivered
            .lock()
            .unwrap()
            .retain(|_, fire_at| *fire_at > cutoff);
    }
}

fn reminder_record(entry: &Entry, minutes: i64, fire_at: DateTime<Utc>) -> NotificationRecord {
    NotificationRecord {
        id: format!("reminder:{}:{}", entry.id, minutes),
        title: "Upcoming appointment".into(),
        message: format!("{} starts in {} min", entry.title, minutes),
        kind: "reminder".into(),
        created_at: fire_at,
        is_read: false,
        source: NotificationSource::Local,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryTime;
    use chrono::NaiveDate;
    use tokio::sync::mpsc;

    fn appointment(id: &str, start: DateTime<Utc>) -> Entry {
        Entry {
            kind: EntryKind::Appointment,
            id: id.into(),
            title: "Visit".into(),
            description: None,
            location: None,
            start: EntryTime::DateTime(start),
            end: Some(start + Duration::minutes(30)),
            all_day: false,
            color: "#3b82f6".into(),
            editable: true,
            raw: serde_json::Value::Null,
        }
    }

    fn config(minutes: Vec<i64>) -> ReminderConfig {
        ReminderConfig {
            minutes_before: minutes,
            allow_system_alert: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_reminder_fires_once_per_key_across_reschedules() {
        let scheduler = ReminderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Fire time already passed but within the grace window
        let entries = vec![appointment("ap-1", Utc::now() + Duration::minutes(15))];

        let mut guard = scheduler.schedule(&entries, &tx, &config(vec![15]));
        let first = rx.recv().await.unwrap();
        assert_eq!(first.id, "reminder:ap-1:15");
        assert_eq!(first.source, NotificationSource::Local);

        // Re-render with unchanged data: cancel, schedule again, no re-fire
        guard.cancel();
        let _guard = scheduler.schedule(&entries, &tx, &config(vec![15]));
        tokio::time::sleep(std::time::Duration::from_secs(60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_delivery() {
        let scheduler = ReminderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let entries = vec![appointment("ap-1", Utc::now() + Duration::hours(2))];

        let mut guard = scheduler.schedule(&entries, &tx, &config(vec![15]));
        assert_eq!(guard.len(), 1);
        guard.cancel();

        // Even after the fire time would have elapsed, nothing arrives
        tokio::time::sleep(std::time::Duration::from_secs(3 * 60 * 60)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_fire_times_are_skipped() {
        let scheduler = ReminderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Fire time passed ten minutes ago: beyond the grace window
        let entries = vec![appointment("ap-1", Utc::now() - Duration::minutes(10))];

        let guard = scheduler.schedule(&entries, &tx, &config(vec![0]));
        assert!(guard.is_empty());
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_grace_window_fires_immediately_once() {
        let scheduler = ReminderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        // Start is 14m50s away; the 15-minute lead time elapsed 10s ago
        let entries = vec![appointment(
            "ap-1",
            Utc::now() + Duration::minutes(15) - Duration::seconds(10),
        )];

        let _guard = scheduler.schedule(&entries, &tx, &config(vec![15]));
        assert!(rx.recv().await.is_some());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_day_and_activation_entries_do_not_remind() {
        let scheduler = ReminderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut all_day = appointment("ap-1", Utc::now() + Duration::minutes(5));
        all_day.all_day = true;
        all_day.start = EntryTime::Date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
        let mut activation = appointment("act-1", Utc::now() + Duration::minutes(5));
        activation.kind = EntryKind::Activation;

        let guard = scheduler.schedule(&[all_day, activation], &tx, &config(vec![0]));
        assert!(guard.is_empty());
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_lead_times_degrade_silently() {
        let scheduler = ReminderScheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let entries = vec![appointment("ap-1", Utc::now() + Duration::minutes(5))];

        let guard = scheduler.schedule(&entries, &tx, &config(vec![-5]));
        assert!(guard.is_empty());
        tokio::task::yield_now().await;
        assert!(rx.try_recv().is_err());
    }
}
