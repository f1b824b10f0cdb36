//! Optimistic mutation coordination against the remote system of record.
//!
//! The coordinator owns the entry set loaded for the visible window and
//! applies local create/update/move/delete immediately, then submits to
//! the remote. Reconciliation is reload-to-reconcile by contract: when a
//! submission fails after an optimistic local change, the coordinator
//! reloads the current window so the next visible state equals ground
//! truth rather than the rejected guess.

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, warn};

use crate::constants::CREATE_BATCH_SIZE;
use crate::entry::{Entry, EntryKind, EntryTime};
use crate::error::{OpcalError, OpcalResult};
use crate::normalize::{normalize_appointment, normalize_snapshot};
use crate::range::DateRange;
use crate::record::AppointmentDraft;
use crate::recurrence::{self, RecurrenceRule};
use crate::remote::RemoteCalendar;
use crate::time::local_day;

/// Result of a mutation attempt.
#[derive(Debug)]
pub enum MutationOutcome {
    Applied(Entry),
    /// The target was not mutation-eligible (read-only kind or synthetic
    /// id). By contract this is a silent no-op, never an error.
    Ignored,
}

pub struct Coordinator<R: RemoteCalendar> {
    remote: R,
    range: DateRange,
    entries: Vec<Entry>,
}

impl<R: RemoteCalendar> Coordinator<R> {
    pub fn new(remote: R) -> Self {
        Coordinator {
            remote,
            range: DateRange::default(),
            entries: Vec::new(),
        }
    }

    /// Entries currently loaded for the visible window.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    /// Load a window from the remote, replacing the entry set.
    pub async fn load(&mut self, range: DateRange) -> OpcalResult<&[Entry]> {
        let snapshot = self.remote.range_query(&range).await?;
        self.entries = normalize_snapshot(&snapshot);
        self.range = range;
        Ok(&self.entries)
    }

    /// Re-run the last range query; the remote result overwrites any
    /// optimistic local state.
    pub async fn reload(&mut self) -> OpcalResult<()> {
        let snapshot = self.remote.range_query(&self.range).await?;
        self.entries = normalize_snapshot(&snapshot);
        Ok(())
    }

    /// Create a single appointment. Validation rejects synchronously
    /// before anything is submitted. Unlike update and delete, create
    /// is submit-then-insert rather than optimistic: the entry's id is
    /// remote-assigned, so only the confirmed record enters the local
    /// set. A failed submission therefore leaves nothing to reconcile.
    pub async fn create(&mut self, draft: AppointmentDraft) -> OpcalResult<Entry> {
        validate_draft(&draft)?;
        let record = self.remote.create_appointment(&draft).await?;
        let entry = normalize_appointment(self.entries.len(), &record);
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Expand a recurring series client-side and submit the occurrences
    /// as discrete creates, in fixed-size batches of concurrent requests.
    ///
    /// The next batch only starts once the previous one has fully
    /// settled. If any submission fails, the in-flight batch still
    /// settles, already-created occurrences are kept (no partial
    /// rollback), and the first failure is surfaced; the caller
    /// reconciles via [`Coordinator::reload`].
    pub async fn create_recurring(
        &mut self,
        template: AppointmentDraft,
        rule: &RecurrenceRule,
    ) -> OpcalResult<Vec<Entry>> {
        validate_draft(&template)?;
        let payloads = recurrence::expand(&template, rule)?;
        debug!(occurrences = payloads.len(), "submitting recurring series");

        let mut created = Vec::new();
        let mut first_failure = None;

        let remote = &self.remote;
        for batch in payloads.chunks(CREATE_BATCH_SIZE) {
            let results = join_all(batch.iter().map(|p| remote.create_appointment(p))).await;
            for result in results {
                match result {
                    Ok(record) => created.push(record),
                    Err(e) => {
                        if first_failure.is_none() {
                            first_failure = Some(e);
                        }
                    }
                }
            }
            if first_failure.is_some() {
                break;
            }
        }

        let mut entries = Vec::with_capacity(created.len());
        for record in &created {
            let entry = normalize_appointment(self.entries.len(), record);
            self.entries.push(entry.clone());
            entries.push(entry);
        }

        match first_failure {
            Some(e) => {
                warn!(created = entries.len(), "recurring create failed partway: {e}");
                Err(e)
            }
            None => Ok(entries),
        }
    }

    /// Replace an appointment's fields. Optimistic: the local entry is
    /// rewritten before submission.
    pub async fn update(
        &mut self,
        key: &str,
        draft: AppointmentDraft,
    ) -> OpcalResult<MutationOutcome> {
        validate_draft(&draft)?;
        let Some(index) = self.editable_index(key) else {
            return Ok(MutationOutcome::Ignored);
        };

        let id = self.entries[index].id.clone();
        apply_draft(&mut self.entries[index], &draft);

        match self.remote.update_appointment(&id, &draft).await {
            Ok(record) => {
                let entry = normalize_appointment(index, &record);
                self.entries[index] = entry.clone();
                Ok(MutationOutcome::Applied(entry))
            }
            Err(e) => self.reconcile_after_failure(e).await,
        }
    }

    /// Move (drag/resize) an appointment to new start/end/allDay values.
    /// The new times are visible locally before the remote confirms; a
    /// rejected submission triggers a full window reload.
    pub async fn move_entry(
        &mut self,
        key: &str,
        start_at: DateTime<Utc>,
        end_at: Option<DateTime<Utc>>,
        all_day: bool,
    ) -> OpcalResult<MutationOutcome> {
        if let Some(end) = end_at {
            if end < start_at {
                return Err(OpcalError::Validation("End must not precede start".into()));
            }
        }
        let Some(index) = self.editable_index(key) else {
            return Ok(MutationOutcome::Ignored);
        };

        let entry = &self.entries[index];
        let draft = AppointmentDraft {
            title: entry.title.clone(),
            description: entry.description.clone(),
            location: entry.location.clone(),
            start_at,
            end_at,
            all_day,
            color: Some(entry.color.clone()),
        };
        let id = entry.id.clone();
        apply_draft(&mut self.entries[index], &draft);

        match self.remote.update_appointment(&id, &draft).await {
            Ok(record) => {
                let entry = normalize_appointment(index, &record);
                self.entries[index] = entry.clone();
                Ok(MutationOutcome::Applied(entry))
            }
            Err(e) => self.reconcile_after_failure(e).await,
        }
    }

    /// Delete an appointment. The local entry disappears immediately; a
    /// failed submission restores ground truth via reload.
    pub async fn delete(&mut self, key: &str) -> OpcalResult<MutationOutcome> {
        let Some(index) = self.editable_index(key) else {
            return Ok(MutationOutcome::Ignored);
        };

        let entry = self.entries.remove(index);
        match self.remote.delete_appointment(&entry.id).await {
            Ok(()) => Ok(MutationOutcome::Applied(entry)),
            Err(e) => self.reconcile_after_failure(e).await,
        }
    }

    /// Index of a mutation-eligible appointment matching the key (either
    /// the `kind:id` identity key or the bare id).
    fn editable_index(&self, key: &str) -> Option<usize> {
        let index = self
            .entries
            .iter()
            .position(|e| e.key() == key || e.id == key)?;
        let entry = &self.entries[index];
        if entry.kind != EntryKind::Appointment || !entry.editable {
            debug!(key, kind = %entry.kind, "ignoring mutation on non-editable entry");
            return None;
        }
        Some(index)
    }

    async fn reconcile_after_failure(&mut self, failure: OpcalError) -> OpcalResult<MutationOutcome> {
        if let Err(reload_err) = self.reload().await {
            warn!("reload after failed mutation also failed: {reload_err}");
        }
        Err(failure)
    }
}

fn validate_draft(draft: &AppointmentDraft) -> OpcalResult<()> {
    if draft.title.trim().is_empty() {
        return Err(OpcalError::Validation("Title must not be empty".into()));
    }
    if let Some(end) = draft.end_at {
        if end < draft.start_at {
            return Err(OpcalError::Validation("End must not precede start".into()));
        }
    }
    Ok(())
}

fn apply_draft(entry: &mut Entry, draft: &AppointmentDraft) {
    entry.title = draft.title.clone();
    entry.description = draft.description.clone();
    entry.location = draft.location.clone();
    entry.all_day = draft.all_day;
    if draft.all_day {
        entry.start = EntryTime::Date(local_day(draft.start_at));
        entry.end = None;
    } else {
        entry.start = EntryTime::DateTime(draft.start_at);
        entry.end = draft.end_at;
    }
}
