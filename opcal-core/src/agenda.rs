//! Merge, sort, filter, and rollup over loaded entries.
//!
//! Pure functions over the entry set loaded for the visible window. The
//! same input always yields identical output; past-ness and rollups are
//! computed against a caller-supplied instant so a ticking clock can
//! re-derive them.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::entry::{Entry, EntryKind};
use crate::time::{local_day, local_day_end, local_day_start};

/// Text and flag filters applied to the visible window.
#[derive(Debug, Clone)]
pub struct AgendaFilter {
    /// Case-insensitive substring match over title, description,
    /// location, and the raw start value.
    pub query: String,
    pub only_all_day: bool,
    pub only_with_location: bool,
    pub show_activations: bool,
}

impl Default for AgendaFilter {
    fn default() -> Self {
        AgendaFilter {
            query: String::new(),
            only_all_day: false,
            only_with_location: false,
            show_activations: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Rollup counters against the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rollup {
    pub today: usize,
    pub next_seven_days: usize,
    pub next_thirty_days: usize,
}

/// Apply the text query and boolean flags.
pub fn filter(entries: &[Entry], filter: &AgendaFilter) -> Vec<Entry> {
    let query = filter.query.trim().to_lowercase();

    entries
        .iter()
        .filter(|e| filter.show_activations || e.kind != EntryKind::Activation)
        .filter(|e| !filter.only_all_day || e.all_day)
        .filter(|e| !filter.only_with_location || e.location.is_some())
        .filter(|e| query.is_empty() || haystack(e).contains(&query))
        .cloned()
        .collect()
}

fn haystack(entry: &Entry) -> String {
    format!(
        "{} {} {} {}",
        entry.title,
        entry.description.as_deref().unwrap_or_default(),
        entry.location.as_deref().unwrap_or_default(),
        entry.start.raw_text(),
    )
    .to_lowercase()
}

/// Sort a flat list by start instant, direction toggleable.
pub fn sort(mut entries: Vec<Entry>, direction: SortDirection) -> Vec<Entry> {
    entries.sort_by_key(|e| e.start.sort_instant());
    if direction == SortDirection::Descending {
        entries.reverse();
    }
    entries
}

/// Group entries by local calendar day. Within each day, activations
/// surface before timed appointments, then by start instant.
pub fn group_by_day(entries: &[Entry]) -> BTreeMap<NaiveDate, Vec<Entry>> {
    let mut groups: BTreeMap<NaiveDate, Vec<Entry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.day()).or_default().push(entry.clone());
    }
    for group in groups.values_mut() {
        group.sort_by_key(|e| (e.kind != EntryKind::Activation, e.start.sort_instant()));
    }
    groups
}

/// Count entries falling today, in the next 7 days, and in the next 30
/// days, relative to `now`.
pub fn rollup(entries: &[Entry], now: DateTime<Utc>) -> Rollup {
    let today = local_day(now);
    let day_start = local_day_start(today);
    let day_end = local_day_end(today);

    let starts: Vec<DateTime<Utc>> = entries.iter().map(|e| e.start.sort_instant()).collect();

    Rollup {
        today: starts.iter().filter(|&&s| s >= day_start && s < day_end).count(),
        next_seven_days: starts
            .iter()
            .filter(|&&s| s >= now && s < now + Duration::days(7))
            .count(),
        next_thirty_days: starts
            .iter()
            .filter(|&&s| s >= now && s < now + Duration::days(30))
            .count(),
    }
}
