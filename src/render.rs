//! Colored terminal rendering for opcal types.

use chrono::{Local, NaiveDate};
use opcal_core::agenda::Rollup;
use opcal_core::entry::{Entry, EntryKind, EntryTime};
use opcal_core::notify::NotificationRecord;
use owo_colors::OwoColorize;

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Mar 4")
pub fn date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// One agenda line for an entry. Privacy mode masks the title.
pub fn entry_line(entry: &Entry, privacy: bool) -> String {
    let time = match &entry.start {
        EntryTime::Date(_) => "all-day".to_string(),
        EntryTime::DateTime(dt) => format!("{:>7}", dt.with_timezone(&Local).format("%H:%M")),
    };
    let title = if privacy {
        mask(&entry.title)
    } else {
        entry.title.clone()
    };
    let tag = match entry.kind {
        EntryKind::Activation => format!(" {}", "[activation]".dimmed()),
        EntryKind::Appointment => String::new(),
    };
    let location = entry
        .location
        .as_deref()
        .map(|l| format!(" @ {}", l.dimmed()))
        .unwrap_or_default();

    format!("  {} {}{}{}", time.cyan(), title, location, tag)
}

pub fn rollup_line(rollup: &Rollup) -> String {
    format!(
        "{} today · {} next 7 days · {} next 30 days",
        rollup.today.bold(),
        rollup.next_seven_days.bold(),
        rollup.next_thirty_days.bold(),
    )
}

pub fn notification_line(record: &NotificationRecord, privacy: bool) -> String {
    let message = if privacy {
        mask(&record.message)
    } else {
        record.message.clone()
    };
    let stamp = record.created_at.with_timezone(&Local).format("%H:%M");
    format!("{} {} {}", stamp.dimmed(), record.title.bold(), message)
}

pub(crate) fn mask(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => format!("{first}···"),
        None => "···".to_string(),
    }
}
