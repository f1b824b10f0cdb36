//! Timezone-safe local-time helpers.
//!
//! All-day values are plain `NaiveDate`s and must never be shifted by a
//! timezone offset; these helpers convert between local calendar days and
//! UTC instants at the few places the engine needs an instant (sorting,
//! past-ness, grouping).

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

/// UTC instant at which the given local calendar day begins.
pub fn local_day_start(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    match Local.from_local_datetime(&naive).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        // Midnight skipped by a DST transition: fall back to UTC midnight
        None => naive.and_utc(),
    }
}

/// UTC instant at which the given local calendar day ends (exclusive):
/// the start of the following day.
pub fn local_day_end(date: NaiveDate) -> DateTime<Utc> {
    local_day_start(date + Duration::days(1))
}

/// Local calendar day containing the given instant.
pub fn local_day(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}
