pub mod agenda;
pub mod delete;
pub mod inbox;
pub mod move_event;
pub mod new;
pub mod privacy;
pub mod watch;

use anyhow::{Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use opcal_core::time::local_day_start;

/// Parse a date/time argument: `YYYY-MM-DDTHH:MM` as a local time, or a
/// bare `YYYY-MM-DD` as local start of day.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M") {
        use chrono::{Local, TimeZone};
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| anyhow!("'{s}' does not exist in the local timezone"));
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(local_day_start(date));
    }
    Err(anyhow!(
        "Invalid date/time '{s}'. Expected YYYY-MM-DDTHH:MM or YYYY-MM-DD"
    ))
}
