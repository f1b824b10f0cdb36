//! Visible date window for range queries.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::constants::DEFAULT_WINDOW_DAYS;
use crate::time::{local_day_end, local_day_start};

/// Half-open window `[from, to)` of entries visible to the operator.
#[derive(Debug, Clone, PartialEq)]
pub struct DateRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl Default for DateRange {
    /// Default window: ±DEFAULT_WINDOW_DAYS around now.
    fn default() -> Self {
        let now = Utc::now();
        DateRange {
            from: now - Duration::days(DEFAULT_WINDOW_DAYS),
            to: now + Duration::days(DEFAULT_WINDOW_DAYS),
        }
    }
}

impl DateRange {
    /// Parse `YYYY-MM-DD` bounds into a window. `from` starts at local
    /// start of day, `to` extends through the named day (exclusive end at
    /// the following local midnight). Missing bounds fall back to the
    /// default window edge.
    pub fn from_args(from: Option<&str>, to: Option<&str>) -> Result<Self, String> {
        let default = DateRange::default();

        let from = match from {
            Some(s) => local_day_start(parse_date(s)?),
            None => default.from,
        };
        let to = match to {
            Some(s) => local_day_end(parse_date(s)?),
            None => default.to,
        };

        if to <= from {
            return Err("Window end must come after window start".into());
        }

        Ok(DateRange { from, to })
    }

    pub fn from_rfc3339(&self) -> String {
        self.from.to_rfc3339()
    }

    pub fn to_rfc3339(&self) -> String {
        self.to.to_rfc3339()
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at < self.to
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_args_parses_inclusive_day_window() {
        let range = DateRange::from_args(Some("2026-03-02"), Some("2026-03-08")).unwrap();
        let inside = local_day_start(NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        let outside = local_day_end(NaiveDate::from_ymd_opt(2026, 3, 8).unwrap());
        assert!(range.contains(inside));
        assert!(!range.contains(outside));
    }

    #[test]
    fn test_inverted_window_rejected() {
        assert!(DateRange::from_args(Some("2026-03-08"), Some("2026-03-02")).is_err());
    }

    #[test]
    fn test_bad_date_rejected() {
        assert!(DateRange::from_args(Some("03/02/2026"), None).is_err());
    }
}
