//! Client-side recurrence expansion.
//!
//! Expands a template appointment plus a repetition rule into a bounded,
//! chronologically ordered list of concrete payloads. Expansion is pure:
//! an invalid rule is rejected before any occurrence is generated, and
//! output never exceeds [`MAX_OCCURRENCES`] regardless of rule inputs.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::MAX_OCCURRENCES;
use crate::error::{OpcalError, OpcalResult};
use crate::record::AppointmentDraft;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// How a series ends. Exactly one mode; `Count` is additionally bounded
/// by the hard cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    Count(u32),
    Until(DateTime<Utc>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub freq: Frequency,
    /// Step width in units of `freq`; must be at least 1.
    pub interval: u32,
    pub termination: Termination,
    /// Weekdays the series fires on, 0 = Sunday .. 6 = Saturday. Only
    /// meaningful for weekly frequency; empty defaults to the template's
    /// own weekday.
    #[serde(default)]
    pub by_weekday: BTreeSet<u8>,
}

impl RecurrenceRule {
    /// Reject contract violations before any occurrence is generated.
    pub fn validate(&self) -> OpcalResult<()> {
        if self.interval < 1 {
            return Err(OpcalError::Validation(
                "Recurrence interval must be at least 1".into(),
            ));
        }
        if let Termination::Count(count) = self.termination {
            if count < 1 || count as usize > MAX_OCCURRENCES {
                return Err(OpcalError::Validation(format!(
                    "Recurrence count must be between 1 and {MAX_OCCURRENCES}"
                )));
            }
        }
        if let Some(&wd) = self.by_weekday.iter().find(|&&wd| wd > 6) {
            return Err(OpcalError::Validation(format!(
                "Invalid weekday {wd} in recurrence rule (expected 0-6)"
            )));
        }
        Ok(())
    }

    fn limit(&self) -> usize {
        match self.termination {
            Termination::Count(count) => (count as usize).min(MAX_OCCURRENCES),
            Termination::Until(_) => MAX_OCCURRENCES,
        }
    }
}

/// Expand a template into concrete occurrence payloads.
///
/// Every occurrence preserves the template's time-of-day and duration.
/// Weekly rules enumerate matching weekdays in ascending weekday order
/// within each interval window before advancing, so earlier weekdays
/// always precede later ones in the same week. Monthly stepping clamps
/// the day-of-month to the last valid day of the target month, always
/// relative to the template's own day.
pub fn expand(
    template: &AppointmentDraft,
    rule: &RecurrenceRule,
) -> OpcalResult<Vec<AppointmentDraft>> {
    rule.validate()?;

    let start_date = template.start_at.date_naive();
    let time_of_day = template.start_at.time();

    let occurrences = match rule.freq {
        Frequency::Daily => step_daily(start_date, time_of_day, rule),
        Frequency::Weekly => step_weekly(start_date, time_of_day, rule),
        Frequency::Monthly => step_monthly(start_date, time_of_day, rule),
    };

    let duration = template.duration();
    Ok(occurrences
        .into_iter()
        .map(|start_at| AppointmentDraft {
            start_at,
            end_at: duration.map(|d| start_at + d),
            ..template.clone()
        })
        .collect())
}

fn occurrence_at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    date.and_time(time).and_utc()
}

fn step_daily(start: NaiveDate, time: NaiveTime, rule: &RecurrenceRule) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    for i in 0..rule.limit() {
        let date = start + Duration::days(i as i64 * rule.interval as i64);
        let occ = occurrence_at(date, time);
        if past_until(occ, rule) {
            break;
        }
        out.push(occ);
    }
    out
}

fn step_weekly(start: NaiveDate, time: NaiveTime, rule: &RecurrenceRule) -> Vec<DateTime<Utc>> {
    // Empty set defaults to the template's own weekday
    let weekdays: BTreeSet<u8> = if rule.by_weekday.is_empty() {
        BTreeSet::from([start.weekday().num_days_from_sunday() as u8])
    } else {
        rule.by_weekday.clone()
    };

    let template_start = occurrence_at(start, time);
    let week_start = start - Duration::days(start.weekday().num_days_from_sunday() as i64);

    let mut out = Vec::new();
    // Each window past the first contributes at least one occurrence, so
    // MAX_OCCURRENCES windows always suffice before a break fires.
    'windows: for window in 0..=MAX_OCCURRENCES {
        let window_start = week_start + Duration::days(window as i64 * rule.interval as i64 * 7);
        if past_until(occurrence_at(window_start, time), rule) {
            break;
        }
        // BTreeSet iteration gives the ascending-weekday tie-break
        for &wd in &weekdays {
            let occ = occurrence_at(window_start + Duration::days(wd as i64), time);
            if occ < template_start {
                continue;
            }
            if past_until(occ, rule) || out.len() >= rule.limit() {
                break 'windows;
            }
            out.push(occ);
        }
        if out.len() >= rule.limit() {
            break;
        }
    }
    out
}

fn step_monthly(start: NaiveDate, time: NaiveTime, rule: &RecurrenceRule) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    for i in 0..rule.limit() {
        // checked_add_months clamps day-of-month to the target month's
        // last valid day; stepping from the template keeps the original
        // day for months long enough to hold it.
        let Some(months) = (i as u32).checked_mul(rule.interval) else {
            break;
        };
        let Some(date) = start.checked_add_months(Months::new(months)) else {
            break;
        };
        let occ = occurrence_at(date, time);
        if past_until(occ, rule) {
            break;
        }
        out.push(occ);
    }
    out
}

fn past_until(occ: DateTime<Utc>, rule: &RecurrenceRule) -> bool {
    match rule.termination {
        Termination::Until(until) => occ > until,
        Termination::Count(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn template(start: DateTime<Utc>, minutes: i64) -> AppointmentDraft {
        AppointmentDraft {
            title: "Standing visit".into(),
            description: None,
            location: None,
            start_at: start,
            end_at: Some(start + Duration::minutes(minutes)),
            all_day: false,
            color: None,
        }
    }

    fn rule(freq: Frequency, interval: u32, termination: Termination) -> RecurrenceRule {
        RecurrenceRule {
            freq,
            interval,
            termination,
            by_weekday: BTreeSet::new(),
        }
    }

    #[test]
    fn test_invalid_interval_rejected_before_output() {
        let t = template(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(), 30);
        let r = rule(Frequency::Daily, 0, Termination::Count(5));
        assert!(matches!(expand(&t, &r), Err(OpcalError::Validation(_))));
    }

    #[test]
    fn test_count_out_of_range_rejected() {
        let t = template(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(), 30);
        assert!(expand(&t, &rule(Frequency::Daily, 1, Termination::Count(0))).is_err());
        assert!(expand(&t, &rule(Frequency::Daily, 1, Termination::Count(366))).is_err());
    }

    #[test]
    fn test_output_never_exceeds_cap() {
        let t = template(Utc.with_ymd_and_hms(2026, 1, 1, 8, 0, 0).unwrap(), 15);
        let far_future = Utc.with_ymd_and_hms(2036, 1, 1, 0, 0, 0).unwrap();
        let out = expand(&t, &rule(Frequency::Daily, 1, Termination::Until(far_future))).unwrap();
        assert_eq!(out.len(), MAX_OCCURRENCES);
    }

    #[test]
    fn test_count_mode_respects_count() {
        let t = template(Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(), 30);
        let out = expand(&t, &rule(Frequency::Daily, 2, Termination::Count(7))).unwrap();
        assert_eq!(out.len(), 7);
        assert_eq!(out[1].start_at - out[0].start_at, Duration::days(2));
    }

    #[test]
    fn test_until_mode_stops_at_boundary() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let t = template(start, 30);
        // Until exactly the third occurrence: it is included, the fourth is not
        let until = start + Duration::days(2);
        let out = expand(&t, &rule(Frequency::Daily, 1, Termination::Until(until))).unwrap();
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_weekly_determinism_from_midweek_start() {
        // 2026-03-04 is a Wednesday
        let start = Utc.with_ymd_and_hms(2026, 3, 4, 10, 0, 0).unwrap();
        let t = template(start, 30);
        let r = RecurrenceRule {
            freq: Frequency::Weekly,
            interval: 1,
            termination: Termination::Count(6),
            by_weekday: BTreeSet::from([1, 3, 5]), // Mon, Wed, Fri
        };
        let out = expand(&t, &r).unwrap();
        assert_eq!(out.len(), 6);

        // Strictly increasing chronological order
        for pair in out.windows(2) {
            assert!(pair[0].start_at < pair[1].start_at);
        }

        // First week contributes Wed, Fri (Monday is before the template);
        // the next week contributes Mon, Wed, Fri in that order.
        let weekdays: Vec<chrono::Weekday> =
            out.iter().map(|o| o.start_at.weekday()).collect();
        use chrono::Weekday::*;
        assert_eq!(weekdays, vec![Wed, Fri, Mon, Wed, Fri, Mon]);

        // Time-of-day preserved on every occurrence
        assert!(out.iter().all(|o| o.start_at.time() == start.time()));
    }

    #[test]
    fn test_weekly_empty_set_defaults_to_template_weekday() {
        // 2026-03-02 is a Monday
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let t = template(start, 30);
        let out = expand(&t, &rule(Frequency::Weekly, 1, Termination::Count(3))).unwrap();
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|o| o.start_at.weekday() == chrono::Weekday::Mon));
        assert_eq!(out[0].start_at, start);
        assert_eq!(out[2].start_at, start + Duration::weeks(2));
    }

    #[test]
    fn test_weekly_interval_skips_whole_weeks() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let out = expand(
            &template(start, 30),
            &rule(Frequency::Weekly, 2, Termination::Count(3)),
        )
        .unwrap();
        assert_eq!(out[1].start_at - out[0].start_at, Duration::weeks(2));
    }

    #[test]
    fn test_monthly_clamps_day_of_month() {
        // Template on the 31st of January
        let start = Utc.with_ymd_and_hms(2026, 1, 31, 14, 0, 0).unwrap();
        let out = expand(
            &template(start, 60),
            &rule(Frequency::Monthly, 1, Termination::Count(3)),
        )
        .unwrap();

        let dates: Vec<NaiveDate> = out.iter().map(|o| o.start_at.date_naive()).collect();
        assert_eq!(dates[0], NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(dates[1], NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        // March is long enough again: back to the template's own day
        assert_eq!(dates[2], NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    }

    #[test]
    fn test_expansion_preserves_duration() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let out = expand(
            &template(start, 45),
            &rule(Frequency::Daily, 1, Termination::Count(4)),
        )
        .unwrap();
        for occ in &out {
            assert_eq!(occ.end_at.unwrap() - occ.start_at, Duration::minutes(45));
        }
    }

    #[test]
    fn test_monday_wednesday_series_scenario() {
        // 2026-03-02 is a Monday; weekly Mon+Wed, count 4, 09:00 for 30 min
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let t = template(start, 30);
        let r = RecurrenceRule {
            freq: Frequency::Weekly,
            interval: 1,
            termination: Termination::Count(4),
            by_weekday: BTreeSet::from([1, 3]),
        };
        let out = expand(&t, &r).unwrap();
        assert_eq!(out.len(), 4);

        let expected = [
            Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 4, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 9, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 3, 11, 9, 0, 0).unwrap(),
        ];
        for (occ, want) in out.iter().zip(expected) {
            assert_eq!(occ.start_at, want);
            assert_eq!(occ.end_at.unwrap(), want + Duration::minutes(30));
        }
    }
}
