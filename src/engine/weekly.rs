//! Weekly result aggregation.
//!
//! Buckets a flat list of daily market results into Monday-to-Sunday
//! weeks, splits each day's open and close draws into digits, and orders
//! the weeks most recent first.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::api::ResultEntry;
use crate::types::{DayResult, WeeklyBucket, PLACEHOLDER};

/// Date layouts seen in result payloads, tried in order.
const DATE_FORMATS: [&str; 2] = ["%d-%m-%Y", "%Y-%m-%d"];
const NAIVE_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S"];
const SLASH_FORMAT: &str = "%d/%m/%Y";

/// Display format of the week key.
const KEY_FORMAT: &str = "%d-%m-%Y";

/// Aggregated chart for one market.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklyChart {
    /// Most recent week first.
    pub weeks: Vec<WeeklyBucket>,
    /// Entries dropped for an unparseable date.
    pub skipped: usize,
}

impl WeeklyChart {
    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn week(&self, key: &str) -> Option<&WeeklyBucket> {
        self.weeks.iter().find(|w| w.week_key == key)
    }
}

/// Parse a result date. Returns `None` when no known layout matches.
pub fn parse_result_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NAIVE_DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(s, SLASH_FORMAT).ok())
}

/// The Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    // Sunday is 0, so Sunday steps back six days.
    let back = (date.weekday().num_days_from_sunday() + 6) % 7;
    date - Duration::days(back as i64)
}

/// "DD-MM-YYYY to DD-MM-YYYY" for the week starting `monday`.
pub fn week_key(monday: NaiveDate) -> String {
    let sunday = monday + Duration::days(6);
    format!("{} to {}", monday.format(KEY_FORMAT), sunday.format(KEY_FORMAT))
}

/// Split a draw into exactly three characters, padding with the placeholder.
pub fn split_digits(draw: Option<&str>) -> [char; 3] {
    let mut out = [PLACEHOLDER; 3];
    if let Some(s) = draw {
        for (slot, c) in out.iter_mut().zip(s.trim().chars()) {
            *slot = c;
        }
    }
    out
}

fn day_result(entry: &ResultEntry) -> DayResult {
    let jodi = entry
        .jodi_result
        .as_deref()
        .filter(|j| !j.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| PLACEHOLDER.to_string());

    DayResult {
        open_digits: split_digits(entry.open_number.as_deref()),
        jodi,
        close_digits: split_digits(entry.close_number.as_deref()),
    }
}

/// Build the weekly chart. Entries with bad dates are logged and skipped;
/// a later entry for the same date replaces an earlier one.
pub fn aggregate(entries: &[ResultEntry]) -> WeeklyChart {
    let mut buckets: HashMap<NaiveDate, WeeklyBucket> = HashMap::new();
    let mut skipped = 0usize;

    for entry in entries {
        let Some(date) = parse_result_date(&entry.date) else {
            warn!(date = %entry.date, "Invalid result date, skipping entry");
            skipped += 1;
            continue;
        };

        let monday = week_start(date);
        buckets
            .entry(monday)
            .or_insert_with(|| WeeklyBucket::new(week_key(monday), monday))
            .set_day(date.weekday(), day_result(entry));
    }

    let mut weeks: Vec<WeeklyBucket> = buckets.into_values().collect();
    weeks.sort_by(|a, b| b.week_start.cmp(&a.week_start));

    debug!(
        entries = entries.len(),
        weeks = weeks.len(),
        skipped,
        "Weekly chart aggregated"
    );

    WeeklyChart { weeks, skipped }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
