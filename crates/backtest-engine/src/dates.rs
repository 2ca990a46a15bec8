//! Day-granularity date handling shared by price lookup and metrics.

use chrono::{DateTime, NaiveDate, Utc};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses `YYYY-MM-DD`, an RFC 3339 timestamp, or any string that starts
/// with a `YYYY-MM-DD` prefix. Timestamps with an offset resolve to the UTC day.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    s.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, DATE_FORMAT).ok())
}

pub fn format_date(d: NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

/// Whole days from `start` to `end`, or None if either side is unparsable.
pub fn days_between(start: &str, end: &str) -> Option<i64> {
    Some((parse_date(end)? - parse_date(start)?).num_days())
}
