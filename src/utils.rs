//! Text normalization and timestamp helpers shared by the section parsers.
//!
//! This module provides:
//! - Whitespace collapsing for titles and teasers
//! - Char-boundary-safe truncation for log previews
//! - ISO-8601 timestamp parsing that attaches the reference timezone to
//!   offset-less values

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveDateTime, TimeDelta, TimeZone};
use chrono_tz::Tz;
use itertools::Itertools;

/// Collapse every run of whitespace into a single space and trim both ends.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  Kurs\n  złotego \t rośnie "), "Kurs złotego rośnie");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (never inside a UTF-8
/// sequence) with an ellipsis and a count of the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Formats carrying an explicit UTC offset, tried after RFC 3339.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
];

/// Offset-less formats; values matching these are wall-clock time in the
/// reference timezone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp into the reference timezone.
///
/// Values with an offset (`+01:00`, `Z`) are converted to `tz`; values
/// without one are read as wall-clock time in `tz` (never UTC). A bare date
/// is taken as local midnight.
///
/// Returns `None` when the input matches none of the accepted shapes.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Option<DateTime<Tz>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::<FixedOffset>::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&tz));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(localize(naive, tz));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| localize(naive, tz))
}

/// Attach `tz` to a wall-clock time.
///
/// An ambiguous time (autumn fall-back hour) resolves to the standard-time
/// reading, i.e. the later instant. A time inside the spring-forward gap is
/// moved forward by one hour.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> DateTime<Tz> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt,
        LocalResult::Ambiguous(_, later) => later,
        LocalResult::None => {
            let shifted = naive + TimeDelta::hours(1);
            tz.from_local_datetime(&shifted)
                .latest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        }
    }
}
