use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Offset-carrying forms RFC 3339 does not cover: minutes-only times and
/// basic offsets (`+0000`). `%#z` also takes `Z` and `+00`.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%d %H:%M%#z",
];

/// Forms without an offset, read as UTC.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO-8601 timestamp into UTC.
///
/// Accepted forms, tried in order:
/// - RFC 3339 with `Z` or a numeric offset (`2025-06-08T10:45:35.123Z`)
/// - other offset forms: no seconds (`2025-06-08T10:45Z`) or a basic
///   offset (`2025-06-08T10:45:35+0000`)
/// - naive date-time without offset, read as UTC (`2025-06-08T10:45:35`,
///   `2025-06-08T10:45`)
/// - bare calendar date, read as midnight UTC (`2025-06-08`)
///
/// Returns `None` for anything else.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// UTC calendar date of a timestamp, if it parses.
pub fn utc_date(raw: &str) -> Option<NaiveDate> {
    parse_utc(raw).map(|dt| dt.date_naive())
}
