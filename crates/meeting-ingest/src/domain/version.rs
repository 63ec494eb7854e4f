//! Version and timestamp normalization.

use chrono::{DateTime, Utc};

/// Dot a compact numeric version code.
///
/// Three digits become `d.d.d`, four become `d.dd.d`. Anything else,
/// including non-digit input, is returned unchanged.
///
/// ```
/// use meeting_ingest::format_version;
///
/// assert_eq!(format_version("123"), "1.2.3");
/// assert_eq!(format_version("1234"), "1.23.4");
/// assert_eq!(format_version("12"), "12");
/// ```
pub fn format_version(raw: &str) -> String {
    let s = raw.trim();
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return raw.to_string();
    }
    match s.len() {
        3 => format!("{}.{}.{}", &s[..1], &s[1..2], &s[2..]),
        4 => format!("{}.{}.{}", &s[..1], &s[1..3], &s[3..]),
        _ => raw.to_string(),
    }
}

/// Meeting instant for a raw timestamp holding integer Unix seconds.
///
/// Anything else, including out-of-range values, yields `None`.
pub fn parse_meeting_time(raw: &str) -> Option<DateTime<Utc>> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
}
