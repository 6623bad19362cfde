//! Timestamp helpers.
//!
//! Event timestamps arrive as the `SystemTime` attribute of `<TimeCreated>`
//! and are resolved best-effort: a value that does not parse is replaced by
//! the current time instead of failing the record.

use chrono::{DateTime, SecondsFormat, Utc};

/// Parse a `SystemTime` attribute value.
///
/// Windows uses RFC 3339 with varying fractional precision:
/// - `2024-01-15T10:23:45.1234567Z`
/// - `2024-01-15T10:23:45.123Z`
/// - `2024-01-15T10:23:45Z`
///
/// Returns `None` for anything else, including a missing zone designator
/// or surrounding whitespace.
pub fn parse_system_time(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Resolve an event timestamp, substituting the current wall-clock time when
/// the value cannot be parsed.
pub fn resolve_system_time(s: &str) -> DateTime<Utc> {
    parse_system_time(s).unwrap_or_else(|| {
        tracing::debug!("Unparsable SystemTime {s:?}, using current time");
        Utc::now()
    })
}

/// Format a timestamp as RFC 3339 with nanosecond precision, the form used
/// in JSON output.
pub fn format_rfc3339(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
