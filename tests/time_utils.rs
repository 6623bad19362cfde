//! Integration tests for time utilities.

use chrono::{TimeZone, Utc};
use winevent_normalize::util::time::{format_rfc3339, parse_system_time, resolve_system_time};

#[test]
fn parse_windows_precision() {
    let dt = parse_system_time("2022-09-22T07:49:32.0356778Z").unwrap();
    assert_eq!(
        format_rfc3339(&dt),
        "2022-09-22T07:49:32.035677800Z"
    );
}

#[test]
fn parse_whole_seconds() {
    let dt = parse_system_time("2024-06-15T14:30:00Z").unwrap();
    assert_eq!(dt, Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap());
}

#[test]
fn parse_padded_value_returns_none() {
    assert!(parse_system_time("  2024-06-15T14:30:00Z  ").is_none());
    assert!(parse_system_time("2024-06-15T14:30:00Z ").is_none());
}

#[test]
fn parse_invalid_returns_none() {
    assert!(parse_system_time("not-a-date").is_none());
    assert!(parse_system_time("2024-13-40T00:00:00Z").is_none());
}

#[test]
fn resolve_invalid_is_now() {
    let before = Utc::now();
    let ts = resolve_system_time("garbage");
    let after = Utc::now();
    assert!(ts >= before && ts <= after, "Expected now, got {ts}");
}

#[test]
fn format_whole_seconds_has_no_fraction() {
    let ts = Utc.with_ymd_and_hms(2024, 6, 15, 14, 30, 0).unwrap();
    assert_eq!(format_rfc3339(&ts), "2024-06-15T14:30:00Z");
}
