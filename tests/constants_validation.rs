//! Validates that compile-time constants are internally consistent.
#![allow(clippy::assertions_on_constants)]

use winevent_normalize::util::constants::*;

#[test]
fn app_metadata_is_populated() {
    assert!(!APP_NAME.is_empty(), "APP_NAME must not be empty");
    assert!(!APP_VERSION.is_empty(), "APP_VERSION must not be empty");
}

#[test]
fn security_channel_name_matches_windows() {
    assert_eq!(SECURITY_CHANNEL, "Security");
}

#[test]
fn preview_is_bounded() {
    assert!(DIAGNOSTIC_PREVIEW_CHARS >= 64, "Preview too short to be useful");
    assert!(DIAGNOSTIC_PREVIEW_CHARS <= 4096, "Preview too long for a log line");
}

#[test]
fn log_rotation_size_is_reasonable() {
    assert!(MAX_LOG_FILE_SIZE >= 1024 * 1024);
    assert!(MAX_LOG_FILE_SIZE <= 1024 * 1024 * 1024);
    assert!(LOG_FILE_NAME.ends_with(".log"));
}

#[test]
fn env_and_stdin_markers_are_set() {
    assert!(!LOG_DIR_ENV.is_empty());
    assert_eq!(STDIN_PATH, "-");
    assert!(!UNPARSED_DETAILS_KEY.is_empty());
}
