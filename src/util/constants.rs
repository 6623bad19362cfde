//! Application-wide constants.
//!
//! Schema names, channel names and logging defaults live here so the
//! decoder and the binary agree on them.

/// Application display name used in log lines.
pub const APP_NAME: &str = "winevent-normalize";

/// Application version string.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Channel whose messages get the structured Security interpretation.
pub const SECURITY_CHANNEL: &str = "Security";

/// Number of characters of the offending document kept when a decode
/// failure is logged. The full document stays available on the error.
pub const DIAGNOSTIC_PREVIEW_CHARS: usize = 256;

/// Key under which the Security interpreter collects lines it could not
/// attach to any key.
pub const UNPARSED_DETAILS_KEY: &str = "unparsed";

/// Environment variable naming a directory for the persistent debug log.
/// When unset, logging goes to stderr only.
pub const LOG_DIR_ENV: &str = "WINEVENT_NORMALIZE_LOG_DIR";

/// Log file name for persistent debug logging.
pub const LOG_FILE_NAME: &str = "winevent-normalize.log";

/// Maximum log file size in bytes before rotation (5 MB).
pub const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Path argument meaning "read the document from stdin".
pub const STDIN_PATH: &str = "-";
