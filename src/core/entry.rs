//! Log entry envelope.
//!
//! The resolved timestamp and severity travel next to the body rather than
//! inside it, the way a log pipeline record carries them.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::core::message::InterpreterRegistry;
use crate::core::resolve::Severity;
use crate::core::xml_parser::decode;
use crate::util::error::Result;
use crate::util::time::format_rfc3339;

/// One normalized event, ready for a downstream consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub body: Map<String, Value>,
}

fn serialize_timestamp<S>(ts: &DateTime<Utc>, s: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_str(&format_rfc3339(ts))
}

/// Decode one event document and normalize it into a [`LogEntry`].
///
/// # Errors
/// Returns a [`DecodeError`](crate::util::error::DecodeError) only when the
/// document is not well-formed XML (or a numeric field is not a number).
/// Every other gap is filled by fallback.
pub fn normalize(xml: &[u8], interpreters: &InterpreterRegistry) -> Result<LogEntry> {
    let record = decode(xml)?;
    Ok(LogEntry {
        timestamp: record.timestamp(),
        severity: record.severity(),
        body: record.to_body(interpreters),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_serialises_lowercase_severity() {
        let entry = LogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 15, 10, 23, 45).unwrap(),
            severity: Severity::Warn,
            body: Map::new(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            r#"{"timestamp":"2024-01-15T10:23:45Z","severity":"warn","body":{}}"#
        );
    }

    #[test]
    fn test_normalize_resolves_envelope() {
        let xml = br#"<Event><System><Level>2</Level><TimeCreated SystemTime="2024-01-15T10:23:45.5Z"/></System></Event>"#;
        let entry = normalize(xml, &InterpreterRegistry::default()).unwrap();
        assert_eq!(entry.severity, Severity::Error);
        assert_eq!(
            entry.timestamp,
            Utc.with_ymd_and_hms(2024, 1, 15, 10, 23, 45).unwrap()
                + chrono::Duration::milliseconds(500)
        );
        assert_eq!(entry.body["level"], "2");
    }
}
