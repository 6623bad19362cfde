//! Field resolution rules.
//!
//! Rendered fields come from the Windows localisation layer and are missing
//! whenever the provider's message metadata is not installed on the host
//! that produced the XML. Each rule below prefers the rendered value and
//! falls back to the raw one.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::core::event_record::EventRecord;
use crate::util::time::resolve_system_time;

/// Severity of a normalized log entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Default,
    Info,
    Warn,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Severity::Default => "default",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Resolve severity from the rendered level name, falling back to the raw
/// numeric level when no rendered name is available.
pub fn resolve_severity(rendered_level: &str, level: &str) -> Severity {
    match rendered_level {
        "" => severity_from_level(level),
        "Critical" => Severity::Fatal,
        "Error" => Severity::Error,
        "Warning" => Severity::Warn,
        "Information" => Severity::Info,
        _ => Severity::Default,
    }
}

/// Map a raw ETW level number to a severity.
///
/// `0` (LogAlways) and `5` (Verbose) have no counterpart and map to
/// [`Severity::Default`].
pub fn severity_from_level(level: &str) -> Severity {
    match level {
        "1" => Severity::Fatal,
        "2" => Severity::Error,
        "3" => Severity::Warn,
        "4" => Severity::Info,
        _ => Severity::Default,
    }
}

/// Prefer a non-empty rendered string, otherwise the raw one.
pub fn rendered_or_raw<'a>(rendered: &'a str, raw: &'a str) -> &'a str {
    if rendered.is_empty() {
        raw
    } else {
        rendered
    }
}

/// Prefer rendered keywords whenever the rendering carried a keyword list,
/// even an empty one.
pub fn resolve_keywords<'a>(rendered: Option<&'a [String]>, raw: &'a [String]) -> &'a [String] {
    rendered.unwrap_or(raw)
}

impl EventRecord {
    /// Event creation time, or the current time if `SystemTime` is missing
    /// or malformed.
    pub fn timestamp(&self) -> DateTime<Utc> {
        resolve_system_time(&self.time_created)
    }

    /// Severity after the rendered/raw level fallback.
    pub fn severity(&self) -> Severity {
        resolve_severity(&self.rendered_level, &self.level)
    }

    /// Level text after fallback (e.g. `"Warning"` or `"3"`).
    pub fn resolved_level(&self) -> &str {
        rendered_or_raw(&self.rendered_level, &self.level)
    }

    pub fn resolved_task(&self) -> &str {
        rendered_or_raw(&self.rendered_task, &self.task)
    }

    pub fn resolved_opcode(&self) -> &str {
        rendered_or_raw(&self.rendered_opcode, &self.opcode)
    }

    pub fn resolved_keywords(&self) -> &[String] {
        resolve_keywords(self.rendered_keywords.as_deref(), &self.keywords)
    }
}
