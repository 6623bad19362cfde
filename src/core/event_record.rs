//! Decoded fixed-schema projection of a single Windows Event Log entry.
//!
//! Every field is extracted from the rendered event XML by
//! [`xml_parser::decode`](crate::core::xml_parser::decode). Optional schema
//! sections are `Option`s so that "absent" and "present but zero/empty"
//! stay distinguishable all the way into the normalized body.

use crate::core::any_xml::AnyXml;

/// Represents a single decoded Windows Event Log entry.
///
/// Raw and rendered variants are both kept; the fallback between them is
/// applied by [`resolve`](crate::core::resolve) when the body is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventRecord {
    /// `<System><EventID Qualifiers="..">`.
    pub event_id: EventId,

    /// `<System><Provider>` attributes.
    pub provider: Provider,

    /// The computer name where the event was generated.
    pub computer: String,

    /// The log channel this event was written to (e.g. `"Security"`).
    pub channel: String,

    /// `EventRecordID`, increasing per channel on the originating host.
    pub record_id: u64,

    /// `SystemTime` attribute of `<TimeCreated>`, kept verbatim. May be
    /// empty or malformed.
    pub time_created: String,

    /// `<RenderingInfo><Message>`.
    pub message: String,

    /// `<RenderingInfo><Level>`, e.g. `"Warning"`. Empty when rendering
    /// metadata was unavailable.
    pub rendered_level: String,

    /// `<System><Level>`, e.g. `"3"`.
    pub level: String,

    /// `<RenderingInfo><Task>`.
    pub rendered_task: String,

    /// `<System><Task>`.
    pub task: String,

    /// `<RenderingInfo><Opcode>`.
    pub rendered_opcode: String,

    /// `<System><Opcode>`.
    pub opcode: String,

    /// `<RenderingInfo><Keywords><Keyword>` values. `None` when the
    /// rendering carried no `<Keywords>` element at all.
    pub rendered_keywords: Option<Vec<String>>,

    /// Raw `<System><Keywords>` bitmask strings.
    pub keywords: Vec<String>,

    /// `<System><Security>`, if recorded.
    pub security: Option<Security>,

    /// `<System><Execution>`, if recorded.
    pub execution: Option<Execution>,

    /// `<System><Correlation>`, if recorded.
    pub correlation: Option<Correlation>,

    /// `<EventData><Data Name="..">` entries in document order.
    pub event_data: Vec<EventDataEntry>,

    /// The whole `<UserData>` element, if present.
    pub user_data: Option<AnyXml>,
}

/// Event identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventId {
    /// `Qualifiers` attribute; 0 when absent.
    pub qualifiers: u16,
    /// Element text.
    pub id: u32,
}

/// Event provider. Each attribute may be independently absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Provider {
    pub name: Option<String>,
    pub guid: Option<String>,
    pub event_source: Option<String>,
}

/// Security context of the user that triggered the event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Security {
    /// User SID string. May be empty.
    pub user_id: String,
}

/// Process context of the event.
///
/// Process and thread IDs are required by the schema whenever the element
/// exists; the remaining fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Execution {
    pub process_id: u32,
    pub thread_id: u32,
    pub processor_id: Option<u32>,
    pub session_id: Option<u32>,
    pub kernel_time: Option<u64>,
    pub user_time: Option<u64>,
    pub processor_time: Option<u64>,
}

/// Activity correlation identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correlation {
    pub activity_id: Option<String>,
    pub related_activity_id: Option<String>,
}

/// One `<Data>` element of `<EventData>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventDataEntry {
    /// `Name` attribute; empty when the entry is unnamed.
    pub name: String,
    /// Element text.
    pub value: String,
}

impl EventDataEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}
