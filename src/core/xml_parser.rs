//! Structured decoder for Windows Event Log XML.
//!
//! Converts the rendered XML of one event into a typed [`EventRecord`]. The
//! document is read once into an [`AnyXml`] tree; well-known schema fields
//! are projected from it and the `<UserData>` subtree is kept as-is.
//! String fields take the element's character data untrimmed.

use std::str::FromStr;

use crate::core::any_xml::AnyXml;
use crate::core::event_record::{
    Correlation, EventDataEntry, EventId, EventRecord, Execution, Provider, Security,
};
use crate::util::error::{DecodeError, Result};

/// Decode a raw event document into an [`EventRecord`].
///
/// The XML follows the Windows Event schema:
/// ```xml
/// <Event xmlns="http://schemas.microsoft.com/win/2004/08/events/event">
///   <System>
///     <Provider Name="..." Guid="{...}" />
///     <EventID Qualifiers="16384">1001</EventID>
///     <Level>2</Level>
///     <TimeCreated SystemTime="2024-01-15T10:23:45.1234567Z" />
///     ...
///   </System>
///   <EventData>
///     <Data Name="key">value</Data>
///   </EventData>
///   <RenderingInfo Culture="en-US">
///     <Message>...</Message>
///     <Level>Error</Level>
///   </RenderingInfo>
/// </Event>
/// ```
///
/// Missing optional elements leave the corresponding fields at their
/// zero or `None` value.
///
/// # Errors
/// Returns [`DecodeError::Document`] wrapping the underlying failure and the
/// original input if the XML is malformed, truncated, or carries a
/// non-numeric value in a numeric field.
pub fn decode(xml: &[u8]) -> Result<EventRecord> {
    let record = AnyXml::from_document(xml)
        .and_then(EventRecord::from_root)
        .map_err(|e| e.with_document(xml))?;

    tracing::trace!(
        "Decoded event {} (record {}) from channel {:?}",
        record.event_id.id,
        record.record_id,
        record.channel
    );
    Ok(record)
}

impl EventRecord {
    /// Project the well-known schema fields out of a decoded document tree.
    pub fn from_root(mut root: AnyXml) -> Result<EventRecord> {
        let mut record = EventRecord::default();

        if let Some(system) = root.child("System") {
            read_system(system, &mut record)?;
        }

        if let Some(rendering) = root.child("RenderingInfo") {
            read_rendering_info(rendering, &mut record);
        }

        if let Some(event_data) = root.child("EventData") {
            record.event_data = event_data
                .children_named("Data")
                .map(|data| {
                    EventDataEntry::new(data.attribute("Name").unwrap_or_default(), &data.raw_text)
                })
                .collect();
        }

        if let Some(pos) = root.children.iter().position(|c| c.tag == "UserData") {
            record.user_data = Some(root.children.swap_remove(pos));
        }

        Ok(record)
    }
}

fn read_system(system: &AnyXml, record: &mut EventRecord) -> Result<()> {
    if let Some(event_id) = system.child("EventID") {
        record.event_id = EventId {
            qualifiers: opt_number(event_id.attribute("Qualifiers"), "Qualifiers")?
                .unwrap_or(0),
            id: number(&event_id.text, "EventID")?,
        };
    }

    if let Some(provider) = system.child("Provider") {
        record.provider = Provider {
            name: provider.attribute("Name").map(String::from),
            guid: provider.attribute("Guid").map(String::from),
            event_source: provider.attribute("EventSourceName").map(String::from),
        };
    }

    record.computer = child_text(system, "Computer");
    record.channel = child_text(system, "Channel");
    record.level = child_text(system, "Level");
    record.task = child_text(system, "Task");
    record.opcode = child_text(system, "Opcode");

    if let Some(record_id) = system.child("EventRecordID") {
        record.record_id = number(&record_id.text, "EventRecordID")?;
    }

    record.time_created = system
        .child("TimeCreated")
        .and_then(|t| t.attribute("SystemTime"))
        .unwrap_or_default()
        .to_string();

    record.keywords = system
        .children_named("Keywords")
        .map(|k| k.raw_text.clone())
        .collect();

    record.security = system.child("Security").map(|s| Security {
        user_id: s.attribute("UserID").unwrap_or_default().to_string(),
    });

    if let Some(execution) = system.child("Execution") {
        record.execution = Some(Execution {
            process_id: opt_number(execution.attribute("ProcessID"), "ProcessID")?.unwrap_or(0),
            thread_id: opt_number(execution.attribute("ThreadID"), "ThreadID")?.unwrap_or(0),
            processor_id: opt_number(execution.attribute("ProcessorID"), "ProcessorID")?,
            session_id: opt_number(execution.attribute("SessionID"), "SessionID")?,
            kernel_time: opt_number(execution.attribute("KernelTime"), "KernelTime")?,
            user_time: opt_number(execution.attribute("UserTime"), "UserTime")?,
            processor_time: opt_number(execution.attribute("ProcessorTime"), "ProcessorTime")?,
        });
    }

    record.correlation = system.child("Correlation").and_then(|c| {
        let correlation = Correlation {
            activity_id: c.attribute("ActivityID").map(String::from),
            related_activity_id: c.attribute("RelatedActivityID").map(String::from),
        };
        // An empty <Correlation/> is emitted by most providers and carries nothing.
        if correlation.activity_id.is_none() && correlation.related_activity_id.is_none() {
            None
        } else {
            Some(correlation)
        }
    });

    Ok(())
}

fn read_rendering_info(rendering: &AnyXml, record: &mut EventRecord) {
    record.message = child_text(rendering, "Message");
    record.rendered_level = child_text(rendering, "Level");
    record.rendered_task = child_text(rendering, "Task");
    record.rendered_opcode = child_text(rendering, "Opcode");
    record.rendered_keywords = rendering.child("Keywords").map(|keywords| {
        keywords
            .children_named("Keyword")
            .map(|k| k.raw_text.clone())
            .collect()
    });
}

/// Untrimmed text of the first child with the given name, or empty.
fn child_text(parent: &AnyXml, local_name: &str) -> String {
    parent
        .child(local_name)
        .map(|c| c.raw_text.clone())
        .unwrap_or_default()
}

/// Parse an unsigned number from element text. Empty text is zero.
fn number<T>(text: &str, field: &'static str) -> Result<T>
where
    T: FromStr + Default,
{
    let text = text.trim();
    if text.is_empty() {
        return Ok(T::default());
    }
    text.parse().map_err(|_| DecodeError::InvalidNumber {
        field,
        value: text.to_string(),
    })
}

/// Parse an optional numeric attribute. Absent stays `None`.
fn opt_number<T>(value: Option<&str>, field: &'static str) -> Result<Option<T>>
where
    T: FromStr + Default,
{
    value.map(|v| number(v, field)).transpose()
}
