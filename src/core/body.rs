//! Normalized body assembly.
//!
//! Turns an [`EventRecord`] into an insertion-ordered JSON mapping. Optional
//! schema sections only appear when the source event carried them:
//! consumers tell "absent" apart from "present but empty", so no empty
//! container is ever synthesised for a missing section.

use serde_json::{json, Map, Value};

use crate::core::event_record::{Correlation, EventDataEntry, EventRecord, Execution};
use crate::core::message::InterpreterRegistry;

impl EventRecord {
    /// Build the normalized body. Total and deterministic.
    pub fn to_body(&self, interpreters: &InterpreterRegistry) -> Map<String, Value> {
        let (message, details) = interpreters.interpret(&self.channel, &self.message);

        let mut body = Map::new();
        body.insert(
            "event_id".into(),
            json!({
                "qualifiers": self.event_id.qualifiers,
                "id": self.event_id.id,
            }),
        );
        body.insert(
            "provider".into(),
            json!({
                "name": self.provider.name.as_deref().unwrap_or_default(),
                "guid": self.provider.guid.as_deref().unwrap_or_default(),
                "event_source": self.provider.event_source.as_deref().unwrap_or_default(),
            }),
        );
        body.insert("system_time".into(), Value::from(self.time_created.as_str()));
        body.insert("computer".into(), Value::from(self.computer.as_str()));
        body.insert("channel".into(), Value::from(self.channel.as_str()));
        body.insert("record_id".into(), Value::from(self.record_id));
        body.insert("level".into(), Value::from(self.resolved_level()));
        body.insert("message".into(), Value::String(message));
        body.insert("task".into(), Value::from(self.resolved_task()));
        body.insert("opcode".into(), Value::from(self.resolved_opcode()));
        body.insert("keywords".into(), Value::from(self.resolved_keywords()));
        body.insert(
            "event_data".into(),
            Value::Object(event_data_map(&self.event_data)),
        );

        if let Some(details) = details.filter(|d| !d.is_empty()) {
            body.insert("details".into(), Value::Object(details));
        }

        if let Some(security) = self.security.as_ref().filter(|s| !s.user_id.is_empty()) {
            body.insert("security".into(), json!({ "user_id": security.user_id }));
        }

        if let Some(execution) = &self.execution {
            body.insert("execution".into(), Value::Object(execution.as_map()));
        }

        if let Some(correlation) = &self.correlation {
            body.insert("correlation".into(), Value::Object(correlation.as_map()));
        }

        if let Some(user_data) = &self.user_data {
            body.insert("user_data".into(), Value::Object(user_data.as_map()));
        }

        body
    }
}

/// Collapse `<Data>` entries into a mapping by name.
///
/// Unnamed entries are dropped. A repeated name keeps the last value but
/// the position of its first occurrence.
pub fn event_data_map(entries: &[EventDataEntry]) -> Map<String, Value> {
    let mut map = Map::new();
    for entry in entries.iter().filter(|e| !e.name.is_empty()) {
        map.insert(entry.name.clone(), Value::from(entry.value.as_str()));
    }
    map
}

impl Execution {
    /// Process and thread IDs always, other fields only when recorded.
    pub fn as_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("process_id".into(), Value::from(self.process_id));
        map.insert("thread_id".into(), Value::from(self.thread_id));

        let optional = [
            ("processor_id", self.processor_id.map(u64::from)),
            ("session_id", self.session_id.map(u64::from)),
            ("kernel_time", self.kernel_time),
            ("user_time", self.user_time),
            ("processor_time", self.processor_time),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.insert(key.into(), Value::from(value));
            }
        }
        map
    }
}

impl Correlation {
    pub fn as_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(activity_id) = &self.activity_id {
            map.insert("activity_id".into(), Value::from(activity_id.as_str()));
        }
        if let Some(related) = &self.related_activity_id {
            map.insert("related_activity_id".into(), Value::from(related.as_str()));
        }
        map
    }
}
