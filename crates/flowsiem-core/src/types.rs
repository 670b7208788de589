//! Core types for flowsiem

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of events delivered in one call to the ingestion endpoint
pub const BATCH_CAPACITY: usize = 100;

/// One line of network-flow input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowRecord {
    /// Free-text description of the flow (protocol, endpoints, ports, counters, flags)
    pub input: String,

    /// Any other fields present on the line; carried but never interpreted
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl FlowRecord {
    /// Create a record holding only the flow description
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Classification outcome for a single flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Normal,
    Attacker,
    Victim,
    Unknown,
}

impl Label {
    /// Whether flows with this label are forwarded as security events
    pub fn is_flagged(&self) -> bool {
        matches!(self, Self::Attacker | Self::Victim)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Attacker => "attacker",
            Self::Victim => "victim",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged flow, the unit of delivery
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// The flow description that was classified
    pub input: String,

    /// Label assigned by the classifier
    pub output: Label,
}

impl Event {
    /// Build an event for `record` if `label` is one that gets forwarded
    pub fn flagged(record: &FlowRecord, label: Label) -> Option<Self> {
        label.is_flagged().then(|| Self {
            input: record.input.clone(),
            output: label,
        })
    }

    /// Serialize this event to the text form used on the wire and on disk
    pub fn serialize(&self) -> Result<SerializedEvent> {
        Ok(SerializedEvent(serde_json::to_string(self)?))
    }
}

/// JSON text of an [`Event`]
///
/// Events travel as strings: the persisted file is an array of them and the
/// ingestion endpoint receives them verbatim inside its `events` array, so a
/// loaded file can be replayed without re-encoding.
///
/// The text is serde_json's compact encoding: no space after `:` or `,`, and
/// non-ASCII characters written as raw UTF-8 rather than `\uXXXX` escapes
/// (`{"input":"café","output":"attacker"}`). Encoders that add spacing or
/// escape non-ASCII produce different bytes for the same JSON value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedEvent(String);

impl SerializedEvent {
    /// Wrap already-serialized event text without validating it
    pub fn from_raw(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Parse the text back into an event
    pub fn decode(&self) -> Result<Event> {
        Ok(serde_json::from_str(&self.0)?)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Ordered group of events delivered in one call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Batch {
    events: Vec<SerializedEvent>,
}

impl Batch {
    /// Create an empty batch with room for a full load
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(BATCH_CAPACITY),
        }
    }

    /// Append an event at the end of the batch
    pub fn push(&mut self, event: SerializedEvent) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether the batch holds [`BATCH_CAPACITY`] events
    pub fn is_full(&self) -> bool {
        self.events.len() >= BATCH_CAPACITY
    }

    pub fn events(&self) -> &[SerializedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<SerializedEvent> {
        self.events
    }
}

impl From<Vec<SerializedEvent>> for Batch {
    fn from(events: Vec<SerializedEvent>) -> Self {
        Self { events }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_attacker_and_victim_are_flagged() {
        let record = FlowRecord::new("tcp 10.0.0.1:443 -> 10.0.0.2:51000");

        assert!(Event::flagged(&record, Label::Normal).is_none());
        assert!(Event::flagged(&record, Label::Unknown).is_none());

        let event = Event::flagged(&record, Label::Victim).unwrap();
        assert_eq!(event.input, record.input);
        assert_eq!(event.output, Label::Victim);
    }

    #[test]
    fn test_serialized_event_shape() {
        let record = FlowRecord::new("udp 1.2.3.4:53");
        let event = Event::flagged(&record, Label::Attacker).unwrap();

        let serialized = event.serialize().unwrap();
        assert_eq!(
            serialized.as_str(),
            r#"{"input":"udp 1.2.3.4:53","output":"attacker"}"#
        );
        assert_eq!(serialized.decode().unwrap(), event);
    }

    #[test]
    fn test_serialized_event_keeps_utf8_raw() {
        let event = Event::flagged(&FlowRecord::new("café"), Label::Attacker).unwrap();
        let serialized = event.serialize().unwrap();

        assert_eq!(serialized.as_str(), r#"{"input":"café","output":"attacker"}"#);
        let escaped = SerializedEvent::from_raw(r#"{"input": "caf\u00e9", "output": "attacker"}"#);
        assert_eq!(escaped.decode().unwrap(), event);
    }

    #[test]
    fn test_serialized_event_is_a_json_string() {
        let serialized = SerializedEvent::from_raw(r#"{"input":"x","output":"victim"}"#);
        let json = serde_json::to_string(&vec![serialized]).unwrap();
        assert_eq!(json, r#"["{\"input\":\"x\",\"output\":\"victim\"}"]"#);
    }

    #[test]
    fn test_flow_record_keeps_extra_fields() {
        let record: FlowRecord =
            serde_json::from_str(r#"{"input":"icmp","output":"normal","id":7}"#).unwrap();
        assert_eq!(record.input, "icmp");
        assert_eq!(record.extra.len(), 2);
    }

    #[test]
    fn test_batch_fills_at_capacity() {
        let mut batch = Batch::new();
        for i in 0..BATCH_CAPACITY {
            assert!(!batch.is_full());
            batch.push(SerializedEvent::from_raw(i.to_string()));
        }
        assert!(batch.is_full());
        assert_eq!(batch.len(), BATCH_CAPACITY);
    }
}
