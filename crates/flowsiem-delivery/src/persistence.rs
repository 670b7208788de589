//! File persistence for serialized events
//!
//! The store is a single JSON array of event strings, pretty-printed with a
//! four-space indent:
//! ```text
//! [
//!     "{\"input\":\"tcp 10.0.0.1:443 -> ...\",\"output\":\"attacker\"}"
//! ]
//! ```
//! Each save replaces the whole file; there is no append across runs.

use flowsiem_core::{Error, Event, Result, SerializedEvent};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Event list stored at a fixed path
#[derive(Debug, Clone)]
pub struct PersistenceStore {
    path: PathBuf,
}

impl PersistenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the file with `events`
    ///
    /// The array is written to a sibling `.tmp` file and renamed into place,
    /// so readers see either the previous content or the complete new list.
    /// A failed save removes the `.tmp` file.
    pub fn save(&self, events: &[SerializedEvent]) -> Result<()> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        events.serialize(&mut serializer)?;

        let temp_path = self.temp_path()?;
        if let Err(e) = replace_file(&temp_path, &self.path, &buffer) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(e.into());
        }

        info!("Saved {} events to {:?}", events.len(), self.path);
        Ok(())
    }

    /// Read the full event list back
    ///
    /// Elements are normally strings holding an encoded event; plain
    /// `{input, output}` objects are accepted too and re-encoded. Every
    /// element must be an attacker or victim event.
    pub fn load(&self) -> Result<Vec<SerializedEvent>> {
        let content = std::fs::read_to_string(&self.path)?;

        let value: Value = serde_json::from_str(&content).map_err(|e| {
            Error::corrupt_store(format!("{:?} is not valid JSON: {}", self.path, e))
        })?;
        let Value::Array(items) = value else {
            return Err(Error::corrupt_store(format!(
                "{:?} does not contain a JSON array",
                self.path
            )));
        };

        let mut events = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            events.push(decode_item(index, item)?);
        }

        debug!("Loaded {} events from {:?}", events.len(), self.path);
        Ok(events)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let mut name = self
            .path
            .file_name()
            .ok_or_else(|| Error::config(format!("{:?} is not a file path", self.path)))?
            .to_os_string();
        name.push(".tmp");
        Ok(self.path.with_file_name(name))
    }
}

fn replace_file(temp_path: &Path, path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(temp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);
    std::fs::rename(temp_path, path)
}

fn decode_item(index: usize, item: Value) -> Result<SerializedEvent> {
    let (event, decoded) = match item {
        Value::String(text) => {
            let event = SerializedEvent::from_raw(text);
            let decoded = event.decode().map_err(|e| {
                Error::corrupt_store(format!("element {} is not an encoded event: {}", index, e))
            })?;
            (event, decoded)
        }
        Value::Object(_) => {
            let decoded: Event = serde_json::from_value(item).map_err(|e| {
                Error::corrupt_store(format!("element {} is not an event: {}", index, e))
            })?;
            (decoded.serialize()?, decoded)
        }
        other => {
            return Err(Error::corrupt_store(format!(
                "element {} has unexpected type: {}",
                index, other
            )));
        }
    };

    if !decoded.output.is_flagged() {
        return Err(Error::corrupt_store(format!(
            "element {} is labelled {}, not attacker or victim",
            index, decoded.output
        )));
    }
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowsiem_core::{FlowRecord, Label};
    use proptest::prelude::*;
    use tempfile::TempDir;

    fn event(input: &str, label: Label) -> SerializedEvent {
        Event::flagged(&FlowRecord::new(input), label)
            .unwrap()
            .serialize()
            .unwrap()
    }

    fn store_in(dir: &TempDir) -> PersistenceStore {
        PersistenceStore::new(dir.path().join("events.json"))
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let events = vec![
            event("tcp 10.0.0.1:22", Label::Attacker),
            event("tcp 10.0.0.2:80", Label::Victim),
        ];

        store.save(&events).unwrap();
        assert_eq!(store.load().unwrap(), events);
        assert!(!dir.path().join("events.json.tmp").exists());
    }

    #[test]
    fn test_file_is_indented_string_array() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[event("x", Label::Victim)]).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            content,
            "[\n    \"{\\\"input\\\":\\\"x\\\",\\\"output\\\":\\\"victim\\\"}\"\n]"
        );
    }

    #[test]
    fn test_empty_list() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[]).unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&[event("a", Label::Attacker), event("b", Label::Attacker)]).unwrap();
        store.save(&[event("c", Label::Victim)]).unwrap();

        assert_eq!(store.load().unwrap(), vec![event("c", Label::Victim)]);
    }

    #[test]
    fn test_accepts_plain_objects() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::write(store.path(), r#"[{"input": "udp 1.1.1.1:53", "output": "attacker"}]"#)
            .unwrap();

        let events = store.load().unwrap();
        assert_eq!(events, vec![event("udp 1.1.1.1:53", Label::Attacker)]);
    }

    #[test]
    fn test_corrupt_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for content in [
            "not json",
            r#"{"events": []}"#,
            r#"[42]"#,
            r#"["not an event"]"#,
            r#"["{\"input\":\"a\",\"output\":\"hacker\"}"]"#,
            r#"[{"input": "a"}]"#,
            r#"["{\"input\": \"x\", \"output\": \"normal\"}"]"#,
            r#"["{\"input\":\"x\",\"output\":\"unknown\"}"]"#,
            r#"[{"input": "x", "output": "normal"}]"#,
        ] {
            std::fs::write(store.path(), content).unwrap();
            assert!(
                matches!(store.load(), Err(Error::CorruptStore(_))),
                "content {:?}",
                content
            );
        }
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("occupied"), "").unwrap();

        assert!(matches!(store.save(&[event("x", Label::Attacker)]), Err(Error::Io(_))));
        assert!(!dir.path().join("events.json.tmp").exists());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(store_in(&dir).load(), Err(Error::Io(_))));
    }

    proptest! {
        #[test]
        fn prop_round_trip(inputs in prop::collection::vec((".{0,60}", any::<bool>()), 1..40)) {
            let dir = TempDir::new().unwrap();
            let store = store_in(&dir);
            let events: Vec<SerializedEvent> = inputs
                .iter()
                .map(|(input, attacker)| {
                    event(input, if *attacker { Label::Attacker } else { Label::Victim })
                })
                .collect();

            store.save(&events).unwrap();
            prop_assert_eq!(store.load().unwrap(), events);
        }
    }
}
