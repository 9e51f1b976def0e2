//! The event record and the canonical on-disk encoding of the event list.

use serde::{Deserialize, Serialize};

use crate::error::{EventDeskError, EventDeskResult};

/// One entry of `events.json`.
///
/// Records have no id: an event is addressed by its position in the list,
/// and list order is display order on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Repository path of the image asset (empty when no image was attached).
    pub image: String,
    pub alt: String,
    pub caption: String,
}

impl EventRecord {
    pub fn new(image: impl Into<String>, alt: impl Into<String>, caption: impl Into<String>) -> Self {
        EventRecord {
            image: image.into(),
            alt: alt.into(),
            caption: caption.into(),
        }
    }

    pub fn has_image(&self) -> bool {
        !self.image.is_empty()
    }
}

/// Encode the list the way the site expects it: a pretty-printed JSON array
/// with two-space indentation and no trailing newline.
pub fn to_canonical_json(events: &[EventRecord]) -> EventDeskResult<String> {
    serde_json::to_string_pretty(events).map_err(|e| EventDeskError::Serialization(e.to_string()))
}

/// Decode a published `events.json`.
pub fn from_json(bytes: &[u8]) -> EventDeskResult<Vec<EventRecord>> {
    serde_json::from_slice(bytes)
        .map_err(|e| EventDeskError::Load(format!("events file is not a valid event list: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_canonical_json_layout() {
        let events = vec![EventRecord::new("a.png", "A", "First")];
        let json = to_canonical_json(&events).unwrap();

        assert_eq!(
            json,
            "[\n  {\n    \"image\": \"a.png\",\n    \"alt\": \"A\",\n    \"caption\": \"First\"\n  }\n]"
        );
    }

    #[test]
    fn test_empty_list_encodes_as_empty_array() {
        assert_eq!(to_canonical_json(&[]).unwrap(), "[]");
    }

    #[test]
    fn test_non_ascii_is_kept_verbatim() {
        let events = vec![EventRecord::new("", "Schüler", "Sommerfest ☀")];
        let json = to_canonical_json(&events).unwrap();
        assert!(json.contains("Schüler"));
        assert!(json.contains("Sommerfest ☀"));
    }

    #[test]
    fn test_decode_then_encode_is_stable() {
        let events = vec![
            EventRecord::new("assets/events/1_a.png", "A", "First"),
            EventRecord::new("", "B", "Second"),
        ];
        let json = to_canonical_json(&events).unwrap();
        let decoded = from_json(json.as_bytes()).unwrap();

        assert_eq!(decoded, events);
        assert_eq!(to_canonical_json(&decoded).unwrap(), json);
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let raw = br#"[{"image":"x.png","alt":"X","caption":"C","date":"2024-01-01"}]"#;
        let decoded = from_json(raw).unwrap();
        assert_eq!(decoded, vec![EventRecord::new("x.png", "X", "C")]);
    }

    #[test]
    fn test_invalid_file_is_a_load_error() {
        let err = from_json(b"{\"image\": \"x\"}").unwrap_err();
        assert!(matches!(err, EventDeskError::Load(_)));

        let err = from_json(b"[{\"image\": \"x\"}]").unwrap_err();
        assert!(matches!(err, EventDeskError::Load(_)));
    }
}
