//! Line classification — every line becomes exactly one [`Event`].
//!
//! The classifier is total. A line that parses as JSON becomes
//! [`Event::ParsedObject`]; anything else, including the empty string, is
//! passed through verbatim as [`Event::RawText`]. Payload shape is not
//! validated beyond syntactic JSON validity.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A classified unit of assistant output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum Event {
    /// The line was syntactically valid JSON.
    ParsedObject(Value),
    /// The line (or buffered text) was not JSON.
    RawText(String),
}

impl Event {
    pub fn is_parsed(&self) -> bool {
        matches!(self, Event::ParsedObject(_))
    }

    /// The payload as a JSON object, if it is one.
    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        match self {
            Event::ParsedObject(Value::Object(map)) => Some(map),
            _ => None,
        }
    }

    /// Look up a top-level field of an object payload.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(name))
    }

    /// The raw text, for `RawText` events.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Event::RawText(text) => Some(text),
            Event::ParsedObject(_) => None,
        }
    }
}

/// Classify one framed line.
pub fn classify(line: &str) -> Event {
    match serde_json::from_str::<Value>(line) {
        Ok(value) => Event::ParsedObject(value),
        Err(err) => {
            log::trace!("Line is not JSON ({}), keeping as raw text", err);
            Event::RawText(line.to_owned())
        }
    }
}

/// Full-buffer mode: the whole decoded response as one `RawText` event.
pub fn classify_buffered(text: String) -> Event {
    Event::RawText(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_line() {
        assert_eq!(classify(r#"{"a":1}"#), Event::ParsedObject(json!({"a": 1})));
    }

    #[test]
    fn test_non_object_json_is_still_parsed() {
        assert_eq!(classify("42"), Event::ParsedObject(json!(42)));
        assert_eq!(classify(r#""hi""#), Event::ParsedObject(json!("hi")));
        assert_eq!(classify("[1,2]"), Event::ParsedObject(json!([1, 2])));
    }

    #[test]
    fn test_malformed_json_is_raw_text_verbatim() {
        let line = r#"  {"a": 1,  "#;
        assert_eq!(classify(line), Event::RawText(line.to_string()));
    }

    #[test]
    fn test_total_over_awkward_inputs() {
        let deep = "[".repeat(10_000);
        let inputs = ["", " ", "null", "nul", "{}", "}{", "\u{FFFD}", "🦀", deep.as_str()];
        for input in inputs {
            match classify(input) {
                Event::ParsedObject(_) => assert!(serde_json::from_str::<Value>(input).is_ok()),
                Event::RawText(text) => assert_eq!(text, input),
            }
        }
        assert_eq!(classify(""), Event::RawText(String::new()));
    }

    #[test]
    fn test_buffered_is_single_raw_text() {
        let text = "{\"a\":1}\n{\"b\":2}\n".to_string();
        assert_eq!(classify_buffered(text.clone()), Event::RawText(text));
    }

    #[test]
    fn test_field_access() {
        let event = classify(r#"{"mood":"happy"}"#);
        assert!(event.is_parsed());
        assert_eq!(event.field("mood"), Some(&json!("happy")));
        assert!(event.as_text().is_none());
        assert!(classify("plain words").field("mood").is_none());
    }

    #[test]
    fn test_event_serde_shape() {
        let json = serde_json::to_value(Event::RawText("hi".into())).unwrap();
        assert_eq!(json, json!({"kind": "raw_text", "payload": "hi"}));
    }
}
