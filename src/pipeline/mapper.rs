//! Event → mutation mapping.
//!
//! The affect engine never looks at events; a mapper decides what an event
//! means for the state. [`DirectiveMapper`] understands a small set of
//! top-level fields that an assistant can emit inline with its NDJSON output:
//!
//! ```json
//! {"emotion": "curiosity", "delta": 0.2}
//! {"emotions": {"happiness": 0.1, "fear": -0.05}}
//! {"sentiment": -0.8}
//! {"mood": "thoughtful"}
//! {"feedback": "positive"}
//! {"memory": {"topic": "tides"}}
//! {"vitals": {"neural_activity": 5}}
//! {"values": {"creativity": 3}}
//! ```
//!
//! Several fields may appear in one object; each is applied independently.
//! Unknown fields are ignored.

use serde_json::{Map, Value};

use crate::affect::{AffectError, AffectiveState, Emotion};
use crate::stream::Event;

/// Delta applied for `{"emotion": ...}` without an explicit `delta`.
pub const DEFAULT_EMOTION_DELTA: f64 = 0.1;

/// Maps classified events onto state mutations.
pub trait EventMapper: Send + Sync {
    /// Apply `event` to `state`.
    ///
    /// Errors are only returned for out-of-domain input in strict mode; the
    /// state is never left out of range.
    fn apply(&self, event: &Event, state: &mut AffectiveState) -> Result<(), AffectError>;
}

/// Mapper that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMapper;

impl EventMapper for NoopMapper {
    fn apply(&self, _event: &Event, _state: &mut AffectiveState) -> Result<(), AffectError> {
        Ok(())
    }
}

/// Interprets inline affect directives in `ParsedObject` payloads.
#[derive(Debug, Clone)]
pub struct DirectiveMapper {
    /// Emotion change per unit of `sentiment`.
    pub sentiment_scale: f64,
    /// Store `RawText` lines as memory records.
    pub remember_raw_text: bool,
}

impl Default for DirectiveMapper {
    fn default() -> Self {
        Self {
            sentiment_scale: 0.1,
            remember_raw_text: false,
        }
    }
}

impl EventMapper for DirectiveMapper {
    fn apply(&self, event: &Event, state: &mut AffectiveState) -> Result<(), AffectError> {
        match event {
            Event::RawText(text) => {
                if self.remember_raw_text {
                    state.remember(Value::String(text.clone()));
                }
                Ok(())
            }
            Event::ParsedObject(Value::Object(map)) => self.apply_directives(map, state),
            Event::ParsedObject(_) => Ok(()),
        }
    }
}

impl DirectiveMapper {
    fn apply_directives(
        &self,
        map: &Map<String, Value>,
        state: &mut AffectiveState,
    ) -> Result<(), AffectError> {
        let mut first_err = None;

        if let Some(name) = map.get("emotion") {
            let result = match (name.as_str(), map.get("delta")) {
                (Some(name), None) => state.adjust_emotion_named(name, DEFAULT_EMOTION_DELTA),
                (Some(name), Some(delta)) => match delta.as_f64() {
                    Some(delta) => state.adjust_emotion_named(name, delta),
                    None => state.reject(malformed("delta", "expected a number")),
                },
                (None, _) => state.reject(malformed("emotion", "expected a string")),
            };
            keep_first(&mut first_err, result);
        }

        if let Some(emotions) = map.get("emotions") {
            let result = for_each_number(emotions, "emotions", state, |state, name, delta| {
                state.adjust_emotion_named(name, delta)
            });
            keep_first(&mut first_err, result);
        }

        if let Some(sentiment) = map.get("sentiment") {
            let result = match sentiment_score(sentiment) {
                Some(score) => {
                    self.apply_sentiment(score, state);
                    Ok(())
                }
                None => state.reject(malformed("sentiment", "expected a number or polarity")),
            };
            keep_first(&mut first_err, result);
        }

        if let Some(mood) = map.get("mood") {
            let result = match mood.as_str() {
                Some(name) => state.set_mood_named(name),
                None => state.reject(malformed("mood", "expected a string")),
            };
            keep_first(&mut first_err, result);
        }

        if let Some(feedback) = map.get("feedback") {
            let result = match feedback.as_str() {
                Some(kind) => state.apply_feedback_named(kind),
                None => state.reject(malformed("feedback", "expected a string")),
            };
            keep_first(&mut first_err, result);
        }

        if let Some(memory) = map.get("memory") {
            state.remember(memory.clone());
        }

        if let Some(vitals) = map.get("vitals") {
            let result = for_each_number(vitals, "vitals", state, |state, name, delta| {
                state.adjust_vital_named(name, delta)
            });
            keep_first(&mut first_err, result);
        }

        if let Some(values) = map.get("values") {
            let result = match values.as_object() {
                Some(values) => {
                    let mut first = None;
                    for (name, amount) in values {
                        let result = match amount.as_u64() {
                            Some(amount) => {
                                state.raise_value_named(name, amount.min(u8::MAX as u64) as u8)
                            }
                            None => state.reject(malformed(
                                "values",
                                "expected non-negative integers",
                            )),
                        };
                        keep_first(&mut first, result);
                    }
                    first.map_or(Ok(()), Err)
                }
                None => state.reject(malformed("values", "expected an object")),
            };
            keep_first(&mut first_err, result);
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Positive sentiment lifts happiness, negative lifts sadness.
    fn apply_sentiment(&self, score: f64, state: &mut AffectiveState) {
        let amount = score.abs() * self.sentiment_scale;
        if score > 0.0 {
            state.adjust_emotion(Emotion::Happiness, amount);
        } else if score < 0.0 {
            state.adjust_emotion(Emotion::Sadness, amount);
        }
    }
}

fn sentiment_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "positive" => Some(1.0),
            "negative" => Some(-1.0),
            "neutral" => Some(0.0),
            _ => None,
        },
        _ => None,
    }
}

fn for_each_number<F>(
    value: &Value,
    field: &str,
    state: &mut AffectiveState,
    mut apply: F,
) -> Result<(), AffectError>
where
    F: FnMut(&mut AffectiveState, &str, f64) -> Result<(), AffectError>,
{
    let Some(entries) = value.as_object() else {
        return state.reject(malformed(field, "expected an object"));
    };
    let mut first_err = None;
    for (name, delta) in entries {
        let result = match delta.as_f64() {
            Some(delta) => apply(state, name, delta),
            None => state.reject(malformed(field, "expected numbers")),
        };
        keep_first(&mut first_err, result);
    }
    first_err.map_or(Ok(()), Err)
}

fn keep_first(slot: &mut Option<AffectError>, result: Result<(), AffectError>) {
    if let Err(err) = result {
        slot.get_or_insert(err);
    }
}

fn malformed(field: &str, reason: &str) -> AffectError {
    AffectError::MalformedDirective {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
