//! The affective state engine.
//!
//! [`AffectiveState`] is a plain value owned by the caller. It has no
//! interior locking and assumes a single writer; share it through
//! [`AffectHandle`](crate::pipeline::AffectHandle) or any other lock when
//! more than one task mutates it.
//!
//! Typed operations (`adjust_emotion`, `set_mood`, ...) take closed enums
//! and cannot fail. The `*_named` variants resolve free-form names first
//! and apply the configured [`MutationMode`] to names that do not resolve.
//! No operation can leave a field outside its range.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{AffectConfig, MutationMode};
use super::errors::AffectError;
use super::memory::{MemoryRecord, MemoryRing};
use super::types::{CoreValue, Emotion, Feedback, Mood, Vital};
use super::vectors::{EmotionalVector, ValueSet, Vitals};

/// Cognitive load added by one [`AffectiveState::reflect`] step.
pub const REFLECT_LOAD_STEP: f64 = 10.0;
/// Energy spent by one [`AffectiveState::reflect`] step.
pub const REFLECT_ENERGY_COST: f64 = 5.0;

/// A mood the persona left, and when.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodChange {
    pub mood: Mood,
    pub until: DateTime<Utc>,
}

/// Read-only copy of the state for display (charts, dashboards).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffectSnapshot {
    pub mood: Mood,
    pub mood_history: Vec<MoodChange>,
    pub emotions: EmotionalVector,
    pub dominant_emotion: Emotion,
    pub values: ValueSet,
    pub vitals: Vitals,
    pub memory_len: usize,
    pub memory_capacity: usize,
    pub reflections: u64,
    pub taken_at: DateTime<Utc>,
}

/// Mood, emotions, values, vitals and memory of one persona.
#[derive(Debug, Clone)]
pub struct AffectiveState {
    mode: MutationMode,
    mood: Mood,
    mood_history: VecDeque<MoodChange>,
    mood_history_limit: Option<usize>,
    emotions: EmotionalVector,
    values: ValueSet,
    vitals: Vitals,
    memory: MemoryRing,
    reflections: u64,
}

impl Default for AffectiveState {
    fn default() -> Self {
        Self::new()
    }
}

impl AffectiveState {
    /// Fresh state with default levels, lenient mode, 50-record memory.
    pub fn new() -> Self {
        Self::from_config(&AffectConfig::default())
    }

    /// Build a state from configuration, clamping every override.
    pub fn from_config(config: &AffectConfig) -> Self {
        let mut emotions = EmotionalVector::default();
        for (&emotion, &level) in &config.emotions {
            emotions.set(emotion, level);
        }
        let mut values = ValueSet::default();
        for (&value, &level) in &config.values {
            values.set(value, level);
        }
        let mut vitals = Vitals::default();
        for (&vital, &level) in &config.vitals {
            vitals.set(vital, level);
        }

        Self {
            mode: config.mode,
            mood: config.initial_mood,
            mood_history: VecDeque::new(),
            mood_history_limit: config.mood_history_limit.map(|limit| limit.max(1)),
            emotions,
            values,
            vitals,
            memory: MemoryRing::with_capacity(config.memory_capacity),
            reflections: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn mode(&self) -> MutationMode {
        self.mode
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Prior moods, oldest first.
    pub fn mood_history(&self) -> impl Iterator<Item = &MoodChange> {
        self.mood_history.iter()
    }

    pub fn mood_history_len(&self) -> usize {
        self.mood_history.len()
    }

    pub fn emotions(&self) -> &EmotionalVector {
        &self.emotions
    }

    pub fn emotion(&self, emotion: Emotion) -> f64 {
        self.emotions.get(emotion)
    }

    pub fn values(&self) -> &ValueSet {
        &self.values
    }

    pub fn value(&self, value: CoreValue) -> u8 {
        self.values.get(value)
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn vital(&self, vital: Vital) -> f64 {
        self.vitals.get(vital)
    }

    pub fn memory(&self) -> &MemoryRing {
        &self.memory
    }

    /// Number of completed [`reflect`](Self::reflect) steps.
    pub fn reflections(&self) -> u64 {
        self.reflections
    }

    pub fn snapshot(&self) -> AffectSnapshot {
        AffectSnapshot {
            mood: self.mood,
            mood_history: self.mood_history.iter().copied().collect(),
            emotions: self.emotions,
            dominant_emotion: self.emotions.dominant(),
            values: self.values,
            vitals: self.vitals,
            memory_len: self.memory.len(),
            memory_capacity: self.memory.capacity(),
            reflections: self.reflections,
            taken_at: Utc::now(),
        }
    }

    // -----------------------------------------------------------------------
    // Typed mutations (total)
    // -----------------------------------------------------------------------

    /// Add `delta` to an emotion and clamp to `[0, 1]`.
    ///
    /// A non-finite delta leaves the emotion unchanged. Returns the new level.
    pub fn adjust_emotion(&mut self, emotion: Emotion, delta: f64) -> f64 {
        let current = self.emotions.get(emotion);
        if delta.is_finite() {
            self.emotions.set(emotion, current + delta);
            log::debug!(
                "Emotion {} {:.3} -> {:.3}",
                emotion,
                current,
                self.emotions.get(emotion)
            );
        }
        self.emotions.get(emotion)
    }

    /// Switch mood, appending the prior mood to the history.
    pub fn set_mood(&mut self, mood: Mood) {
        let prior = std::mem::replace(&mut self.mood, mood);
        self.mood_history.push_back(MoodChange {
            mood: prior,
            until: Utc::now(),
        });
        if let Some(limit) = self.mood_history_limit {
            while self.mood_history.len() > limit {
                self.mood_history.pop_front();
            }
        }
        log::debug!("Mood {} -> {}", prior, mood);
    }

    /// Append a memory record, evicting the oldest when full.
    pub fn append_memory(&mut self, record: MemoryRecord) -> Option<MemoryRecord> {
        let evicted = self.memory.push(record);
        if let Some(ref old) = evicted {
            log::trace!("Memory full, evicted record {}", old.id);
        }
        evicted
    }

    /// Wrap `content` in a new record and append it.
    pub fn remember(&mut self, content: impl Into<Value>) -> Option<MemoryRecord> {
        self.append_memory(MemoryRecord::new(content))
    }

    /// Positive feedback grows empathy (+5) and wisdom (+2); negative grows
    /// integrity (+5) and adaptability (+2). Values saturate at 100.
    pub fn apply_feedback(&mut self, kind: Feedback) {
        match kind {
            Feedback::Positive => {
                self.values.raise(CoreValue::Empathy, 5);
                self.values.raise(CoreValue::Wisdom, 2);
            }
            Feedback::Negative => {
                self.values.raise(CoreValue::Integrity, 5);
                self.values.raise(CoreValue::Adaptability, 2);
            }
        }
        log::debug!("Applied {} feedback", kind);
    }

    /// Raise a core value. Values never decrease.
    pub fn raise_value(&mut self, value: CoreValue, amount: u8) -> u8 {
        self.values.raise(value, amount)
    }

    /// Add `delta` to a vital, clamped to the vital's range.
    pub fn adjust_vital(&mut self, vital: Vital, delta: f64) -> f64 {
        if delta.is_finite() {
            let current = self.vitals.get(vital);
            self.vitals.set(vital, current + delta);
        }
        self.vitals.get(vital)
    }

    /// One maintenance step: cognitive load +10, energy −5.
    ///
    /// Meant to run once per completed response cycle, not per event.
    pub fn reflect(&mut self) {
        self.adjust_vital(Vital::CognitiveLoad, REFLECT_LOAD_STEP);
        self.adjust_vital(Vital::EnergyLevel, -REFLECT_ENERGY_COST);
        self.reflections += 1;
        log::debug!(
            "Reflection #{}: load={:.1} energy={:.1}",
            self.reflections,
            self.vitals.cognitive_load,
            self.vitals.energy_level
        );
    }

    // -----------------------------------------------------------------------
    // Name-based mutations
    // -----------------------------------------------------------------------

    pub fn adjust_emotion_named(&mut self, name: &str, delta: f64) -> Result<(), AffectError> {
        let Some(emotion) = Emotion::from_name(name) else {
            return self.reject(AffectError::UnknownEmotion(name.to_owned()));
        };
        if !delta.is_finite() {
            return self.reject(AffectError::NonFiniteDelta {
                target: emotion.to_string(),
                delta,
            });
        }
        self.adjust_emotion(emotion, delta);
        Ok(())
    }

    pub fn set_mood_named(&mut self, name: &str) -> Result<(), AffectError> {
        match Mood::from_name(name) {
            Some(mood) => {
                self.set_mood(mood);
                Ok(())
            }
            None => self.reject(AffectError::UnknownMood(name.to_owned())),
        }
    }

    pub fn apply_feedback_named(&mut self, kind: &str) -> Result<(), AffectError> {
        match Feedback::from_name(kind) {
            Some(kind) => {
                self.apply_feedback(kind);
                Ok(())
            }
            None => self.reject(AffectError::UnknownFeedback(kind.to_owned())),
        }
    }

    pub fn raise_value_named(&mut self, name: &str, amount: u8) -> Result<(), AffectError> {
        match CoreValue::from_name(name) {
            Some(value) => {
                self.raise_value(value, amount);
                Ok(())
            }
            None => self.reject(AffectError::UnknownValue(name.to_owned())),
        }
    }

    pub fn adjust_vital_named(&mut self, name: &str, delta: f64) -> Result<(), AffectError> {
        let Some(vital) = Vital::from_name(name) else {
            return self.reject(AffectError::UnknownVital(name.to_owned()));
        };
        if !delta.is_finite() {
            return self.reject(AffectError::NonFiniteDelta {
                target: vital.to_string(),
                delta,
            });
        }
        self.adjust_vital(vital, delta);
        Ok(())
    }

    /// Apply the mutation mode to an out-of-domain request.
    pub(crate) fn reject(&self, err: AffectError) -> Result<(), AffectError> {
        match self.mode {
            MutationMode::Lenient => {
                log::debug!("Ignoring out-of-domain mutation: {}", err);
                Ok(())
            }
            MutationMode::Strict => Err(err),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
