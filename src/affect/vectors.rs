//! Fixed-key numeric domains: emotions, core values and vitals.
//!
//! Every setter clamps, so none of these can hold an out-of-range value.

use serde::{Deserialize, Serialize};

use super::types::{CoreValue, Emotion, Vital};

/// Upper bound of every core value.
pub const VALUE_MAX: u8 = 100;

// ============================================================================
// EmotionalVector
// ============================================================================

/// Seven emotions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmotionalVector {
    pub happiness: f64,
    pub sadness: f64,
    pub anger: f64,
    pub fear: f64,
    pub surprise: f64,
    pub curiosity: f64,
    pub calmness: f64,
}

impl Default for EmotionalVector {
    fn default() -> Self {
        Self {
            happiness: 0.5,
            sadness: 0.1,
            anger: 0.0,
            fear: 0.1,
            surprise: 0.2,
            curiosity: 0.7,
            calmness: 0.6,
        }
    }
}

impl EmotionalVector {
    pub fn get(&self, emotion: Emotion) -> f64 {
        match emotion {
            Emotion::Happiness => self.happiness,
            Emotion::Sadness => self.sadness,
            Emotion::Anger => self.anger,
            Emotion::Fear => self.fear,
            Emotion::Surprise => self.surprise,
            Emotion::Curiosity => self.curiosity,
            Emotion::Calmness => self.calmness,
        }
    }

    /// Set an emotion, clamped to `[0, 1]`. Non-finite input is ignored.
    pub fn set(&mut self, emotion: Emotion, value: f64) {
        if !value.is_finite() {
            return;
        }
        *self.slot(emotion) = value.clamp(0.0, 1.0);
    }

    /// `(emotion, level)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        Emotion::ALL.iter().map(move |&emotion| (emotion, self.get(emotion)))
    }

    /// Strongest emotion; ties go to the earlier-declared one.
    pub fn dominant(&self) -> Emotion {
        self.iter()
            .fold((Emotion::Happiness, f64::MIN), |best, (emotion, level)| {
                if level > best.1 {
                    (emotion, level)
                } else {
                    best
                }
            })
            .0
    }

    fn slot(&mut self, emotion: Emotion) -> &mut f64 {
        match emotion {
            Emotion::Happiness => &mut self.happiness,
            Emotion::Sadness => &mut self.sadness,
            Emotion::Anger => &mut self.anger,
            Emotion::Fear => &mut self.fear,
            Emotion::Surprise => &mut self.surprise,
            Emotion::Curiosity => &mut self.curiosity,
            Emotion::Calmness => &mut self.calmness,
        }
    }
}

// ============================================================================
// ValueSet
// ============================================================================

/// Seven core values, each an integer in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSet {
    pub wisdom: u8,
    pub compassion: u8,
    pub curiosity: u8,
    pub creativity: u8,
    pub empathy: u8,
    pub integrity: u8,
    pub adaptability: u8,
}

impl Default for ValueSet {
    fn default() -> Self {
        Self {
            wisdom: 50,
            compassion: 50,
            curiosity: 50,
            creativity: 50,
            empathy: 50,
            integrity: 50,
            adaptability: 50,
        }
    }
}

impl ValueSet {
    pub fn get(&self, value: CoreValue) -> u8 {
        match value {
            CoreValue::Wisdom => self.wisdom,
            CoreValue::Compassion => self.compassion,
            CoreValue::Curiosity => self.curiosity,
            CoreValue::Creativity => self.creativity,
            CoreValue::Empathy => self.empathy,
            CoreValue::Integrity => self.integrity,
            CoreValue::Adaptability => self.adaptability,
        }
    }

    /// Raise a value, saturating at [`VALUE_MAX`]. Returns the new level.
    pub fn raise(&mut self, value: CoreValue, amount: u8) -> u8 {
        let slot = self.slot(value);
        *slot = slot.saturating_add(amount).min(VALUE_MAX);
        *slot
    }

    /// Overwrite a value, clamped to [`VALUE_MAX`].
    pub fn set(&mut self, value: CoreValue, level: u8) {
        *self.slot(value) = level.min(VALUE_MAX);
    }

    pub fn iter(&self) -> impl Iterator<Item = (CoreValue, u8)> + '_ {
        CoreValue::ALL.iter().map(move |&value| (value, self.get(value)))
    }

    fn slot(&mut self, value: CoreValue) -> &mut u8 {
        match value {
            CoreValue::Wisdom => &mut self.wisdom,
            CoreValue::Compassion => &mut self.compassion,
            CoreValue::Curiosity => &mut self.curiosity,
            CoreValue::Creativity => &mut self.creativity,
            CoreValue::Empathy => &mut self.empathy,
            CoreValue::Integrity => &mut self.integrity,
            CoreValue::Adaptability => &mut self.adaptability,
        }
    }
}

// ============================================================================
// Vitals
// ============================================================================

/// Scalar vitals; see [`Vital::range`] for the bounds of each.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub consciousness_level: f64,
    pub energy_level: f64,
    pub cognitive_load: f64,
    pub emotional_stability: f64,
    pub ethical_alignment: f64,
    pub math_skill: f64,
    pub quantum_entanglement: f64,
    pub neural_activity: f64,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            consciousness_level: Vital::ConsciousnessLevel.default_value(),
            energy_level: Vital::EnergyLevel.default_value(),
            cognitive_load: Vital::CognitiveLoad.default_value(),
            emotional_stability: Vital::EmotionalStability.default_value(),
            ethical_alignment: Vital::EthicalAlignment.default_value(),
            math_skill: Vital::MathSkill.default_value(),
            quantum_entanglement: Vital::QuantumEntanglement.default_value(),
            neural_activity: Vital::NeuralActivity.default_value(),
        }
    }
}

impl Vitals {
    pub fn get(&self, vital: Vital) -> f64 {
        match vital {
            Vital::ConsciousnessLevel => self.consciousness_level,
            Vital::EnergyLevel => self.energy_level,
            Vital::CognitiveLoad => self.cognitive_load,
            Vital::EmotionalStability => self.emotional_stability,
            Vital::EthicalAlignment => self.ethical_alignment,
            Vital::MathSkill => self.math_skill,
            Vital::QuantumEntanglement => self.quantum_entanglement,
            Vital::NeuralActivity => self.neural_activity,
        }
    }

    /// Set a vital, clamped to its range. Non-finite input is ignored.
    pub fn set(&mut self, vital: Vital, value: f64) {
        if !value.is_finite() {
            return;
        }
        *self.slot(vital) = vital.clamp_value(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Vital, f64)> + '_ {
        Vital::ALL.iter().map(move |&vital| (vital, self.get(vital)))
    }

    fn slot(&mut self, vital: Vital) -> &mut f64 {
        match vital {
            Vital::ConsciousnessLevel => &mut self.consciousness_level,
            Vital::EnergyLevel => &mut self.energy_level,
            Vital::CognitiveLoad => &mut self.cognitive_load,
            Vital::EmotionalStability => &mut self.emotional_stability,
            Vital::EthicalAlignment => &mut self.ethical_alignment,
            Vital::MathSkill => &mut self.math_skill,
            Vital::QuantumEntanglement => &mut self.quantum_entanglement,
            Vital::NeuralActivity => &mut self.neural_activity,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
