//! Closed name spaces of the affective state.
//!
//! Emotions, core values, moods, feedback kinds and vitals are enums, not
//! open string maps, so a typo can never create a new field. Free-form names
//! coming off the wire are resolved with `from_name`, which ignores case and
//! `_`/`-`/space separators (`energyLevel`, `energy_level` and
//! `Energy Level` all resolve to [`Vital::EnergyLevel`]).

use std::fmt;

use serde::{Deserialize, Serialize};

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Declare a closed name enum with its canonical names.
macro_rules! closed_names {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $name {
            /// Every member, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical snake_case name.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Resolve a free-form name, `None` when it is not a member.
            pub fn from_name(name: &str) -> Option<Self> {
                let key = normalize_name(name);
                Self::ALL
                    .iter()
                    .copied()
                    .find(|member| normalize_name(member.as_str()) == key)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

closed_names! {
    /// Dimensions of the emotional vector, each in `[0, 1]`.
    Emotion {
        Happiness => "happiness",
        Sadness => "sadness",
        Anger => "anger",
        Fear => "fear",
        Surprise => "surprise",
        Curiosity => "curiosity",
        Calmness => "calmness",
    }
}

closed_names! {
    /// Core values, each an integer in `[0, 100]`.
    CoreValue {
        Wisdom => "wisdom",
        Compassion => "compassion",
        Curiosity => "curiosity",
        Creativity => "creativity",
        Empathy => "empathy",
        Integrity => "integrity",
        Adaptability => "adaptability",
    }
}

closed_names! {
    /// The ten moods the persona can be in.
    #[derive(Default)]
    Mood {
        #[default]
        Neutral => "neutral",
        Happy => "happy",
        Sad => "sad",
        Excited => "excited",
        Calm => "calm",
        Curious => "curious",
        Thoughtful => "thoughtful",
        Playful => "playful",
        Anxious => "anxious",
        Frustrated => "frustrated",
    }
}

closed_names! {
    /// User feedback on a response.
    Feedback {
        Positive => "positive",
        Negative => "negative",
    }
}

closed_names! {
    /// Scalar vitals, each clamped to its own range.
    Vital {
        ConsciousnessLevel => "consciousness_level",
        EnergyLevel => "energy_level",
        CognitiveLoad => "cognitive_load",
        EmotionalStability => "emotional_stability",
        EthicalAlignment => "ethical_alignment",
        MathSkill => "math_skill",
        QuantumEntanglement => "quantum_entanglement",
        NeuralActivity => "neural_activity",
    }
}

impl Vital {
    /// Inclusive `(min, max)` range.
    pub fn range(&self) -> (f64, f64) {
        match self {
            Vital::QuantumEntanglement => (0.0, 1.0),
            _ => (0.0, 100.0),
        }
    }

    pub fn default_value(&self) -> f64 {
        match self {
            Vital::ConsciousnessLevel => 75.0,
            Vital::EnergyLevel => 100.0,
            Vital::CognitiveLoad => 0.0,
            Vital::EmotionalStability => 80.0,
            Vital::EthicalAlignment => 90.0,
            Vital::MathSkill => 50.0,
            Vital::QuantumEntanglement => 0.5,
            Vital::NeuralActivity => 50.0,
        }
    }

    /// Clamp `value` into this vital's range.
    pub fn clamp_value(&self, value: f64) -> f64 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_sizes() {
        assert_eq!(Emotion::ALL.len(), 7);
        assert_eq!(CoreValue::ALL.len(), 7);
        assert_eq!(Mood::ALL.len(), 10);
        assert_eq!(Feedback::ALL.len(), 2);
        assert_eq!(Vital::ALL.len(), 8);
    }

    #[test]
    fn test_default_mood_is_neutral() {
        assert_eq!(Mood::default(), Mood::Neutral);
    }

    #[test]
    fn test_from_name_accepts_spellings() {
        assert_eq!(Vital::from_name("energyLevel"), Some(Vital::EnergyLevel));
        assert_eq!(Vital::from_name("energy_level"), Some(Vital::EnergyLevel));
        assert_eq!(Vital::from_name(" Energy Level "), Some(Vital::EnergyLevel));
        assert_eq!(Emotion::from_name("HAPPINESS"), Some(Emotion::Happiness));
        assert_eq!(Mood::from_name("thoughtful"), Some(Mood::Thoughtful));
    }

    #[test]
    fn test_from_name_rejects_unknown() {
        assert_eq!(Emotion::from_name("happines"), None);
        assert_eq!(Mood::from_name("ecstatic"), None);
        assert_eq!(Feedback::from_name("neutral"), None);
        assert_eq!(CoreValue::from_name(""), None);
    }

    #[test]
    fn test_serde_uses_canonical_names() {
        assert_eq!(
            serde_json::to_string(&Vital::QuantumEntanglement).unwrap(),
            "\"quantum_entanglement\""
        );
        let mood: Mood = serde_json::from_str("\"playful\"").unwrap();
        assert_eq!(mood, Mood::Playful);
    }

    #[test]
    fn test_vital_defaults_within_range() {
        for vital in Vital::ALL {
            let (min, max) = vital.range();
            let value = vital.default_value();
            assert!(value >= min && value <= max, "{vital} default out of range");
        }
        assert_eq!(Vital::QuantumEntanglement.clamp_value(3.0), 1.0);
        assert_eq!(Vital::CognitiveLoad.clamp_value(-1.0), 0.0);
    }
}
