//! Affect engine configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! mode: strict
//! memory_capacity: 50
//! mood_history_limit: 500
//! initial_mood: curious
//! emotions:
//!   happiness: 0.8
//! values:
//!   empathy: 70
//! vitals:
//!   energy_level: 90
//! ```
//!
//! Every field is optional. Overrides are clamped into range when the state
//! is built.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::memory::{DEFAULT_MEMORY_CAPACITY, MAX_MEMORY_CAPACITY};
use super::types::{CoreValue, Emotion, Mood, Vital};

/// How name-based mutations treat names outside the closed name spaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationMode {
    /// Log and ignore.
    #[default]
    Lenient,
    /// Return an [`AffectError`](super::errors::AffectError).
    Strict,
}

/// Errors raised while loading an [`AffectConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration validation failed.
    #[error("Validation error: {0}")]
    Invalid(String),
}

/// Construction parameters of an [`AffectiveState`](super::state::AffectiveState).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffectConfig {
    pub mode: MutationMode,
    /// Records kept in the memory ring, `1..=50`.
    pub memory_capacity: usize,
    /// Cap on mood history entries; `None` keeps every change. Zero is
    /// invalid.
    pub mood_history_limit: Option<usize>,
    pub initial_mood: Mood,
    pub emotions: BTreeMap<Emotion, f64>,
    pub values: BTreeMap<CoreValue, u8>,
    pub vitals: BTreeMap<Vital, f64>,
}

impl Default for AffectConfig {
    fn default() -> Self {
        Self {
            mode: MutationMode::Lenient,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
            mood_history_limit: None,
            initial_mood: Mood::Neutral,
            emotions: BTreeMap::new(),
            values: BTreeMap::new(),
            vitals: BTreeMap::new(),
        }
    }
}

impl AffectConfig {
    /// Parse and validate a config from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a config from a YAML file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_capacity == 0 || self.memory_capacity > MAX_MEMORY_CAPACITY {
            return Err(ConfigError::Invalid(format!(
                "memory_capacity must be between 1 and {}",
                MAX_MEMORY_CAPACITY
            )));
        }
        if self.mood_history_limit == Some(0) {
            return Err(ConfigError::Invalid(
                "mood_history_limit must be at least 1".to_string(),
            ));
        }
        for (emotion, level) in &self.emotions {
            if !level.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "emotion '{}' must be a finite number",
                    emotion
                )));
            }
        }
        for (vital, level) in &self.vitals {
            if !level.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "vital '{}' must be a finite number",
                    vital
                )));
            }
        }
        Ok(())
    }

    pub fn strict(mut self) -> Self {
        self.mode = MutationMode::Strict;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AffectConfig::default();
        assert_eq!(config.mode, MutationMode::Lenient);
        assert_eq!(config.memory_capacity, 50);
        assert!(config.mood_history_limit.is_none());
        assert_eq!(config.initial_mood, Mood::Neutral);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config = AffectConfig::from_yaml_str(
            r#"
mode: strict
initial_mood: curious
emotions:
  happiness: 0.8
values:
  empathy: 70
vitals:
  energy_level: 90
"#,
        )
        .unwrap();
        assert_eq!(config.mode, MutationMode::Strict);
        assert_eq!(config.initial_mood, Mood::Curious);
        assert_eq!(config.emotions[&Emotion::Happiness], 0.8);
        assert_eq!(config.values[&CoreValue::Empathy], 70);
        assert_eq!(config.vitals[&Vital::EnergyLevel], 90.0);
        assert_eq!(config.memory_capacity, 50);
    }

    #[test]
    fn test_unknown_mood_rejected() {
        let err = AffectConfig::from_yaml_str("initial_mood: ecstatic").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_zero_capacity_invalid() {
        let err = AffectConfig::from_yaml_str("memory_capacity: 0").unwrap_err();
        assert!(err.to_string().contains("memory_capacity"));
    }

    #[test]
    fn test_memory_capacity_above_fifty_invalid() {
        let err = AffectConfig::from_yaml_str("memory_capacity: 500").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(AffectConfig::from_yaml_str("memory_capacity: 50").is_ok());
        assert!(AffectConfig::from_yaml_str("memory_capacity: 10").is_ok());
    }

    #[test]
    fn test_zero_mood_history_limit_invalid() {
        let err = AffectConfig::from_yaml_str("mood_history_limit: 0").unwrap_err();
        assert!(err.to_string().contains("mood_history_limit"));
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "mood_history_limit: 10").unwrap();
        let config = AffectConfig::from_path(file.path()).unwrap();
        assert_eq!(config.mood_history_limit, Some(10));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = AffectConfig::from_path("/nonexistent/affect.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
