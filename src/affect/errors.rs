//! Out-of-domain mutation errors.
//!
//! These are only ever returned in [`MutationMode::Strict`](super::config::MutationMode).
//! In lenient mode the same conditions are logged and ignored. Either way the
//! state is left untouched.

use thiserror::Error;

/// A mutation referenced something outside the closed name spaces, or
/// carried an unusable number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AffectError {
    #[error("Unknown emotion: {0}")]
    UnknownEmotion(String),

    #[error("Unknown value: {0}")]
    UnknownValue(String),

    #[error("Unknown mood: {0}")]
    UnknownMood(String),

    #[error("Unknown feedback kind: {0}")]
    UnknownFeedback(String),

    #[error("Unknown vital: {0}")]
    UnknownVital(String),

    /// NaN or infinite delta.
    #[error("Non-finite delta {delta} for {target}")]
    NonFiniteDelta { target: String, delta: f64 },

    /// A directive field had the wrong JSON type.
    #[error("Malformed directive field '{field}': {reason}")]
    MalformedDirective { field: String, reason: String },
}
