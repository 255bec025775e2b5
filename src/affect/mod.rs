//! Affective state — the bounded mood/emotion/memory model behind the persona.
//!
//! # Architecture
//!
//! ```text
//! AffectiveState
//!   ├── Mood (10 values) + mood history
//!   ├── EmotionalVector (7 × [0,1])
//!   ├── ValueSet (7 × [0,100], grows with feedback)
//!   ├── Vitals (8 scalars, per-vital ranges)
//!   └── MemoryRing (FIFO, capacity 50)
//! ```
//!
//! The engine knows nothing about streams or events. Mapping events to
//! mutations happens in [`crate::pipeline`].

pub mod config;
pub mod errors;
pub mod memory;
pub mod state;
pub mod types;
pub mod vectors;

// Re-exports
pub use config::{AffectConfig, ConfigError, MutationMode};
pub use errors::AffectError;
pub use memory::{MemoryRecord, MemoryRing, DEFAULT_MEMORY_CAPACITY, MAX_MEMORY_CAPACITY};
pub use state::{AffectSnapshot, AffectiveState, MoodChange};
pub use types::{CoreValue, Emotion, Feedback, Mood, Vital};
pub use vectors::{EmotionalVector, ValueSet, Vitals};
