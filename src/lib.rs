//! # persona-stream
//!
//! Turns a live, chunked NDJSON stream of assistant output into events and
//! uses them to drive a bounded affective state (mood, emotions, values,
//! vitals, memory) that parameterizes the assistant's persona.
//!
//! ```text
//! bytes ─▶ stream::LineReader ─▶ stream::classify ─▶ pipeline::EventMapper ─▶ affect::AffectiveState
//! ```
//!
//! - [`stream`] — incremental UTF-8 decoding, LF framing, classification.
//! - [`affect`] — the clamped state container and its total mutations.
//! - [`pipeline`] — event-to-mutation mapping and the response cycle driver.

pub mod affect;
pub mod pipeline;
pub mod stream;

// Re-exports
pub use affect::{AffectConfig, AffectSnapshot, AffectiveState, MutationMode};
pub use pipeline::{run_response_cycle, AffectHandle, CycleReport, DirectiveMapper, EventMapper};
pub use stream::{classify, ChunkSource, Event, EventReader, LineReader, StreamError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
