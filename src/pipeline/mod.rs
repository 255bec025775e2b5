//! Integration layer between the stream and the affect engine.
//!
//! ```text
//! EventReader ──event──▶ EventMapper ──mutation──▶ AffectHandle (lock)
//!                                                     │
//!                               stream completed ──▶ reflect()
//! ```

pub mod cycle;
pub mod mapper;

pub use cycle::{run_response_cycle, run_response_cycle_with, AffectHandle, CycleReport};
pub use mapper::{DirectiveMapper, EventMapper, NoopMapper, DEFAULT_EMOTION_DELTA};
