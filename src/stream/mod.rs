//! NDJSON stream ingestion.
//!
//! ```text
//! ChunkSource (bytes, arrival order)
//!   ↓  Utf8Decoder (split characters carried across chunks)
//!   ↓  LineDecoder (LF framing, carry-over text)
//! LineReader  → lines
//!   ↓  classify()
//! EventReader → Event::ParsedObject | Event::RawText
//! ```
//!
//! One reader is driven by one consumer. Decoding and classification never
//! suspend; the chunk read is the only await point and the only place
//! cancellation is observed.

pub mod classifier;
pub mod decoder;
pub mod errors;
pub mod reader;
pub mod source;

pub use classifier::{classify, classify_buffered, Event};
pub use decoder::{LineDecoder, Utf8Decoder};
pub use errors::StreamError;
pub use reader::{CancelHandle, EventReader, LineReader, ReaderState};
pub use source::{
    ByteStreamSource, ChannelChunkSource, ChunkSource, FixedChunkSource, HttpChunkSource,
    ListChunkSource,
};
