//! Line and event readers over a [`ChunkSource`].
//!
//! [`LineReader`] is the lazy, non-restartable line sequence of one stream.
//! It pulls a chunk only when no framed line is waiting, so the chunk read
//! is the only suspension point. Cancellation through a [`CancelHandle`] is
//! observed at that point too: the reader stops pulling, drops the source,
//! delivers lines already framed, discards the unterminated carry-over and
//! then reports end-of-sequence rather than an error.
//!
//! [`EventReader`] classifies each line as it is produced.

use std::collections::VecDeque;

use futures::stream::{self, Stream};
use tokio_util::sync::CancellationToken;

use super::classifier::{classify, classify_buffered, Event};
use super::decoder::LineDecoder;
use super::errors::StreamError;
use super::source::ChunkSource;

// ---------------------------------------------------------------------------
// CancelHandle
// ---------------------------------------------------------------------------

/// Cooperative cancellation signal shared between a reader and its owner.
///
/// Clones observe the same signal.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing token, e.g. a child of an application shutdown token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        self.token.cancelled().await
    }
}

// ---------------------------------------------------------------------------
// LineReader
// ---------------------------------------------------------------------------

/// Lifecycle of a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// The source may still produce chunks.
    Streaming,
    /// The source signalled end of stream.
    Completed,
    /// Cancelled before the source ended.
    Canceled,
    /// The source failed; the error was returned once.
    Failed,
}

/// Lazy sequence of non-empty lines decoded from a chunk source.
pub struct LineReader<S> {
    source: Option<S>,
    decoder: LineDecoder,
    ready: VecDeque<String>,
    cancel: CancelHandle,
    state: ReaderState,
    chunks_read: u64,
}

impl<S: ChunkSource> LineReader<S> {
    /// Create a reader with its own cancellation handle.
    pub fn new(source: S) -> Self {
        Self::with_cancel(source, CancelHandle::new())
    }

    /// Create a reader observing an existing cancellation handle.
    pub fn with_cancel(source: S, cancel: CancelHandle) -> Self {
        Self {
            source: Some(source),
            decoder: LineDecoder::new(),
            ready: VecDeque::new(),
            cancel,
            state: ReaderState::Streaming,
            chunks_read: 0,
        }
    }

    /// Handle that cancels this reader.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Number of chunks pulled from the source so far.
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }

    /// Next line, `Ok(None)` at end of sequence.
    ///
    /// A source failure is returned exactly once; afterwards the reader is
    /// exhausted.
    pub async fn next_line(&mut self) -> Result<Option<String>, StreamError> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Ok(Some(line));
            }
            if self.cancel.is_cancelled() {
                self.stop_canceled();
            }
            let Some(source) = self.source.as_mut() else {
                return Ok(None);
            };

            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                read = source.read() => Some(read),
            };

            match read {
                None => self.stop_canceled(),
                Some(Ok(Some(chunk))) => {
                    self.chunks_read += 1;
                    let framed = self.decoder.push(&chunk, &mut self.ready);
                    log::trace!("Chunk of {} bytes framed {} line(s)", chunk.len(), framed);
                }
                Some(Ok(None)) => {
                    self.source = None;
                    self.state = ReaderState::Completed;
                    if let Some(tail) = self.decoder.finish() {
                        self.ready.push_back(tail);
                    }
                    log::debug!("Stream completed after {} chunk(s)", self.chunks_read);
                }
                Some(Err(err)) => {
                    self.source = None;
                    self.state = ReaderState::Failed;
                    self.decoder.reset();
                    log::warn!("Chunk source failed after {} chunk(s): {}", self.chunks_read, err);
                    return Err(err);
                }
            }
        }
    }

    /// Full-buffer mode: decode everything left in the stream as one text,
    /// bypassing line framing.
    ///
    /// Lines already framed but not yet taken are included, each followed by
    /// LF. On cancellation the text decoded so far is returned.
    pub async fn read_to_string(mut self) -> Result<String, StreamError> {
        let mut text = String::new();
        for line in self.ready.drain(..) {
            text.push_str(&line);
            text.push('\n');
        }
        let (mut utf8, carry) = self.decoder.into_parts();
        text.push_str(&carry);

        let Some(mut source) = self.source.take() else {
            return Ok(text);
        };
        loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    utf8.reset();
                    return Ok(text);
                }
                read = source.read() => read,
            };
            match read? {
                Some(chunk) => utf8.decode_into(&chunk, &mut text),
                None => {
                    utf8.flush_into(&mut text);
                    return Ok(text);
                }
            }
        }
    }

    /// Full-buffer mode, classified: one aggregated `RawText` event.
    pub async fn read_buffered_event(self) -> Result<Event, StreamError> {
        self.read_to_string().await.map(classify_buffered)
    }

    /// Consume the reader as a `futures::Stream` of lines.
    pub fn into_stream(self) -> impl Stream<Item = Result<String, StreamError>> {
        stream::unfold(self, |mut reader| async move {
            match reader.next_line().await {
                Ok(Some(line)) => Some((Ok(line), reader)),
                Ok(None) => None,
                Err(err) => Some((Err(err), reader)),
            }
        })
    }

    fn stop_canceled(&mut self) {
        if self.source.take().is_some() {
            self.state = ReaderState::Canceled;
            if !self.decoder.is_empty() {
                log::debug!(
                    "Stream canceled, discarding {} byte(s) of unterminated text",
                    self.decoder.carry().len()
                );
            }
            self.decoder.reset();
        }
    }
}

// ---------------------------------------------------------------------------
// EventReader
// ---------------------------------------------------------------------------

/// Classifying wrapper around [`LineReader`].
pub struct EventReader<S> {
    lines: LineReader<S>,
    parsed: u64,
    raw: u64,
}

impl<S: ChunkSource> EventReader<S> {
    pub fn new(source: S) -> Self {
        Self::from_lines(LineReader::new(source))
    }

    pub fn with_cancel(source: S, cancel: CancelHandle) -> Self {
        Self::from_lines(LineReader::with_cancel(source, cancel))
    }

    pub fn from_lines(lines: LineReader<S>) -> Self {
        Self {
            lines,
            parsed: 0,
            raw: 0,
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.lines.cancel_handle()
    }

    pub fn state(&self) -> ReaderState {
        self.lines.state()
    }

    /// `(parsed, raw)` events produced so far.
    pub fn counts(&self) -> (u64, u64) {
        (self.parsed, self.raw)
    }

    pub async fn next_event(&mut self) -> Result<Option<Event>, StreamError> {
        let Some(line) = self.lines.next_line().await? else {
            return Ok(None);
        };
        let event = classify(&line);
        if event.is_parsed() {
            self.parsed += 1;
        } else {
            self.raw += 1;
        }
        Ok(Some(event))
    }

    /// Consume the reader as a `futures::Stream` of events.
    pub fn into_stream(self) -> impl Stream<Item = Result<Event, StreamError>> {
        stream::unfold(self, |mut reader| async move {
            match reader.next_event().await {
                Ok(Some(event)) => Some((Ok(event), reader)),
                Ok(None) => None,
                Err(err) => Some((Err(err), reader)),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::source::{ChannelChunkSource, FixedChunkSource, ListChunkSource};
    use bytes::Bytes;
    use futures::StreamExt;
    use serde_json::json;

    async fn collect_lines<S: ChunkSource>(mut reader: LineReader<S>) -> Vec<String> {
        let mut lines = Vec::new();
        while let Some(line) = reader.next_line().await.unwrap() {
            lines.push(line);
        }
        lines
    }

    #[tokio::test]
    async fn test_split_json_scenario() {
        let source = ListChunkSource::from_chunks(vec!["{\"a\":1}\n{\"b\"", ":2}\n"]);
        let mut reader = EventReader::new(source);

        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(Event::ParsedObject(json!({"a": 1})))
        );
        assert_eq!(
            reader.next_event().await.unwrap(),
            Some(Event::ParsedObject(json!({"b": 2})))
        );
        assert_eq!(reader.next_event().await.unwrap(), None);
        assert_eq!(reader.state(), ReaderState::Completed);
        assert_eq!(reader.counts(), (2, 0));
    }

    #[tokio::test]
    async fn test_fixed_chunks_reassemble_multibyte() {
        let text = "première ligne\n🦀 second\nçà et là";
        for size in 1..=8 {
            let reader = LineReader::new(FixedChunkSource::new(text, size));
            let lines = collect_lines(reader).await;
            assert_eq!(lines.join("\n"), text, "chunk size {size}");
        }
    }

    #[tokio::test]
    async fn test_empty_lines_never_yielded() {
        let reader = LineReader::new(ListChunkSource::from_chunks(vec!["a\n\n", "\nb"]));
        assert_eq!(collect_lines(reader).await, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_read_failure_propagates_once() {
        let (tx, source) = ChannelChunkSource::pair(4);
        tx.send(Ok(Bytes::from_static(b"first\nsec"))).await.unwrap();
        tx.send(Err(StreamError::interrupted("connection reset")))
            .await
            .unwrap();

        let mut reader = LineReader::new(source);
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("first"));
        let err = reader.next_line().await.unwrap_err();
        assert_eq!(err.to_string(), "stream interrupted: connection reset");
        assert_eq!(reader.state(), ReaderState::Failed);
        assert!(reader.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_between_lines_keeps_framed_drops_partial() {
        let (tx, source) = ChannelChunkSource::pair(4);
        tx.send(Ok(Bytes::from_static(b"one\ntwo\nthr"))).await.unwrap();

        let mut reader = LineReader::new(source);
        let cancel = reader.cancel_handle();

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("one"));
        cancel.cancel();
        tx.send(Ok(Bytes::from_static(b"ee\n"))).await.unwrap();

        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("two"));
        assert!(reader.next_line().await.unwrap().is_none());
        assert_eq!(reader.state(), ReaderState::Canceled);
        assert!(reader.next_line().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_while_waiting_for_chunk() {
        let (tx, source) = ChannelChunkSource::pair(4);
        let mut reader = LineReader::new(source);
        let cancel = reader.cancel_handle();

        let waiter = tokio::spawn(async move {
            let result = reader.next_line().await;
            (result, reader.state())
        });
        tokio::task::yield_now().await;
        cancel.cancel();

        let (result, state) = waiter.await.unwrap();
        assert!(result.unwrap().is_none());
        assert_eq!(state, ReaderState::Canceled);
        // The source was released, so the sender sees a closed channel.
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_shared_cancel_handle_before_start() {
        let cancel = CancelHandle::new();
        cancel.cancel();
        let mut reader = LineReader::with_cancel(FixedChunkSource::new("x\n", 1), cancel);
        assert!(reader.next_line().await.unwrap().is_none());
        assert_eq!(reader.chunks_read(), 0);
    }

    #[tokio::test]
    async fn test_parent_token_cancels_reader() {
        let shutdown = CancellationToken::new();
        let (tx, source) = ChannelChunkSource::pair(4);
        let mut reader =
            EventReader::with_cancel(source, CancelHandle::from_token(shutdown.child_token()));
        tx.send(Ok(Bytes::from_static(b"{\"a\":1}\npartial"))).await.unwrap();

        assert!(reader.next_event().await.unwrap().is_some());
        shutdown.cancel();
        assert!(reader.cancel_handle().is_cancelled());
        assert!(reader.next_event().await.unwrap().is_none());
        assert_eq!(reader.state(), ReaderState::Canceled);
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_read_to_string_stops_on_cancel() {
        let (tx, source) = ChannelChunkSource::pair(4);
        tx.send(Ok(Bytes::from_static(b"first\nkept \xF0\x9F"))).await.unwrap();
        let mut reader = LineReader::new(source);
        assert_eq!(reader.next_line().await.unwrap().as_deref(), Some("first"));

        reader.cancel_handle().cancel();
        // The unfinished character is discarded, not replaced.
        assert_eq!(reader.read_to_string().await.unwrap(), "kept ");
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_into_stream() {
        let reader = LineReader::new(ListChunkSource::from_chunks(vec!["x\ny", "\nz"]));
        let lines: Vec<String> = reader
            .into_stream()
            .map(|line| line.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_read_to_string_bypasses_framing() {
        let text = "{\"a\":1}\n\nnot json\n🦀";
        let reader = LineReader::new(FixedChunkSource::new(text, 3));
        assert_eq!(reader.read_to_string().await.unwrap(), text);
    }

    #[tokio::test]
    async fn test_read_buffered_event() {
        let reader = LineReader::new(ListChunkSource::from_chunks(vec!["{\"a\"", ":1}\n"]));
        assert_eq!(
            reader.read_buffered_event().await.unwrap(),
            Event::RawText("{\"a\":1}\n".to_string())
        );
    }

    #[tokio::test]
    async fn test_event_stream_mixed() {
        let source = ListChunkSource::from_chunks(vec!["hello there\n{\"mood\":\"calm\"}\n"]);
        let events: Vec<Event> = EventReader::new(source)
            .into_stream()
            .map(|event| event.unwrap())
            .collect()
            .await;
        assert_eq!(
            events,
            vec![
                Event::RawText("hello there".into()),
                Event::ParsedObject(json!({"mood": "calm"})),
            ]
        );
    }
}
