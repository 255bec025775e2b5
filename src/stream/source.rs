//! Chunk sources — the pull side of the decoder.
//!
//! A [`ChunkSource`] hands out raw byte chunks in arrival order until the
//! stream ends. It may fail on any read; the failure is terminal and the
//! reader propagates it unchanged.
//!
//! Provided sources:
//!
//! - [`ChannelChunkSource`]: a tokio channel fed by a background task.
//! - [`ByteStreamSource`]: any `futures::Stream` of byte results, including
//!   `reqwest::Response::bytes_stream()` via
//!   [`HttpChunkSource::from_response`].
//! - [`FixedChunkSource`]: an in-memory buffer served in fixed-size slices.

use std::convert::Infallible;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tokio::sync::mpsc;

use super::errors::StreamError;

// ---------------------------------------------------------------------------
// ChunkSource trait
// ---------------------------------------------------------------------------

/// Pull-based source of byte chunks.
#[async_trait]
pub trait ChunkSource: Send {
    /// Get the next chunk.
    ///
    /// Returns `Ok(None)` once the stream is complete.
    async fn read(&mut self) -> Result<Option<Bytes>, StreamError>;
}

#[async_trait]
impl<S: ChunkSource + ?Sized> ChunkSource for Box<S> {
    async fn read(&mut self) -> Result<Option<Bytes>, StreamError> {
        (**self).read().await
    }
}

// ---------------------------------------------------------------------------
// ChannelChunkSource
// ---------------------------------------------------------------------------

/// A `ChunkSource` backed by a tokio mpsc channel.
///
/// The stream ends when every sender is dropped. Sending an `Err` makes the
/// next read fail.
pub struct ChannelChunkSource {
    rx: mpsc::Receiver<Result<Bytes, StreamError>>,
}

impl ChannelChunkSource {
    /// Create a new channel-backed chunk source.
    pub fn new(rx: mpsc::Receiver<Result<Bytes, StreamError>>) -> Self {
        Self { rx }
    }

    /// Create a matched pair of sender + source.
    pub fn pair(buffer: usize) -> (mpsc::Sender<Result<Bytes, StreamError>>, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (tx, Self { rx })
    }
}

#[async_trait]
impl ChunkSource for ChannelChunkSource {
    async fn read(&mut self) -> Result<Option<Bytes>, StreamError> {
        self.rx.recv().await.transpose()
    }
}

// ---------------------------------------------------------------------------
// ByteStreamSource
// ---------------------------------------------------------------------------

/// Adapts a `futures::Stream` of byte results into a `ChunkSource`.
///
/// Stream errors become [`StreamError::Interrupted`] carrying the error's
/// display text.
pub struct ByteStreamSource<S> {
    inner: S,
}

/// Chunk source over an HTTP response body.
pub type HttpChunkSource = ByteStreamSource<BoxStream<'static, reqwest::Result<Bytes>>>;

/// Chunk source over a fixed list of in-memory chunks.
pub type ListChunkSource = ByteStreamSource<stream::Iter<std::vec::IntoIter<Result<Bytes, Infallible>>>>;

impl<S> ByteStreamSource<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl ListChunkSource {
    /// Serve the given chunks in order, then end the stream.
    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks: Vec<Result<Bytes, Infallible>> =
            chunks.into_iter().map(|chunk| Ok(chunk.into())).collect();
        ByteStreamSource::new(stream::iter(chunks))
    }
}

impl HttpChunkSource {
    /// Stream the body of an HTTP response.
    ///
    /// A non-success status is reported up front as [`StreamError::Http`]
    /// without reading the body.
    pub fn from_response(response: reqwest::Response) -> Result<Self, StreamError> {
        let status = response.status();
        if !status.is_success() {
            return Err(StreamError::Http {
                status: status.as_u16(),
            });
        }
        log::debug!("Streaming response body from {}", response.url());
        Ok(ByteStreamSource::new(response.bytes_stream().boxed()))
    }
}

#[async_trait]
impl<S, B, E> ChunkSource for ByteStreamSource<S>
where
    S: Stream<Item = Result<B, E>> + Unpin + Send,
    B: Into<Bytes> + Send,
    E: std::fmt::Display + Send,
{
    async fn read(&mut self) -> Result<Option<Bytes>, StreamError> {
        match self.inner.next().await {
            Some(Ok(chunk)) => Ok(Some(chunk.into())),
            Some(Err(err)) => Err(StreamError::interrupted(err)),
            None => Ok(None),
        }
    }
}

// ---------------------------------------------------------------------------
// FixedChunkSource
// ---------------------------------------------------------------------------

/// Serves an in-memory buffer in slices of at most `chunk_size` bytes.
///
/// Slices are zero-copy views and ignore character boundaries, which makes
/// this useful for replaying captured streams.
#[derive(Debug, Clone)]
pub struct FixedChunkSource {
    data: Bytes,
    chunk_size: usize,
}

impl FixedChunkSource {
    /// A `chunk_size` of zero is treated as one.
    pub fn new(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self {
            data: data.into(),
            chunk_size: chunk_size.max(1),
        }
    }

    /// Bytes not yet served.
    pub fn remaining(&self) -> usize {
        self.data.len()
    }
}

#[async_trait]
impl ChunkSource for FixedChunkSource {
    async fn read(&mut self) -> Result<Option<Bytes>, StreamError> {
        if self.data.is_empty() {
            return Ok(None);
        }
        let take = self.chunk_size.min(self.data.len());
        Ok(Some(self.data.split_to(take)))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
