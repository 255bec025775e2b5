//! Stream decoding errors.

use thiserror::Error;

/// Errors surfaced while pulling chunks from a [`ChunkSource`](super::source::ChunkSource).
///
/// Every variant is terminal for the stream that produced it. The reader
/// never retries; retry policy belongs to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    /// The chunk source failed mid-stream.
    #[error("stream interrupted: {message}")]
    Interrupted { message: String },

    /// The remote service answered with a non-success HTTP status.
    #[error("stream interrupted: HTTP status {status}")]
    Http { status: u16 },
}

impl StreamError {
    /// Build an [`StreamError::Interrupted`] from anything displayable.
    pub fn interrupted(message: impl std::fmt::Display) -> Self {
        Self::Interrupted {
            message: message.to_string(),
        }
    }
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Http {
                status: status.as_u16(),
            },
            None => Self::interrupted(err),
        }
    }
}
