//! One response cycle: stream → events → mutations → reflect.

use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde::{Deserialize, Serialize};
use tracing::Instrument;

use super::mapper::EventMapper;
use crate::affect::{AffectSnapshot, AffectiveState};
use crate::stream::{ChunkSource, Event, EventReader, ReaderState, StreamError};

// ============================================================================
// AffectHandle
// ============================================================================

/// Shared, lock-guarded handle to one [`AffectiveState`].
///
/// The state itself is single-writer; this is the mutual-exclusion boundary
/// for callers that mutate it from several tasks. The lock is never held
/// across an await.
#[derive(Debug, Clone, Default)]
pub struct AffectHandle {
    inner: Arc<Mutex<AffectiveState>>,
}

impl AffectHandle {
    pub fn new(state: AffectiveState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Run `f` with exclusive access to the state.
    pub fn with<R>(&self, f: impl FnOnce(&mut AffectiveState) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn lock(&self) -> MutexGuard<'_, AffectiveState> {
        self.inner.lock()
    }

    pub fn snapshot(&self) -> AffectSnapshot {
        self.inner.lock().snapshot()
    }
}

// ============================================================================
// CycleReport
// ============================================================================

/// Outcome of [`run_response_cycle`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleReport {
    /// Events applied.
    pub events: u64,
    /// `ParsedObject` events.
    pub parsed: u64,
    /// `RawText` events.
    pub raw: u64,
    /// Events whose mapping reported an out-of-domain mutation.
    pub rejected: u64,
    /// The stream was canceled before it completed.
    pub canceled: bool,
    /// `reflect()` ran at the end of the cycle.
    pub reflected: bool,
}

// ============================================================================
// Cycle driver
// ============================================================================

/// Drain `reader`, applying every event to the state behind `handle`.
///
/// `reflect()` runs once when the stream completes. A canceled stream ends
/// the cycle without reflecting; a read failure aborts it and is returned.
pub async fn run_response_cycle<S, M>(
    reader: &mut EventReader<S>,
    handle: &AffectHandle,
    mapper: &M,
) -> Result<CycleReport, StreamError>
where
    S: ChunkSource,
    M: EventMapper + ?Sized,
{
    run_response_cycle_with(reader, handle, mapper, |_| {}).await
}

/// Like [`run_response_cycle`], also passing each event to `observer`
/// before it is applied.
pub async fn run_response_cycle_with<S, M, F>(
    reader: &mut EventReader<S>,
    handle: &AffectHandle,
    mapper: &M,
    mut observer: F,
) -> Result<CycleReport, StreamError>
where
    S: ChunkSource,
    M: EventMapper + ?Sized,
    F: FnMut(&Event),
{
    let span = tracing::info_span!("response_cycle");
    async move {
        let mut report = CycleReport::default();

        while let Some(event) = reader.next_event().await? {
            observer(&event);
            report.events += 1;
            if event.is_parsed() {
                report.parsed += 1;
            } else {
                report.raw += 1;
            }
            if let Err(err) = handle.with(|state| mapper.apply(&event, state)) {
                report.rejected += 1;
                log::warn!("Rejected mutation from event #{}: {}", report.events, err);
            }
        }

        match reader.state() {
            ReaderState::Completed => {
                handle.with(AffectiveState::reflect);
                report.reflected = true;
            }
            ReaderState::Canceled => report.canceled = true,
            ReaderState::Streaming | ReaderState::Failed => {}
        }

        tracing::info!(
            events = report.events,
            rejected = report.rejected,
            canceled = report.canceled,
            "response cycle finished"
        );
        Ok(report)
    }
    .instrument(span)
    .await
}

// ============================================================================
// Tests
// ============================================================================
