//! Event sink port: "deliver one event to the remote subscriber".
//!
//! The SSE adapter implements this over a channel feeding the HTTP response.
//! A send that fails means the subscriber is gone; the session treats that
//! exactly like a disconnect signal.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::StreamEvent;

/// The subscriber is no longer listening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("event sink closed")]
pub struct SinkClosed;

/// Destination for stream events.
///
/// Implementations must deliver events in the order `send` is called.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn send(&self, event: StreamEvent) -> Result<(), SinkClosed>;

    /// Resolves once the subscriber has gone away.
    ///
    /// Lets a session notice a disconnect while the process is silent. Sinks
    /// that cannot observe this never resolve.
    async fn closed(&self) {
        std::future::pending::<()>().await;
    }
}

/// In-memory sink that records every event it receives.
///
/// Optionally reports itself closed after a number of events, which is how
/// tests stand in for a subscriber that goes away mid-stream.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<StreamEvent>>>,
    capacity: Option<usize>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that accepts `n` events and then behaves as disconnected.
    pub fn closing_after(n: usize) -> Self {
        Self {
            events: Arc::default(),
            capacity: Some(n),
        }
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Rendered text of every recorded event.
    pub fn rendered(&self) -> Vec<String> {
        self.events().iter().map(StreamEvent::render).collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn send(&self, event: StreamEvent) -> Result<(), SinkClosed> {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        if self.capacity.is_some_and(|cap| events.len() >= cap) {
            return Err(SinkClosed);
        }
        events.push(event);
        Ok(())
    }
}
