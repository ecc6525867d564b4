//! SSE transport for session streams.
//!
//! A streaming session runs in its own task and writes into an
//! [`SseSink`]. The receiving half becomes the response body. When the
//! client disconnects, axum drops the body, the channel closes, and the
//! session kills its process.

use std::convert::Infallible;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use droidscope_core::{EventSink, SinkClosed, StreamEvent};
use droidscope_runtime::StreamSession;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Frames buffered between a session and its HTTP response.
const FRAME_BUFFER: usize = 256;

/// Interval of the keep-alive comment frame.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Event sink writing SSE frames into a response body channel.
#[derive(Debug, Clone)]
pub struct SseSink {
    sender: mpsc::Sender<Result<Event, Infallible>>,
}

impl SseSink {
    pub fn channel() -> (Self, mpsc::Receiver<Result<Event, Infallible>>) {
        let (sender, receiver) = mpsc::channel(FRAME_BUFFER);
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl EventSink for SseSink {
    async fn send(&self, event: StreamEvent) -> Result<(), SinkClosed> {
        self.sender
            .send(Ok(frame(&event)))
            .await
            .map_err(|_| SinkClosed)
    }

    async fn closed(&self) {
        self.sender.closed().await;
    }
}

/// One `data:` frame for `event`.
///
/// SSE cannot carry a carriage return inside a frame, so any left in the
/// rendered text are dropped.
pub fn frame(event: &StreamEvent) -> Event {
    let mut text = event.render();
    text.retain(|c| c != '\r');
    Event::default().data(text)
}

/// Run `session` in the background and stream it as the response.
pub fn stream_session(session: StreamSession) -> Response {
    let (sink, receiver) = SseSink::channel();
    let session_id = session.id();

    tokio::spawn(async move {
        let outcome = session.run(&sink).await;
        debug!(%session_id, ?outcome, "session task finished");
    });

    let sse = Sse::new(ReceiverStream::new(receiver))
        .keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL).text("ping"));
    ([(header::CONNECTION, "keep-alive")], sse).into_response()
}
