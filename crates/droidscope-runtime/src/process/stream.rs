//! Async pipe readers (non-UTF8-safe).
//!
//! Device tools can emit non-UTF8 bytes and carriage-return progress output.
//! Reading raw chunks and splitting them with a `LineMultiplexer` keeps the
//! reader alive on bad bytes and never hands out half a line.

use droidscope_core::{Line, LineMultiplexer, Origin};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

const READ_CHUNK: usize = 8 * 1024;

/// Read `stream` to EOF, forwarding each complete line to `tx`.
///
/// The task ends at EOF, on a read error, or when the receiving side is
/// dropped. Dropping the task drops the pipe.
pub fn spawn_stream_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    origin: Origin,
    pid: Option<u32>,
    tx: mpsc::Sender<Line>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = stream;
        let mut mux = LineMultiplexer::new(origin);
        let mut buf = vec![0u8; READ_CHUNK];
        let stream_type = origin.as_str();

        loop {
            match reader.read(&mut buf).await {
                Ok(0) => break, // EOF
                Ok(n) => {
                    for line in mux.feed(&buf[..n]) {
                        trace!(?pid, %stream_type, "{}", line.text);
                        if tx.send(line).await.is_err() {
                            debug!(?pid, %stream_type, "line receiver dropped, reader exiting");
                            return;
                        }
                    }
                }
                Err(e) => {
                    debug!(?pid, %stream_type, error = %e, "stream reader exiting due to read error");
                    break;
                }
            }
        }

        if let Some(line) = mux.flush() {
            let _ = tx.send(line).await;
        }
        debug!(?pid, %stream_type, "stream reader task exiting");
    })
}
