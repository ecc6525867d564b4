//! Byte chunks to complete lines.
//!
//! Pipes deliver output in arbitrary chunks that rarely line up with line
//! boundaries. [`LineMultiplexer`] keeps the unterminated tail of each chunk
//! and only hands out lines once their terminator has arrived (or the stream
//! has closed). Splitting happens on raw bytes and decoding happens per line,
//! so a multi-byte character cut in half by a chunk boundary survives.
//!
//! One multiplexer serves one stream; stdout and stderr each get their own so
//! their carry-over buffers never mix.

use crate::domain::{Line, Origin};

/// Line splitter for a single output stream.
#[derive(Debug)]
pub struct LineMultiplexer {
    origin: Origin,
    carry: Vec<u8>,
}

impl LineMultiplexer {
    pub const fn new(origin: Origin) -> Self {
        Self {
            origin,
            carry: Vec::new(),
        }
    }

    pub const fn origin(&self) -> Origin {
        self.origin
    }

    /// Bytes waiting for a terminator.
    pub fn pending(&self) -> usize {
        self.carry.len()
    }

    /// Feed one chunk; returns every line completed by it, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut rest = chunk;

        while let Some(pos) = rest.iter().position(|&b| b == b'\n') {
            let (head, tail) = rest.split_at(pos);
            rest = &tail[1..];

            let line = if self.carry.is_empty() {
                self.decode(head)
            } else {
                self.carry.extend_from_slice(head);
                let buffered = std::mem::take(&mut self.carry);
                self.decode(&buffered)
            };
            lines.push(line);
        }

        self.carry.extend_from_slice(rest);
        lines
    }

    /// The stream closed: emit whatever is left as a final line.
    pub fn flush(&mut self) -> Option<Line> {
        if self.carry.is_empty() {
            return None;
        }
        let buffered = std::mem::take(&mut self.carry);
        Some(self.decode(&buffered))
    }

    fn decode(&self, raw: &[u8]) -> Line {
        let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
        Line::new(self.origin, String::from_utf8_lossy(raw).into_owned())
    }
}
