//! Stream adapter for parsing SSE (Server-Sent Events) from byte chunks.

use crate::Error;
use futures_util::{Stream, StreamExt};
use memchr::memmem;
use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{ready, Context, Poll};

/// Upper bound on buffered bytes for a single unterminated event.
const MAX_BUFFER_BYTES: usize = 1_000_000;

const BOM: &[u8] = "\u{FEFF}".as_bytes();

/// A Server-Sent Events (SSE) event.
#[derive(Debug, Clone, PartialEq)]
pub struct SseEvent {
    /// Event type (optional).
    pub event_type: Option<String>,
    /// Event data, multi-line payloads joined with `\n`.
    pub data: String,
    /// Event ID (optional).
    pub id: Option<String>,
}

impl SseEvent {
    /// Create a new SSE event with just data.
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            event_type: None,
            data: data.into(),
            id: None,
        }
    }

    /// Check if this is a "[DONE]" sentinel event.
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }
}

/// A stream adapter that parses SSE events from a byte stream.
/// Keeps partial events between chunks so events and UTF-8 sequences may be split anywhere.
pub struct SseStream<S> {
    inner: S,
    buffer: Vec<u8>,
    events: VecDeque<Result<SseEvent, Error>>,
    started: bool,
    finished: bool,
}

impl<S> SseStream<S> {
    /// Create a new SSE stream from a byte stream.
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            events: VecDeque::new(),
            started: false,
            finished: false,
        }
    }

    /// Append a chunk, dropping carriage returns so CRLF framing looks like LF framing.
    fn push_chunk(&mut self, chunk: &[u8]) {
        let mut chunk = chunk;
        if !self.started {
            self.started = true;
            if chunk.starts_with(BOM) {
                chunk = &chunk[BOM.len()..];
            }
        }
        self.buffer
            .extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));
    }

    /// Move every complete event in the buffer to the ready queue.
    ///
    /// An event that is not valid UTF-8 is consumed and queued as an error
    /// in its place, so later events still come through in order.
    fn parse_buffer(&mut self) {
        let finder = memmem::Finder::new(b"\n\n");
        let mut start = 0;

        while let Some(pos) = finder.find(&self.buffer[start..]) {
            let event_end = start + pos;
            match decode(&self.buffer[start..event_end]) {
                Ok(event_text) => {
                    if let Some(event) = Self::parse_single_event(event_text) {
                        self.events.push_back(Ok(event));
                    }
                }
                Err(e) => self.events.push_back(Err(e)),
            }

            start = event_end + 2;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
    }

    /// Parse a single complete SSE event from its text representation.
    fn parse_single_event(event_text: &str) -> Option<SseEvent> {
        let mut event_type = None;
        let mut data_lines = Vec::new();
        let mut id = None;

        for line in event_text.lines() {
            if line.is_empty() || line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };

            match field {
                "event" => event_type = Some(value.to_string()),
                "data" => data_lines.push(value),
                "id" => id = Some(value.to_string()),
                _ => {}
            }
        }

        if data_lines.is_empty() {
            return None;
        }

        Some(SseEvent {
            event_type,
            data: data_lines.join("\n"),
            id,
        })
    }
}

impl<S, E> Stream for SseStream<S>
where
    S: Stream<Item = Result<bytes::Bytes, E>> + Unpin,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Item = Result<SseEvent, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Poll::Ready(Some(event));
            }
            if self.finished {
                return Poll::Ready(None);
            }

            let chunk = match ready!(self.inner.poll_next_unpin(cx)) {
                Some(Ok(chunk)) => chunk,
                Some(Err(e)) => {
                    return Poll::Ready(Some(Err(Error::streaming(format!(
                        "Stream error: {}",
                        e.into()
                    )))));
                }
                None => {
                    self.finished = true;
                    // The last event may arrive without its blank-line terminator.
                    let remaining = std::mem::take(&mut self.buffer);
                    let event = match decode(&remaining) {
                        Ok(text) => Some(text.trim())
                            .filter(|text| !text.is_empty())
                            .and_then(Self::parse_single_event)
                            .map(Ok),
                        Err(e) => Some(Err(e)),
                    };
                    return Poll::Ready(event);
                }
            };

            self.push_chunk(&chunk);

            if self.buffer.len() > MAX_BUFFER_BYTES {
                self.buffer.clear();
                return Poll::Ready(Some(Err(Error::streaming(
                    "SSE buffer exceeded maximum size",
                ))));
            }

            self.parse_buffer();
        }
    }
}

fn decode(bytes: &[u8]) -> Result<&str, Error> {
    std::str::from_utf8(bytes)
        .map_err(|e| Error::streaming(format!("Invalid UTF-8 in SSE event: {e}")))
}

/// Extension trait to add SSE parsing to byte streams.
pub trait SseStreamExt: Stream {
    /// Parse this byte stream as SSE events.
    fn sse_events(self) -> SseStream<Self>
    where
        Self: Sized,
    {
        SseStream::new(self)
    }
}

impl<S: Stream> SseStreamExt for S {}
