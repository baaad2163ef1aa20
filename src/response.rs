//! Response handling for LLM generations.

use crate::accumulator::ResponseAccumulator;
use crate::{Error, FinishReason, StreamEvent, Usage};
use futures_util::stream::Stream;
use std::pin::Pin;

/// A complete, buffered response from an LLM provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteResponse {
    pub text: String,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

/// Response from an LLM generation that can be streamed or buffered.
/// All responses are internally streaming.
pub struct Response {
    stream: Pin<Box<dyn Stream<Item = Result<StreamEvent, Error>> + Send>>,
}

impl Response {
    /// Create a new response from a stream of events.
    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<StreamEvent, Error>> + Send + 'static,
    {
        Self {
            stream: Box::pin(stream),
        }
    }

    /// Create an already-finished response holding `text`.
    pub fn from_text(text: impl Into<String>) -> Self {
        let events = vec![
            Ok(StreamEvent::ContentDelta { delta: text.into() }),
            Ok(StreamEvent::Done {
                finish_reason: FinishReason::Stop,
                usage: Usage::default(),
            }),
        ];
        Self::from_stream(futures_util::stream::iter(events))
    }

    /// Buffer the entire response by consuming the stream.
    pub async fn buffer(self) -> Result<CompleteResponse, Error> {
        use futures_util::StreamExt;

        let mut stream = self.stream;
        let mut accumulator = ResponseAccumulator::new();

        while let Some(event_result) = stream.next().await {
            let event = event_result?;
            let terminal = event.is_terminal();
            accumulator.process_event(event)?;
            if terminal {
                break;
            }
        }

        accumulator.finalize()
    }

    /// Get just the text content (convenience method).
    pub async fn text(self) -> Result<String, Error> {
        Ok(self.buffer().await?.text)
    }
}
