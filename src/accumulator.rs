//! Delta accumulation logic for streaming responses.

use crate::types::{FinishReason, StreamEvent, Usage};
use crate::{CompleteResponse, Error};

/// Accumulates streaming deltas into a complete response.
#[derive(Debug, Default)]
pub struct ResponseAccumulator {
    text: String,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl ResponseAccumulator {
    /// Create a new response accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a stream event and update the accumulation.
    pub fn process_event(&mut self, event: StreamEvent) -> Result<(), Error> {
        match event {
            StreamEvent::ContentDelta { delta } => self.text.push_str(&delta),
            StreamEvent::Done {
                finish_reason,
                usage,
            } => {
                self.finish_reason = Some(finish_reason);
                self.usage = Some(usage);
            }
            StreamEvent::Error { error } => return Err(Error::streaming(error)),
        }

        Ok(())
    }

    /// Finalize and return the complete response.
    ///
    /// A stream that was cut off by the safety filter before producing any
    /// text is an error rather than an empty answer.
    pub fn finalize(self) -> Result<CompleteResponse, Error> {
        let finish_reason = self.finish_reason.unwrap_or(FinishReason::Stop);
        if self.text.is_empty() && finish_reason == FinishReason::ContentFilter {
            return Err(Error::remote("response blocked by the safety filter"));
        }

        Ok(CompleteResponse {
            text: self.text,
            finish_reason,
            usage: self.usage.unwrap_or_default(),
        })
    }
}
