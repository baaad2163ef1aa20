use crate::{Error, LLMRequest, Response};

/// A trait for LLM providers that can generate text responses.
/// All responses are internally streamed; use `response.buffer().await` or
/// `response.text().await` to collect them.
#[async_trait::async_trait]
pub trait LLMProvider: Send + Sync + 'static {
    /// Generate a chat completion for the whole conversation in `request`.
    async fn generate(&self, request: &LLMRequest) -> Result<Response, Error>;

    /// Short provider name used in log lines.
    fn name(&self) -> &'static str;
}
