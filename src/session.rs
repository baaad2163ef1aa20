//! Conversation sessions against a text-generation provider.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::providers::gemini::{GeminiProvider, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use crate::types::Message;
use crate::{Error, LLMProvider, LLMRequest};

/// Model used when the configuration names none.
pub const DEFAULT_MODEL: &str = "gemini-1.5-pro";

/// Connection and sampling settings for new sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Entry point that turns a credential into a chat session.
pub struct GenerationClient;

impl GenerationClient {
    /// Open a fresh session authenticated with `credential`.
    ///
    /// Only emptiness is checked here; a key the service rejects surfaces as
    /// [`Error::Authentication`] on the first [`ChatSession::send`].
    pub fn initialize(credential: &str, settings: &SessionSettings) -> Result<ChatSession, Error> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(Error::authentication("API key must not be empty"));
        }

        let provider = GeminiProvider::new_with_base_url(
            credential.to_string(),
            settings.base_url.clone(),
            settings.timeout,
        )?;

        info!(model = %settings.model, "opened generation session");

        Ok(
            ChatSession::with_provider(Arc::new(provider), settings.model.clone())
                .with_sampling(settings.temperature, settings.max_output_tokens),
        )
    }
}

/// An ongoing exchange whose prior turns are sent back as context.
///
/// Owned by exactly one interaction; history is never shared.
pub struct ChatSession {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    history: Vec<Message>,
}

impl ChatSession {
    /// Create a session over any provider.
    pub fn with_provider(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: None,
            max_tokens: None,
            history: Vec::new(),
        }
    }

    pub fn with_sampling(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    /// Send `prompt` with the full history and return the generated text.
    ///
    /// Single attempt. On success the (prompt, response) pair is appended to
    /// the history; on failure the history is left as it was.
    pub async fn send(&mut self, prompt: &str) -> Result<String, Error> {
        let mut messages = self.history.clone();
        messages.push(Message::user(prompt));

        let request = LLMRequest::new(self.model.clone(), messages)
            .with_temperature(self.temperature)
            .with_max_tokens(self.max_tokens);

        debug!(
            provider = self.provider.name(),
            history = self.history.len(),
            "sending prompt"
        );

        let response = self
            .provider
            .generate(&request)
            .await
            .map_err(Error::into_remote)?;
        let complete = response.buffer().await.map_err(Error::into_remote)?;

        if complete.text.trim().is_empty() {
            return Err(Error::remote("model returned no text"));
        }

        debug!(
            input_tokens = complete.usage.input_tokens,
            output_tokens = complete.usage.output_tokens,
            finish_reason = ?complete.finish_reason,
            "received response"
        );

        self.history.push(Message::user(prompt));
        self.history.push(Message::assistant(complete.text.clone()));

        Ok(complete.text)
    }

    /// Messages exchanged so far, oldest first.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// Number of completed (prompt, response) exchanges.
    pub fn turns(&self) -> usize {
        self.history.len() / 2
    }

    /// Drop the most recent (prompt, response) pair, if any.
    pub fn discard_last_turn(&mut self) {
        if self.history.len() >= 2 {
            self.history.truncate(self.history.len() - 2);
        }
    }

    /// Forget all prior turns.
    pub fn reset(&mut self) {
        self.history.clear();
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}
