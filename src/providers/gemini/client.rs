use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

use super::types::*;
use crate::provider::LLMProvider;
use crate::sse_stream::SseStream;
use crate::types::{FinishReason, Role};
use crate::{Error, LLMRequest, Response, StreamEvent};

/// Public Gemini Developer API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Gemini provider authenticated with a Developer API key.
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiProvider {
    /// Create a provider for the public endpoint.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::new_with_base_url(api_key, DEFAULT_BASE_URL.to_string(), DEFAULT_TIMEOUT)
    }

    /// Create a provider with a custom base URL (for testing or proxies).
    pub fn new_with_base_url(
        api_key: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, Error> {
        if api_key.trim().is_empty() {
            return Err(Error::authentication("API key must not be empty"));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_key,
            base_url,
        })
    }

    /// Convert the provider-neutral request to Gemini's format.
    fn convert_request(request: &LLMRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .map(|message| GeminiContent {
                role: match message.role {
                    Role::User => "user".to_string(),
                    Role::Assistant => "model".to_string(),
                },
                parts: vec![GeminiPart::text(message.content.clone())],
            })
            .collect();

        let generation_config = GeminiGenerationConfig {
            temperature: request.temperature,
            max_output_tokens: request.max_tokens,
        };

        GeminiRequest {
            contents,
            generation_config: (!generation_config.is_empty()).then_some(generation_config),
        }
    }

    /// Streaming endpoint for `model`.
    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url.trim_end_matches('/'),
            model
        )
    }

    /// Turn a non-success HTTP response into a typed error.
    fn classify_failure(status: StatusCode, body: &str) -> Error {
        let detail = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| body.trim().to_string());

        let rejected_key = status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || (status == StatusCode::BAD_REQUEST
                && (body.contains("API_KEY_INVALID") || body.contains("API key not valid")));

        if rejected_key {
            Error::authentication(format!("{status}: {detail}"))
        } else {
            Error::remote(format!("{status}: {detail}"))
        }
    }

    /// Convert one SSE payload into stream events.
    fn convert_chunk(data: &str) -> Vec<Result<StreamEvent, Error>> {
        // Mid-stream failures arrive as an error envelope instead of a chunk.
        if let Ok(envelope) = serde_json::from_str::<GeminiErrorEnvelope>(data) {
            return vec![Ok(StreamEvent::Error {
                error: format!("{} ({})", envelope.error.message, envelope.error.status),
            })];
        }

        let response = match serde_json::from_str::<GeminiResponse>(data) {
            Ok(response) => response,
            Err(e) => {
                return vec![Err(Error::streaming(format!(
                    "Failed to parse SSE event: {e}"
                )))]
            }
        };

        let mut events = Vec::new();

        let Some(candidate) = response.candidates.first() else {
            if let Some(reason) = response
                .prompt_feedback
                .and_then(|feedback| feedback.block_reason)
            {
                events.push(Ok(StreamEvent::Error {
                    error: format!("prompt blocked: {reason}"),
                }));
            } else if let Some(usage) = response.usage_metadata {
                events.push(Ok(StreamEvent::Done {
                    finish_reason: FinishReason::Stop,
                    usage: usage.into(),
                }));
            }
            return events;
        };

        for part in &candidate.content.parts {
            if let Some(text) = part.text.as_ref().filter(|text| !text.is_empty()) {
                events.push(Ok(StreamEvent::ContentDelta {
                    delta: text.clone(),
                }));
            }
        }

        if let Some(reason) = &candidate.finish_reason {
            events.push(Ok(StreamEvent::Done {
                finish_reason: finish_reason_from(reason),
                usage: response
                    .usage_metadata
                    .map(Into::into)
                    .unwrap_or_default(),
            }));
        }

        events
    }
}

#[async_trait::async_trait]
impl LLMProvider for GeminiProvider {
    async fn generate(&self, request: &LLMRequest) -> Result<Response, Error> {
        let body = Self::convert_request(request);
        let endpoint = self.endpoint(&request.model);

        debug!(
            model = %request.model,
            turns = body.contents.len(),
            "sending Gemini request"
        );

        let response = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(%status, "Gemini request failed");
            return Err(Self::classify_failure(status, &error_text));
        }

        let event_stream = SseStream::new(response.bytes_stream())
            .map(|sse_result| match sse_result {
                Ok(sse_event) => {
                    let data = sse_event.data.trim();
                    if data.is_empty() || sse_event.is_done() {
                        Vec::new()
                    } else {
                        Self::convert_chunk(data)
                    }
                }
                Err(e) => vec![Err(e)],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Response::from_stream(event_stream))
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Message;

    #[test]
    fn test_empty_key_rejected() {
        let result = GeminiProvider::new("   ".to_string());
        assert!(matches!(result, Err(Error::Authentication(_))));
    }

    #[test]
    fn test_debug_redacts_key() {
        let provider = GeminiProvider::new("secret-key".to_string()).unwrap();
        let rendered = format!("{provider:?}");
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let provider = GeminiProvider::new_with_base_url(
            "k".to_string(),
            "http://localhost:9999/".to_string(),
            DEFAULT_TIMEOUT,
        )
        .unwrap();
        assert_eq!(
            provider.endpoint("gemini-1.5-pro"),
            "http://localhost:9999/v1beta/models/gemini-1.5-pro:streamGenerateContent?alt=sse"
        );
    }

    #[test]
    fn test_convert_request_maps_roles() {
        let request = LLMRequest::new(
            "gemini-1.5-pro",
            vec![
                Message::user("first"),
                Message::assistant("answer"),
                Message::user("second"),
            ],
        );

        let body = GeminiProvider::convert_request(&request);
        let roles: Vec<_> = body.contents.iter().map(|c| c.role.as_str()).collect();
        assert_eq!(roles, vec!["user", "model", "user"]);
        assert!(body.generation_config.is_none());
    }

    #[test]
    fn test_convert_chunk_text_and_done() {
        let chunk = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Problem 1"}]},"finishReason":"STOP"}],"usageMetadata":{"promptTokenCount":10,"candidatesTokenCount":20}}"#;
        let events: Vec<_> = GeminiProvider::convert_chunk(chunk)
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_eq!(
            events,
            vec![
                StreamEvent::ContentDelta {
                    delta: "Problem 1".to_string()
                },
                StreamEvent::Done {
                    finish_reason: FinishReason::Stop,
                    usage: crate::Usage {
                        input_tokens: 10,
                        output_tokens: 20
                    },
                },
            ]
        );
    }

    #[test]
    fn test_convert_chunk_error_envelope() {
        let chunk = r#"{"error":{"code":429,"message":"Resource exhausted","status":"RESOURCE_EXHAUSTED"}}"#;
        let events = GeminiProvider::convert_chunk(chunk);
        assert!(matches!(
            events.as_slice(),
            [Ok(StreamEvent::Error { error })] if error.contains("Resource exhausted")
        ));
    }

    #[test]
    fn test_convert_chunk_blocked_prompt() {
        let chunk = r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#;
        let events = GeminiProvider::convert_chunk(chunk);
        assert!(matches!(
            events.as_slice(),
            [Ok(StreamEvent::Error { error })] if error.contains("SAFETY")
        ));
    }

    #[test]
    fn test_classify_failure() {
        let invalid_key = r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT","details":[{"reason":"API_KEY_INVALID"}]}}"#;
        assert!(matches!(
            GeminiProvider::classify_failure(StatusCode::BAD_REQUEST, invalid_key),
            Error::Authentication(_)
        ));

        assert!(matches!(
            GeminiProvider::classify_failure(StatusCode::FORBIDDEN, "denied"),
            Error::Authentication(_)
        ));

        let overloaded = GeminiProvider::classify_failure(
            StatusCode::SERVICE_UNAVAILABLE,
            r#"{"error":{"code":503,"message":"The model is overloaded.","status":"UNAVAILABLE"}}"#,
        );
        match overloaded {
            Error::RemoteService(message) => assert!(message.contains("The model is overloaded.")),
            other => panic!("Expected remote service error, got {other:?}"),
        }
    }
}
