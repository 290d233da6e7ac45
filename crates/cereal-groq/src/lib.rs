// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Groq chat completions API (OpenAI-compatible).
//!
//! Provides [`GroqClient`] which handles request construction, bearer
//! authentication, streaming SSE responses, and transient error retry.

pub mod sse;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use cereal_core::{CerealError, CompletionProvider, CompletionRequest, TextStream};
use reqwest::header::{HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, ChatCompletionRequest, ChatCompletionResponse};

/// Default base URL for the Groq chat completions endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// HTTP client for Groq API communication.
///
/// Manages authentication headers, connection pooling, and retry logic
/// for transient errors (429, 500, 503).
#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    default_model: String,
    max_retries: u32,
    base_url: String,
}

impl GroqClient {
    /// Creates a new Groq API client.
    ///
    /// # Arguments
    /// * `api_key` - Groq API key, sent as a bearer token
    /// * `base_url` - Chat completions endpoint URL
    /// * `model` - Default model identifier used when a request names none
    pub fn new(api_key: &str, base_url: String, model: String) -> Result<Self, CerealError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| CerealError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| CerealError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            default_model: model,
            max_retries: 1,
            base_url,
        })
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Sends a streaming request and returns a stream of text fragments.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    pub async fn stream_message(
        &self,
        request: &CompletionRequest,
    ) -> Result<TextStream, CerealError> {
        let wire = ChatCompletionRequest::from_request(request, &self.default_model, true);

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying streaming request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&wire)
                .send()
                .await
                .map_err(|e| CerealError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "streaming response received");

            if status.is_success() {
                return Ok(sse::parse_sse_stream(response));
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(CerealError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            return Err(api_error(status, response).await);
        }

        Err(last_error.unwrap_or_else(|| CerealError::Provider {
            message: "streaming request failed after retries".into(),
            source: None,
        }))
    }

    /// Sends a non-streaming request and returns the full completion text.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    pub async fn complete_message(
        &self,
        request: &CompletionRequest,
    ) -> Result<String, CerealError> {
        let wire = ChatCompletionRequest::from_request(request, &self.default_model, false);

        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&wire)
                .send()
                .await
                .map_err(|e| CerealError::Provider {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| CerealError::Provider {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let parsed: ChatCompletionResponse =
                    serde_json::from_str(&body).map_err(|e| CerealError::Provider {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                let text = parsed
                    .choices
                    .into_iter()
                    .next()
                    .map(|c| c.message.content)
                    .ok_or_else(|| CerealError::Provider {
                        message: "API response contained no choices".into(),
                        source: None,
                    })?;
                return Ok(text);
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(CerealError::Provider {
                    message: format!("API returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            return Err(api_error(status, response).await);
        }

        Err(last_error.unwrap_or_else(|| CerealError::Provider {
            message: "completion request failed after retries".into(),
            source: None,
        }))
    }
}

#[async_trait]
impl CompletionProvider for GroqClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, CerealError> {
        self.complete_message(&request).await
    }

    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, CerealError> {
        self.stream_message(&request).await
    }
}

/// Builds a provider error from a non-2xx response, preferring the API's
/// structured error message when the body parses.
async fn api_error(status: reqwest::StatusCode, response: reqwest::Response) -> CerealError {
    let body = response.text().await.unwrap_or_default();
    let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
        format!(
            "Groq API error ({}): {}",
            api_err.error.type_, api_err.error.message
        )
    } else {
        format!("API returned {status}: {body}")
    };
    CerealError::Provider {
        message,
        source: None,
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cereal_core::ChatMessage;
    use futures::StreamExt;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GroqClient {
        GroqClient::new(
            "test-api-key",
            base_url.to_string(),
            "llama-3.1-8b-instant".into(),
        )
        .unwrap()
    }

    fn test_request() -> CompletionRequest {
        CompletionRequest::new(vec![ChatMessage::user("Hello")], 0.7)
    }

    fn completion_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": text},
                "finish_reason": "stop"
            }]
        })
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi there!")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.complete_message(&test_request()).await.unwrap();
        assert_eq!(text, "Hi there!");
    }

    #[tokio::test]
    async fn complete_message_retries_on_429() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"type": "rate_limit_exceeded", "message": "Rate limited"}
        });

        // First request returns 429, second returns 200.
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("After retry")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.complete_message(&test_request()).await.unwrap();
        assert_eq!(text, "After retry");
    }

    #[tokio::test]
    async fn complete_message_fails_on_400() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Bad model"}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("invalid_request_error"), "got: {err}");
    }

    #[tokio::test]
    async fn complete_message_exhausts_retries_on_503() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"type": "service_unavailable", "message": "Service overloaded"}
        });

        // Both attempts return 503.
        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503).set_body_json(&error_body))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("service_unavailable"), "got: {err}");
    }

    #[tokio::test]
    async fn client_sends_bearer_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(header("content-type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.complete_message(&test_request()).await;
        assert!(result.is_ok(), "headers should match: {result:?}");
    }

    #[tokio::test]
    async fn stream_message_yields_fragments() {
        let server = MockServer::start().await;

        let sse = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"},\"index\":0}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"},\"index\":0}]}\n\n",
            "data: [DONE]\n\n",
        );

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(sse),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut stream = client.stream_message(&test_request()).await.unwrap();

        let mut collected = String::new();
        while let Some(fragment) = stream.next().await {
            collected.push_str(&fragment.unwrap());
        }
        assert_eq!(collected, "Hello");
    }

    #[tokio::test]
    async fn stream_message_fails_on_401() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "error": {"type": "invalid_api_key", "message": "Invalid API Key"}
        });

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(401).set_body_json(&error_body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let result = client.stream_message(&test_request()).await;
        assert!(result.is_err());
        let err = match result {
            Err(e) => e.to_string(),
            Ok(_) => unreachable!(),
        };
        assert!(err.contains("invalid_api_key"), "got: {err}");
    }
}
