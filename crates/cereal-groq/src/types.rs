// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the OpenAI-compatible chat completions API.

use cereal_core::{ChatMessage, CompletionRequest};
use serde::{Deserialize, Serialize};

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub temperature: f32,
    pub stream: bool,
}

impl ChatCompletionRequest {
    /// Builds the wire request, resolving `model: None` to the default.
    pub fn from_request(request: &CompletionRequest, default_model: &str, stream: bool) -> Self {
        ChatCompletionRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            messages: request.messages.iter().map(WireMessage::from).collect(),
            temperature: request.temperature,
            stream,
        }
    }
}

/// One role-tagged message on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

impl From<&ChatMessage> for WireMessage {
    fn from(message: &ChatMessage) -> Self {
        WireMessage {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Non-streaming response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: WireMessage,
}

/// One streaming SSE chunk (`data: {...}` line).
#[derive(Debug, Clone, Deserialize)]
pub struct StreamChunk {
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub delta: Delta,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
}

impl StreamChunk {
    /// The text fragment carried by this chunk, if any.
    pub fn content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.delta.content.as_deref())
    }
}

/// Error payload returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub type_: String,
}
