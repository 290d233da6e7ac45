// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for LLM backends.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::CerealError;
use crate::types::CompletionRequest;

/// A stream of incremental text fragments from a streaming completion.
///
/// Fragments must be surfaced as they arrive, not buffered into a full
/// reply; the pipeline filters and forwards each one individually.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, CerealError>> + Send>>;

/// Adapter for LLM completion backends.
///
/// Two entry points: `stream` for the conversational reply path and
/// `complete` for single-shot calls (summarization, interest extraction).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Sends a completion request and returns the full response text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, CerealError>;

    /// Sends a completion request and returns a stream of text fragments.
    async fn stream(&self, request: CompletionRequest) -> Result<TextStream, CerealError>;
}
