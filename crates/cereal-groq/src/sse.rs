// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSE stream parser for OpenAI-compatible streaming responses.
//!
//! Converts a reqwest response byte stream into incremental text fragments
//! using the `eventsource-stream` crate. The protocol carries unnamed
//! events whose `data` field is either a JSON chunk or the literal
//! `[DONE]` terminator.

use cereal_core::{CerealError, TextStream};
use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use tracing::debug;

use crate::types::StreamChunk;

enum SseItem {
    Text(String),
    Skip,
    Done,
    Fail(CerealError),
}

/// Parses a reqwest streaming response into a stream of text fragments.
///
/// A malformed chunk is skipped with a debug log and streaming continues;
/// the `[DONE]` terminator ends the stream. Transport errors surface as
/// stream items so the caller can substitute its fixed apology.
pub fn parse_sse_stream(response: reqwest::Response) -> TextStream {
    let events = response.bytes_stream().eventsource();

    let mapped = events.map(|result| match result {
        Ok(event) => {
            let data = event.data.trim();
            if data == "[DONE]" {
                return SseItem::Done;
            }
            match serde_json::from_str::<StreamChunk>(data) {
                Ok(chunk) => match chunk.content() {
                    Some(text) if !text.is_empty() => SseItem::Text(text.to_string()),
                    _ => SseItem::Skip,
                },
                Err(e) => {
                    debug!(error = %e, "skipping malformed streaming chunk");
                    SseItem::Skip
                }
            }
        }
        Err(e) => SseItem::Fail(CerealError::Provider {
            message: format!("SSE stream error: {e}"),
            source: None,
        }),
    });

    let fragments = mapped
        .take_while(|item| futures::future::ready(!matches!(item, SseItem::Done)))
        .filter_map(|item| async move {
            match item {
                SseItem::Text(text) => Some(Ok(text)),
                SseItem::Fail(error) => Some(Err(error)),
                SseItem::Skip | SseItem::Done => None,
            }
        });

    Box::pin(fragments)
}
