// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Text summarization with an LLM path and a deterministic fallback.
//!
//! Used by the memory store when pruning old turns and by the search
//! subsystem when condensing result snippets. When no provider is wired
//! (or the provider call fails) the naive path keeps the system working
//! with a truncated concatenation instead of an error.

use std::sync::Arc;

use cereal_core::{ChatMessage, CompletionProvider, CompletionRequest};
use tracing::warn;

/// Cap applied to the naive fallback summary.
const NAIVE_SUMMARY_CHARS: usize = 300;

/// The product of one summarization pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SummaryOutput {
    pub text: String,
    /// Bullet lines extracted from the model output, when the instruction
    /// asked for key points. Empty on the naive path.
    pub key_points: Vec<String>,
}

/// Summarizes free text via the utility model, degrading to truncation.
#[derive(Clone)]
pub struct Summarizer {
    provider: Option<Arc<dyn CompletionProvider>>,
    model: Option<String>,
    temperature: f32,
}

impl Summarizer {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        model: Option<String>,
        temperature: f32,
    ) -> Self {
        Summarizer {
            provider: Some(provider),
            model,
            temperature,
        }
    }

    /// A summarizer with no provider; always takes the naive path.
    pub fn naive() -> Self {
        Summarizer {
            provider: None,
            model: None,
            temperature: 0.3,
        }
    }

    /// Produces a summary of `text`, steered by `instruction`.
    ///
    /// Provider failures fall back to the naive summary rather than
    /// propagating, so a pruning pass can never lose the conversation.
    pub async fn summarize(&self, text: &str, instruction: &str) -> SummaryOutput {
        let Some(provider) = &self.provider else {
            return naive_summary(text);
        };

        let prompt = format!(
            "Summarize the following text concisely. Instructions: {instruction}\n\n{text}"
        );
        let mut request = CompletionRequest::new(
            vec![
                ChatMessage::system("You are a helpful assistant that writes concise summaries."),
                ChatMessage::user(prompt),
            ],
            self.temperature,
        );
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        match provider.complete(request).await {
            Ok(reply) => {
                let key_points = if instruction.to_lowercase().contains("key points") {
                    extract_bullets(&reply)
                } else {
                    Vec::new()
                };
                SummaryOutput {
                    text: reply.trim().to_string(),
                    key_points,
                }
            }
            Err(e) => {
                warn!(error = %e, "summarization provider failed, using naive fallback");
                naive_summary(text)
            }
        }
    }
}

/// Deterministic fallback: join lines and truncate on a char boundary.
fn naive_summary(text: &str) -> SummaryOutput {
    let joined = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" | ");

    let truncated: String = joined.chars().take(NAIVE_SUMMARY_CHARS).collect();
    SummaryOutput {
        text: format!("Summary: {truncated}"),
        key_points: Vec::new(),
    }
}

/// Pulls bullet lines (`-`, `*`, `•`, or `1.` style) out of model output.
fn extract_bullets(reply: &str) -> Vec<String> {
    reply
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let rest = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
                .or_else(|| trimmed.strip_prefix("• "))
                .or_else(|| {
                    trimmed
                        .split_once(". ")
                        .filter(|(n, _)| n.chars().all(|c| c.is_ascii_digit()) && !n.is_empty())
                        .map(|(_, rest)| rest)
                })?;
            let point = rest.trim();
            if point.is_empty() {
                None
            } else {
                Some(point.to_string())
            }
        })
        .collect()
}
