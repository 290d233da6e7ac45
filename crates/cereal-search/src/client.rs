// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for a SearxNG-compatible JSON search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use cereal_core::{CerealError, SearchHit, SearchProvider};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Queries a SearxNG instance via `GET ?q=...&format=json`.
#[derive(Debug, Clone)]
pub struct SearxClient {
    client: reqwest::Client,
    base_url: String,
}

impl SearxClient {
    pub fn new(base_url: String, timeout_secs: u64) -> Result<Self, CerealError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| CerealError::Search {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(SearxClient { client, base_url })
    }
}

#[async_trait]
impl SearchProvider for SearxClient {
    async fn search(
        &self,
        keywords: &str,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, CerealError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", keywords),
                ("format", "json"),
                ("language", region),
            ])
            .send()
            .await
            .map_err(|e| CerealError::Search {
                message: format!("search request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CerealError::search(format!(
                "search endpoint returned {status}: {body}"
            )));
        }

        let parsed: SearxResponse =
            response.json().await.map_err(|e| CerealError::Search {
                message: format!("failed to parse search response: {e}"),
                source: Some(Box::new(e)),
            })?;

        debug!(
            results = parsed.results.len(),
            keywords, "search results received"
        );

        Ok(parsed
            .results
            .into_iter()
            .take(max_results as usize)
            .map(|r| SearchHit {
                body: r.content,
                href: r.url,
            })
            .collect())
    }
}
