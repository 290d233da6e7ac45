// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cache-then-search orchestration.
//!
//! A query first scans the user's cached entries for a fresh lexical
//! overlap; only on a miss does it hit the live search provider, summarize
//! the snippets, and persist a new cache entry. Every outcome is a short
//! sequence of user-facing chunks; storage failures degrade to warnings so
//! a bad disk never swallows a search result.

use std::sync::Arc;

use cereal_core::{SearchCacheEntry, SearchProvider, UserId};
use cereal_memory::{MemoryStore, Summarizer};
use chrono::{Duration, Utc};
use tracing::{debug, warn};

/// Fixed apology for any live-search failure.
pub const SEARCH_APOLOGY_REPLY: &str =
    "Sorry, I had trouble searching for that information. Please try again.";

/// Executes searches and turns the results into chat replies.
#[derive(Clone)]
pub struct SearchSubsystem {
    provider: Arc<dyn SearchProvider>,
    summarizer: Summarizer,
    store: Option<Arc<MemoryStore>>,
    region: String,
    max_results: u32,
    freshness: Duration,
}

impl SearchSubsystem {
    pub fn new(
        provider: Arc<dyn SearchProvider>,
        summarizer: Summarizer,
        store: Option<Arc<MemoryStore>>,
        region: String,
        max_results: u32,
        freshness_hours: i64,
    ) -> Self {
        SearchSubsystem {
            provider,
            summarizer,
            store,
            region,
            max_results,
            freshness: Duration::hours(freshness_hours),
        }
    }

    /// Answers `query` from cache or live search, returning the chunks to
    /// stream back to the user. Always yields at least one chunk.
    pub async fn search_and_summarize(&self, query: &str, user: &UserId) -> Vec<String> {
        if let Some(summary) = self.cached_summary(query, user).await {
            let reply = format!("Here's what I found: {summary}");
            self.record_exchange(user, query, &format!("Search result: {summary}"))
                .await;
            return vec![reply];
        }

        let hits = match self
            .provider
            .search(query, &self.region, self.max_results)
            .await
        {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, query, "live search failed");
                return vec![SEARCH_APOLOGY_REPLY.to_string()];
            }
        };

        if hits.is_empty() {
            self.record_exchange(user, query, "No search results found.")
                .await;
            return vec!["No relevant search results found.".to_string()];
        }

        let snippets: Vec<&str> = hits.iter().filter_map(|h| h.body.as_deref()).collect();
        let sources: Vec<String> = hits.iter().filter_map(|h| h.href.clone()).collect();

        if snippets.is_empty() {
            self.record_exchange(user, query, "No extractable content for summarization.")
                .await;
            return vec!["Found results, but no extractable content to summarize.".to_string()];
        }

        let combined = snippets.join(" ");
        let instruction = format!(
            "Summarize the following search results for the query '{query}' concisely, \
             extract key points, and list the main sources."
        );
        let output = self.summarizer.summarize(&combined, &instruction).await;

        if let Some(store) = &self.store {
            let entry = SearchCacheEntry {
                query: query.to_string(),
                summary: output.text.clone(),
                key_points: output.key_points.clone(),
                sources,
                timestamp: Utc::now(),
            };
            if let Err(e) = store.save_search_entry(user, entry).await {
                warn!(error = %e, "failed to persist search cache entry");
            }
        }

        let reply = format!("Here's what I found: {}", output.text);
        self.record_exchange(user, query, &format!("Search result: {}", output.text))
            .await;
        vec![reply]
    }

    /// Scans the cache for a fresh entry whose query or key points overlap
    /// the new query.
    async fn cached_summary(&self, query: &str, user: &UserId) -> Option<String> {
        let store = self.store.as_ref()?;
        let cache = match store.load_search_cache(user).await {
            Ok(cache) => cache,
            Err(e) => {
                warn!(error = %e, "failed to read search cache");
                return None;
            }
        };

        let query_lower = query.to_lowercase();
        let now = Utc::now();
        for entry in cache.iter().rev() {
            if now - entry.timestamp >= self.freshness {
                continue;
            }
            let query_overlap = entry.query.to_lowercase().contains(&query_lower);
            let key_point_overlap = entry
                .key_points
                .iter()
                .any(|kp| query_lower.contains(&kp.to_lowercase()));
            if query_overlap || key_point_overlap {
                debug!(query, cached_query = %entry.query, "search cache hit");
                return Some(entry.summary.clone());
            }
        }
        None
    }

    async fn record_exchange(&self, user: &UserId, prompt: &str, reply: &str) {
        let Some(store) = &self.store else {
            return;
        };
        if let Err(e) = store.append_exchange(user, prompt, reply).await {
            warn!(error = %e, "failed to record search exchange");
        }
    }
}

impl std::fmt::Debug for SearchSubsystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSubsystem")
            .field("region", &self.region)
            .field("max_results", &self.max_results)
            .field("freshness", &self.freshness)
            .finish_non_exhaustive()
    }
}
