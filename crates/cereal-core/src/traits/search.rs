// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search provider trait for keyword web search backends.

use async_trait::async_trait;

use crate::error::CerealError;
use crate::types::SearchHit;

/// Adapter for remote keyword search endpoints.
///
/// Result fields may be individually absent; callers must tolerate hits
/// with no body or no href.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        keywords: &str,
        region: &str,
        max_results: u32,
    ) -> Result<Vec<SearchHit>, CerealError>;
}
