// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Cereal chat service.

use thiserror::Error;

/// The primary error type used across all Cereal crates.
#[derive(Debug, Error)]
pub enum CerealError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (file I/O, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM provider errors (API failure, malformed response, stream error).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Search provider errors (API failure, malformed result payload).
    #[error("search error: {message}")]
    Search {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CerealError {
    /// Wraps an I/O or serialization error as a storage error.
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(source: E) -> Self {
        CerealError::Storage {
            source: Box::new(source),
        }
    }

    /// Builds a provider error from a message alone.
    pub fn provider(message: impl Into<String>) -> Self {
        CerealError::Provider {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a search error from a message alone.
    pub fn search(message: impl Into<String>) -> Self {
        CerealError::Search {
            message: message.into(),
            source: None,
        }
    }
}
