// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Cereal chat service.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common data model shared by every other crate in the workspace. The
//! memory store, personality profiler, search subsystem, and turn pipeline
//! all speak these types.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::CerealError;
pub use traits::{CompletionProvider, SearchProvider, TextStream};
pub use types::{
    ChatMessage, ChatRole, CompletionRequest, ConversationSummary, MemoryRecord,
    PersonalityProfile, SearchCacheEntry, SearchHit, TraitVector, UserId,
};
