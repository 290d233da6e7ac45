// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the turn pipeline.
//!
//! The pipeline never knows the concrete implementation behind these seams;
//! tests substitute in-memory fakes, production wires up the Groq and
//! SearxNG clients.

pub mod provider;
pub mod search;

pub use provider::{CompletionProvider, TextStream};
pub use search::SearchProvider;
