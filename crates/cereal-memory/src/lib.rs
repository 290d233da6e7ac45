// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user memory for the Cereal chat service.
//!
//! [`MemoryStore`] keeps each user's conversation log, summaries,
//! preferences, search cache, and personality profile as JSON files;
//! [`Summarizer`] digests old turns when the log overflows.

pub mod store;
pub mod summarizer;

pub use store::MemoryStore;
pub use summarizer::{Summarizer, SummaryOutput};
