// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Web search for the Cereal chat service.
//!
//! [`router`] decides whether a prompt needs a search at all,
//! [`client::SearxClient`] talks to the search endpoint, and
//! [`subsystem::SearchSubsystem`] runs the cache-then-search protocol and
//! turns results into chat replies.

pub mod client;
pub mod router;
pub mod subsystem;

pub use client::SearxClient;
pub use router::{should_search, DecisionReason, SearchDecision};
pub use subsystem::{SearchSubsystem, SEARCH_APOLOGY_REPLY};
