// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Personality profiling for the Cereal chat service.
//!
//! Builds an 8-dimensional communication-style vector from lexical
//! statistics over a user's messages, enriches it with model-extracted
//! interests, and renders both the adaptive prompt fragment and the
//! user-facing stats reply.

pub mod analysis;
pub mod lexicon;
pub mod profiler;

pub use analysis::compute_traits;
pub use profiler::{render_prompt_fragment, render_stats_reply, Profiler};
