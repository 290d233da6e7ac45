// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic trait analysis over a user's message texts.
//!
//! Pure lexical statistics; no model calls. Each dimension falls back to
//! the 0.5 neutral default when its signal set is empty, so a brand-new
//! user always reads as a fully neutral vector.

use cereal_core::TraitVector;

use crate::lexicon::{
    group_matches, CASUAL_PATTERNS, EMOTIONAL_PATTERNS, FORMAL_PATTERNS, HUMOR_PATTERNS,
    QUESTION_PATTERNS, TERMINAL_PUNCTUATION,
};

/// Words-per-message baseline for the verbosity dimension.
const VERBOSITY_BASELINE_WORDS: f64 = 25.0;

/// Minimum word corpus before the creativity dimension is computed.
const CREATIVITY_MIN_WORDS: usize = 10;

/// Computes the 8-dimensional trait vector from the user's message texts.
pub fn compute_traits(messages: &[&str]) -> TraitVector {
    if messages.is_empty() {
        return TraitVector::default();
    }

    let total_messages = messages.len();
    let mut traits = TraitVector::default();

    let mut formal_count = 0usize;
    let mut casual_count = 0usize;
    let mut emotional_count = 0usize;
    let mut analytical_count = 0usize;
    let mut humor_count = 0usize;
    let mut serious_count = 0usize;
    let mut question_count = 0usize;
    let mut total_words = 0usize;
    let mut total_chars = 0usize;
    let mut punctuation_count = 0usize;

    for text in messages {
        if text.is_empty() {
            continue;
        }

        total_words += text.split_whitespace().count();
        total_chars += text.chars().count();
        punctuation_count += TERMINAL_PUNCTUATION.find_iter(text).count();

        let formal = group_matches(&FORMAL_PATTERNS, text);
        let casual = group_matches(&CASUAL_PATTERNS, text);
        if formal > casual {
            formal_count += 1;
        } else if casual > formal {
            casual_count += 1;
        }

        if group_matches(&EMOTIONAL_PATTERNS, text) > 0 {
            emotional_count += 1;
        } else {
            analytical_count += 1;
        }

        if group_matches(&HUMOR_PATTERNS, text) > 0 {
            humor_count += 1;
        } else {
            serious_count += 1;
        }

        if group_matches(&QUESTION_PATTERNS, text) > 0 {
            question_count += 1;
        }
    }

    if formal_count + casual_count > 0 {
        traits.formality = formal_count as f64 / (formal_count + casual_count) as f64;
    }

    if total_words > 0 {
        let avg_words = total_words as f64 / total_messages as f64;
        traits.verbosity = (avg_words / VERBOSITY_BASELINE_WORDS).clamp(0.1, 1.0);
    }

    if emotional_count + analytical_count > 0 {
        traits.emotiveness = emotional_count as f64 / (emotional_count + analytical_count) as f64;
    }

    if humor_count + serious_count > 0 {
        traits.humor = humor_count as f64 / (humor_count + serious_count) as f64;
    }

    traits.curiosity = (question_count as f64 / total_messages as f64).min(1.0);

    let avg_chars = total_chars as f64 / total_messages as f64;
    traits.directness = (punctuation_count as f64 / total_messages as f64
        + (1.0 - (avg_chars / 100.0).min(1.0)))
    .min(1.0);

    traits.politeness = (traits.formality + (1.0 - traits.directness)) / 2.0;

    if total_words > CREATIVITY_MIN_WORDS {
        let all_words: Vec<String> = messages
            .iter()
            .flat_map(|m| m.split_whitespace())
            .map(str::to_lowercase)
            .collect();
        if !all_words.is_empty() {
            let unique: std::collections::HashSet<&String> = all_words.iter().collect();
            traits.creativity = (unique.len() as f64 / all_words.len() as f64 * 3.0).min(1.0);
        }
    }

    traits
}
