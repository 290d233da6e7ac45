// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pre-compiled lexicon pattern groups used by trait analysis.
//!
//! Each group is a set of case-insensitive regexes; analysis counts total
//! matches per message across a group. The word lists are deliberately
//! small: they measure style signals, not meaning.

use std::sync::LazyLock;

use regex::Regex;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid lexicon pattern `{p}`: {e}")))
        .collect()
}

/// Formal-register markers.
pub static FORMAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(please|thank you|kindly|would you|could you|may I)\b",
        r"(?i)\b(sir|madam|mr\.|ms\.|dr\.)",
        r"(?i)\b(appreciate|grateful|assistance|regarding)\b",
    ])
});

/// Casual-register markers, including repeated punctuation and chat slang.
pub static CASUAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(hey|hi|sup|yo|nah|yeah|ok|cool|awesome)\b",
        r"(?i)\b(gonna|wanna|gotta|dunno|kinda|sorta)\b",
        r"[!]{2,}|[?]{2,}",
        r"(?i)\b(lol|lmao|omg|wtf|tbh|imo)\b",
    ])
});

/// Emotional-register markers: feeling words, exclamations, emoji.
pub static EMOTIONAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(love|hate|amazing|terrible|excited|worried|sad|happy)\b",
        r"[!]+",
        r"(?i)\b(feel|feeling|felt|emotions?|heart)\b",
        r"😀|😂|😭|😍|😔|😡|❤️|💔",
    ])
});

/// Humor markers.
pub static HUMOR_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(?i)\b(haha|lol|funny|joke|kidding|lmao)\b",
        r"😂|😆|🤣|😄|😁",
        r"(?i)\b(sarcasm|irony|witty|clever)\b",
    ])
});

/// Curiosity markers: question marks, interrogatives, curiosity words.
pub static QUESTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"\?",
        r"(?i)\b(what|why|how|when|where|who)\b",
        r"(?i)\b(curious|wonder|interested|explain)\b",
    ])
});

/// Terminal punctuation, counted for the directness composite.
pub static TERMINAL_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]").unwrap());

/// Total matches for `text` across a pattern group.
pub fn group_matches(patterns: &[Regex], text: &str) -> usize {
    patterns.iter().map(|p| p.find_iter(text).count()).sum()
}
