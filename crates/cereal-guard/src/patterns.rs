// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The shared pattern tables behind both filters.
//!
//! One versioned table per classifier, compiled once. Entry filtering
//! (inbound injection) and exit filtering (outbound leak) read these same
//! tables so the two boundaries can never drift apart.

use std::sync::LazyLock;

use regex::Regex;

/// Bumped whenever either table changes, so log lines can be correlated
/// with the pattern set that produced them.
pub const PATTERN_TABLE_VERSION: u32 = 1;

/// A named, case-insensitive pattern. The name appears in diagnostic logs.
pub struct NamedPattern {
    pub name: &'static str,
    pub regex: Regex,
}

fn compile(entries: &[(&'static str, &'static str)]) -> Vec<NamedPattern> {
    entries
        .iter()
        .map(|(name, pattern)| NamedPattern {
            name,
            regex: Regex::new(&format!("(?i){pattern}"))
                .unwrap_or_else(|e| panic!("invalid pattern `{name}`: {e}")),
        })
        .collect()
}

/// Inbound patterns: instruction-override phrases, meta-AI self-reference,
/// and "reveal your prompt" phrasings. Ordered; first match wins.
pub static INJECTION_PATTERNS: LazyLock<Vec<NamedPattern>> = LazyLock::new(|| {
    compile(&[
        ("ignore-previous", r"ignore previous instructions"),
        ("forget-told", r"forget (all )?what I told you"),
        ("system-prompt", r"system prompt(s)?"),
        ("you-are-now", r"you are now"),
        ("new-instructions", r"new instructions"),
        ("override", r"override( this)?"),
        ("jailbreak", r"jailbreak"),
        ("reveal-prompt", r"reveal your prompt(s)?"),
        ("show-instructions", r"show me your instructions?"),
        ("ask-guidelines", r"what are your guidelines?"),
        ("disregard", r"disregard (previous )?instructions?"),
        ("pretend", r"pretend you are"),
        ("act-as-if", r"act as if"),
        ("roleplay-as", r"roleplay as"),
        ("simulate", r"simulate"),
        ("behave-like", r"behave like"),
        ("your-creator", r"your creator"),
        ("your-developer", r"your developer"),
        ("meta-ai", r"meta ai"),
        ("anthropic", r"anthropic"),
        ("openai", r"openai"),
        ("base-prompt", r"what is your base prompt"),
        ("programming", r"tell me about your programming"),
        ("rules-followed", r"what rules do you follow"),
        ("training", r"how were you trained"),
        ("internal-settings", r"access your internal settings"),
        ("debug-mode", r"debug mode"),
        ("print-instructions", r"print (all )?instructions"),
        ("display-rules", r"display (all )?rules"),
        ("dump-context", r"dump context"),
        ("initial-setup", r"give me your initial setup"),
        ("directive", r"explain your directive"),
    ])
});

/// Outbound patterns: the model echoing configuration, internal variable
/// names, or AI self-identification. Ordered; first match wins.
pub static LEAK_PATTERNS: LazyLock<Vec<NamedPattern>> = LazyLock::new(|| {
    compile(&[
        ("system-prompt", r"system prompt(s)?"),
        ("name-disclosure", r"your name is cereal"),
        ("var-personality-prompt", r"personality_prompt"),
        ("var-current-date", r"current_date"),
        ("var-user-prefs", r"user_prefs"),
        ("var-chat-style", r"chat_style"),
        ("meta-ai", r"meta ai"),
        ("anthropic", r"anthropic"),
        ("openai", r"openai"),
        ("base-prompt", r"base prompt"),
        ("my-programming", r"my programming"),
        ("internal-settings", r"internal settings"),
        ("rules-followed", r"rules I follow"),
        ("how-trained", r"how I was trained"),
        ("core-directive", r"my core directive"),
        ("as-ai-model", r"as an ai model"),
        ("pre-programmed", r"my pre-programmed response"),
        ("initial-setup", r"my initial setup"),
        ("given-context", r"the context I was given"),
        ("as-language-model", r"as a language model"),
        ("i-am-an-ai", r"i am an ai"),
        ("underlying-code", r"my underlying code"),
        ("my-design", r"my design"),
        ("my-guidelines", r"my guidelines"),
        ("my-instructions", r"my instructions"),
    ])
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_compile_and_are_nonempty() {
        assert!(INJECTION_PATTERNS.len() >= 30);
        assert!(LEAK_PATTERNS.len() >= 20);
    }

    #[test]
    fn patterns_are_case_insensitive() {
        let jailbreak = INJECTION_PATTERNS
            .iter()
            .find(|p| p.name == "jailbreak")
            .unwrap();
        assert!(jailbreak.regex.is_match("JAILBREAK mode please"));
    }

    #[test]
    fn pattern_names_are_unique_per_table() {
        for table in [&*INJECTION_PATTERNS, &*LEAK_PATTERNS] {
            let mut names: Vec<_> = table.iter().map(|p| p.name).collect();
            names.sort_unstable();
            let before = names.len();
            names.dedup();
            assert_eq!(before, names.len());
        }
    }
}
