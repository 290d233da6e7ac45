// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command recognition for turns that bypass the model entirely.
//!
//! Parsing is pure; the pipeline executes the side effects. Matching is
//! case-insensitive but preserves the original casing of captured values
//! (a name set via "CALL ME Sam" stays "Sam").

/// Fixed reply after a successful memory wipe.
pub const MEMORY_WIPED_REPLY: &str = "All your memory has been wiped as you requested.";

/// Fixed reply when memory commands arrive without a memory store.
pub const MEMORY_UNAVAILABLE_REPLY: &str = "Memory system is not available.";

/// Fixed reply when personality commands arrive without a profiler.
pub const PERSONALITY_UNAVAILABLE_REPLY: &str =
    "Personality profiling is not available right now. Please check your system configuration.";

/// Guidance reply for personality phrasings that are not the stats request.
pub const PERSONALITY_GUIDANCE_REPLY: &str =
    "I can show you your personality profile by saying 'show my personality' or 'personality stats'.";

/// Fixed reply when the stats lookup itself fails.
pub const PERSONALITY_LOOKUP_FAILED_REPLY: &str =
    "Sorry, I had trouble accessing your personality profile. Please try again later.";

/// Fixed reply when preference commands arrive without a memory store.
pub const PREFERENCES_UNAVAILABLE_REPLY: &str = "Preference settings are not available right now.";

/// Fixed reply for chat style switches.
pub const CASUAL_STYLE_REPLY: &str = "Switched to casual chat style! 😊";
pub const FORMAL_STYLE_REPLY: &str = "Switched to formal chat style.";

/// Fixed reply for a preference phrasing that parsed but carried no value.
pub const UNKNOWN_PREFERENCE_REPLY: &str =
    "I didn't quite understand that preference. Try 'call me [name]' or 'set chat style to casual/formal'.";

/// How a recognized name command should be acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameAck {
    /// "Got it! I'll call you {name} from now on."
    Directive,
    /// "Nice to meet you, {name}! I'll remember that."
    Introduction,
}

impl NameAck {
    pub fn reply(&self, name: &str) -> String {
        match self {
            NameAck::Directive => format!("Got it! I'll call you {name} from now on."),
            NameAck::Introduction => format!("Nice to meet you, {name}! I'll remember that."),
        }
    }
}

/// A prompt recognized as a command rather than chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ForgetAllMemory,
    PersonalityStats,
    PersonalityGuidance,
    SetName { name: String, ack: NameAck },
    SetChatStyle { style: &'static str },
    UnknownPreference,
}

const PERSONALITY_PHRASES: &[&str] = &[
    "show my personality",
    "personality profile",
    "my communication style",
    "how do i talk",
    "analyze my personality",
    "personality stats",
];

const STATS_PHRASES: &[&str] = &["show my personality", "personality profile", "personality stats"];

/// Recognizes a command in `prompt`, or returns None for ordinary chat.
pub fn parse_command(prompt: &str) -> Option<Command> {
    let trimmed = prompt.trim();
    let lower = trimmed.to_lowercase();

    if lower == "forget all memory" {
        return Some(Command::ForgetAllMemory);
    }

    if PERSONALITY_PHRASES.iter().any(|p| lower.contains(p)) {
        if STATS_PHRASES.iter().any(|p| lower.contains(p)) {
            return Some(Command::PersonalityStats);
        }
        return Some(Command::PersonalityGuidance);
    }

    if is_preference_phrasing(&lower) {
        if let Some(rest) = strip_prefix_ci(trimmed, "set my name to") {
            return Some(Command::SetName {
                name: rest.trim().to_string(),
                ack: NameAck::Directive,
            });
        }
        if let Some(rest) = strip_prefix_ci(trimmed, "call me") {
            return Some(Command::SetName {
                name: rest.trim().to_string(),
                ack: NameAck::Directive,
            });
        }
        if let Some(rest) = strip_prefix_ci(trimmed, "my name is") {
            return Some(Command::SetName {
                name: rest.trim().to_string(),
                ack: NameAck::Introduction,
            });
        }
        if lower.contains("chat style") {
            if lower.contains("casual") {
                return Some(Command::SetChatStyle { style: "casual" });
            }
            if lower.contains("formal") {
                return Some(Command::SetChatStyle { style: "formal" });
            }
        }
        return Some(Command::UnknownPreference);
    }

    None
}

fn is_preference_phrasing(lower: &str) -> bool {
    lower.starts_with("set my name to")
        || lower.starts_with("call me")
        || lower.starts_with("my name is")
        || lower.contains("chat style")
        || (lower.contains("prefer") && (lower.contains("casual") || lower.contains("formal")))
}

/// Case-insensitive prefix strip that preserves the original casing of the
/// remainder. The boundary check keeps multibyte text from being sliced
/// mid-character; an ASCII prefix can only match at a char boundary anyway.
fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if text.len() >= prefix.len()
        && text.is_char_boundary(prefix.len())
        && text[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}
