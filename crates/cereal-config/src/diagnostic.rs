// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Diagnostic rendering for configuration errors.
//!
//! Figment errors are flattened into [`ConfigError`] values; unknown-key
//! errors get a "did you mean" suggestion via strsim.

use thiserror::Error;

/// A configuration error suitable for end-user display.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse or deserialization failure.
    #[error("config parse error: {message}")]
    Parse { message: String },

    /// Semantic validation failure after successful deserialization.
    #[error("config validation error: {message}")]
    Validation { message: String },
}

/// Known config keys, used for typo suggestions on unknown-field errors.
const KNOWN_KEYS: [&str; 24] = [
    "agent.name",
    "agent.log_level",
    "agent.default_chat_style",
    "agent.default_user_name",
    "groq.api_key",
    "groq.base_url",
    "groq.chat_model",
    "groq.utility_model",
    "groq.chat_temperature",
    "groq.utility_temperature",
    "memory.data_dir",
    "memory.prune_threshold",
    "memory.active_window",
    "memory.freshness_hours",
    "memory.cache_cap",
    "search.enabled",
    "search.base_url",
    "search.region",
    "search.max_results",
    "search.timeout_secs",
    "personality.enabled",
    "personality.stale_after_days",
    "personality.recompute_after_messages",
    "personality.corpus_limit_chars",
];

/// Convert a figment error chain into displayable [`ConfigError`]s.
pub fn figment_to_config_errors(err: figment::Error) -> Vec<ConfigError> {
    err.into_iter()
        .map(|e| {
            let mut message = e.to_string();
            if let Some(suggestion) = suggest_key(&message) {
                message.push_str(&format!(" (did you mean `{suggestion}`?)"));
            }
            ConfigError::Parse { message }
        })
        .collect()
}

/// Suggest the closest known key when the message mentions an unknown field.
fn suggest_key(message: &str) -> Option<&'static str> {
    // Figment reports unknown fields as: unknown field `nmae`, expected ...
    let start = message.find("unknown field `")? + "unknown field `".len();
    let rest = &message[start..];
    let end = rest.find('`')?;
    let unknown = &rest[..end];

    KNOWN_KEYS
        .iter()
        .map(|known| {
            let leaf = known.rsplit('.').next().unwrap_or(known);
            (strsim::jaro_winkler(unknown, leaf), *known)
        })
        .filter(|(score, _)| *score > 0.85)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key)
}

/// Print collected config errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    for error in errors {
        eprintln!("cereal: {error}");
    }
}
