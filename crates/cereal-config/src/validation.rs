// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as threshold ordering and temperature ranges.

use crate::diagnostic::ConfigError;
use crate::model::CerealConfig;

/// Chat styles the preference layer accepts.
pub const VALID_CHAT_STYLES: [&str; 2] = ["casual", "formal"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CerealConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.agent.name.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "agent.name must not be empty".to_string(),
        });
    }

    if !VALID_CHAT_STYLES.contains(&config.agent.default_chat_style.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "agent.default_chat_style must be one of {VALID_CHAT_STYLES:?}, got `{}`",
                config.agent.default_chat_style
            ),
        });
    }

    for (key, value) in [
        ("groq.chat_temperature", config.groq.chat_temperature),
        ("groq.utility_temperature", config.groq.utility_temperature),
    ] {
        if !(0.0..=2.0).contains(&value) {
            errors.push(ConfigError::Validation {
                message: format!("{key} must be within [0.0, 2.0], got {value}"),
            });
        }
    }

    if config.memory.data_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "memory.data_dir must not be empty".to_string(),
        });
    }

    // Pruning keeps `active_window` records, so the trigger threshold must
    // sit strictly above the window or pruning would loop on every append.
    if config.memory.prune_threshold <= config.memory.active_window {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.prune_threshold ({}) must be greater than memory.active_window ({})",
                config.memory.prune_threshold, config.memory.active_window
            ),
        });
    }

    if config.memory.freshness_hours < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "memory.freshness_hours must be at least 1, got {}",
                config.memory.freshness_hours
            ),
        });
    }

    if config.search.max_results == 0 {
        errors.push(ConfigError::Validation {
            message: "search.max_results must be at least 1".to_string(),
        });
    }

    if config.personality.stale_after_days < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "personality.stale_after_days must be at least 1, got {}",
                config.personality.stale_after_days
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CerealConfig;

    #[test]
    fn default_config_is_valid() {
        let config = CerealConfig::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn rejects_inverted_prune_window() {
        let mut config = CerealConfig::default();
        config.memory.prune_threshold = 4;
        config.memory.active_window = 10;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("prune_threshold")));
    }

    #[test]
    fn rejects_unknown_chat_style() {
        let mut config = CerealConfig::default();
        config.agent.default_chat_style = "sarcastic".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("default_chat_style")));
    }

    #[test]
    fn rejects_out_of_range_temperature() {
        let mut config = CerealConfig::default();
        config.groq.chat_temperature = 3.5;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = CerealConfig::default();
        config.agent.name = "  ".to_string();
        config.search.max_results = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
