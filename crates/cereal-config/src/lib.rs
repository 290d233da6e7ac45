// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Cereal chat service.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`), XDG file hierarchy lookup, environment variable
//! overrides, and typo suggestions for unknown keys.
//!
//! # Usage
//!
//! ```no_run
//! use cereal_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("Persona: {}", config.agent.name);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::CerealConfig;
pub use validation::VALID_CHAT_STYLES;

/// Load configuration from the XDG hierarchy and validate it.
///
/// 1. Loads config from TOML files + env vars via Figment
/// 2. On success: runs post-deserialization validation
/// 3. On Figment error: converts to displayable diagnostics with typo suggestions
pub fn load_and_validate() -> Result<CerealConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<CerealConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => Err(diagnostic::figment_to_config_errors(err)),
    }
}
