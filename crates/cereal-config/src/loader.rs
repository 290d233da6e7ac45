// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./cereal.toml` > `~/.config/cereal/cereal.toml` >
//! `/etc/cereal/cereal.toml` with environment variable overrides via the
//! `CEREAL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::CerealConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/cereal/cereal.toml` (system-wide)
/// 3. `~/.config/cereal/cereal.toml` (user XDG config)
/// 4. `./cereal.toml` (local directory)
/// 5. `CEREAL_*` environment variables
pub fn load_config() -> Result<CerealConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CerealConfig::default()))
        .merge(Toml::file("/etc/cereal/cereal.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("cereal/cereal.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("cereal.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<CerealConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CerealConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<CerealConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(CerealConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `CEREAL_GROQ_API_KEY` must map to
/// `groq.api_key`, not `groq.api.key`.
fn env_provider() -> Env {
    Env::prefixed("CEREAL_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: CEREAL_GROQ_API_KEY -> "groq_api_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("agent_", "agent.", 1)
            .replacen("groq_", "groq.", 1)
            .replacen("memory_", "memory.", 1)
            .replacen("search_", "search.", 1)
            .replacen("personality_", "personality.", 1);
        mapped.into()
    })
}
