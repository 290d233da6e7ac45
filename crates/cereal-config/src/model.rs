// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Cereal chat service.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Cereal configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CerealConfig {
    /// Agent identity and conversational defaults.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Groq API settings.
    #[serde(default)]
    pub groq: GroqConfig,

    /// Per-user memory store settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Web search settings.
    #[serde(default)]
    pub search: SearchConfig,

    /// Personality profiling settings.
    #[serde(default)]
    pub personality: PersonalityConfig,
}

/// Agent identity and conversational defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the persona.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Chat style used when a user has no stored preference.
    #[serde(default = "default_chat_style")]
    pub default_chat_style: String,

    /// Name used to address a user with no stored preferred name.
    #[serde(default = "default_user_name")]
    pub default_user_name: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            default_chat_style: default_chat_style(),
            default_user_name: default_user_name(),
        }
    }
}

fn default_agent_name() -> String {
    "Cereal".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_chat_style() -> String {
    "casual".to_string()
}

fn default_user_name() -> String {
    "there".to_string()
}

/// Groq API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GroqConfig {
    /// Groq API key. `None` requires the GROQ_API_KEY environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Chat completions endpoint URL (OpenAI-compatible).
    #[serde(default = "default_groq_base_url")]
    pub base_url: String,

    /// Default model for conversational replies.
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Model for summarization and interest extraction calls.
    #[serde(default = "default_utility_model")]
    pub utility_model: String,

    /// Temperature for conversational replies.
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,

    /// Temperature for summarization and extraction calls.
    #[serde(default = "default_utility_temperature")]
    pub utility_temperature: f32,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_groq_base_url(),
            chat_model: default_chat_model(),
            utility_model: default_utility_model(),
            chat_temperature: default_chat_temperature(),
            utility_temperature: default_utility_temperature(),
        }
    }
}

fn default_groq_base_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_chat_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_utility_model() -> String {
    "llama-3.1-8b-instant".to_string()
}

fn default_chat_temperature() -> f32 {
    0.7
}

fn default_utility_temperature() -> f32 {
    0.3
}

/// Per-user memory store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Root directory for per-user JSON state.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Active-log length at which pruning triggers.
    #[serde(default = "default_prune_threshold")]
    pub prune_threshold: usize,

    /// Records kept in full fidelity after pruning.
    #[serde(default = "default_active_window")]
    pub active_window: usize,

    /// Hours a cached search result stays reusable.
    #[serde(default = "default_freshness_hours")]
    pub freshness_hours: i64,

    /// Most recent search cache entries kept per user.
    #[serde(default = "default_cache_cap")]
    pub cache_cap: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            prune_threshold: default_prune_threshold(),
            active_window: default_active_window(),
            freshness_hours: default_freshness_hours(),
            cache_cap: default_cache_cap(),
        }
    }
}

fn default_data_dir() -> String {
    "memory/users".to_string()
}

fn default_prune_threshold() -> usize {
    10
}

fn default_active_window() -> usize {
    4
}

fn default_freshness_hours() -> i64 {
    24
}

fn default_cache_cap() -> usize {
    50
}

/// Web search configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    /// Whether the search subsystem is wired into the pipeline.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// SearxNG-compatible search endpoint URL. `None` disables live search.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Search region/language hint.
    #[serde(default = "default_region")]
    pub region: String,

    /// Maximum results fetched per live search.
    #[serde(default = "default_max_results")]
    pub max_results: u32,

    /// Hard timeout for one search provider call, in seconds.
    #[serde(default = "default_search_timeout")]
    pub timeout_secs: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            base_url: None,
            region: default_region(),
            max_results: default_max_results(),
            timeout_secs: default_search_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_region() -> String {
    "wt-wt".to_string()
}

fn default_max_results() -> u32 {
    5
}

fn default_search_timeout() -> u64 {
    30
}

/// Personality profiling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonalityConfig {
    /// Whether the profiler is wired into the pipeline.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Days after which a profile is considered stale.
    #[serde(default = "default_stale_after_days")]
    pub stale_after_days: i64,

    /// New user messages that trigger a recompute.
    #[serde(default = "default_growth_threshold")]
    pub recompute_after_messages: usize,

    /// Character cap on the corpus sent for interest extraction.
    #[serde(default = "default_corpus_limit")]
    pub corpus_limit_chars: usize,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            stale_after_days: default_stale_after_days(),
            recompute_after_messages: default_growth_threshold(),
            corpus_limit_chars: default_corpus_limit(),
        }
    }
}

fn default_stale_after_days() -> i64 {
    3
}

fn default_growth_threshold() -> usize {
    5
}

fn default_corpus_limit() -> usize {
    2000
}
