// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Cereal workspace.
//!
//! Everything persisted per user is keyed by [`UserId`]. Memory records carry
//! their role as a serde tag so on-disk entries stay compatible with the
//! `{"message": ..., "role": ..., "timestamp": ...}` shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque stable identity string for a user (an email address in practice).
///
/// The sole key for all per-user state. The pipeline performs no
/// authentication; callers hand in an already-resolved identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filesystem-safe encoding of the identity, used as the per-user
    /// directory name: `@` becomes `_at_`, `.` becomes `_dot_`, and path
    /// separators become `_sep_` so an identity can never name a path
    /// outside the store root.
    pub fn storage_key(&self) -> String {
        self.0
            .replace('@', "_at_")
            .replace('.', "_dot_")
            .replace(['/', '\\'], "_sep_")
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Role of a chat message sent to the completion provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// One entry in the ordered message list sent to the completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        ChatMessage {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A request to the completion provider, shared by the streaming and
/// single-shot paths.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    /// `None` uses the provider's configured default model.
    pub model: Option<String>,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, temperature: f32) -> Self {
        CompletionRequest {
            messages,
            model: None,
            temperature,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// One half of a conversation turn in a user's active memory log.
///
/// Tagged by role so consumers never infer the speaker from field
/// presence. Always appended in user-then-assistant pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum MemoryRecord {
    User {
        #[serde(rename = "message")]
        text: String,
        timestamp: DateTime<Utc>,
    },
    Assistant {
        #[serde(rename = "message")]
        text: String,
        timestamp: DateTime<Utc>,
    },
}

impl MemoryRecord {
    pub fn user(text: impl Into<String>) -> Self {
        MemoryRecord::User {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        MemoryRecord::Assistant {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            MemoryRecord::User { text, .. } | MemoryRecord::Assistant { text, .. } => text,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            MemoryRecord::User { timestamp, .. } | MemoryRecord::Assistant { timestamp, .. } => {
                *timestamp
            }
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, MemoryRecord::User { .. })
    }

    pub fn role(&self) -> ChatRole {
        match self {
            MemoryRecord::User { .. } => ChatRole::User,
            MemoryRecord::Assistant { .. } => ChatRole::Assistant,
        }
    }
}

/// A compacted digest of older turns, produced when the active memory log
/// overflows. Append-only; never edited or merged after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    #[serde(rename = "message")]
    pub text: String,
    pub user_email: String,
    pub timestamp: DateTime<Utc>,
}

/// A cached web search result with a 24-hour freshness window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchCacheEntry {
    pub query: String,
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// One result from the search provider. Fields may be individually absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub body: Option<String>,
    pub href: Option<String>,
}

/// The 8-dimensional communication-style vector, every value in [0, 1].
///
/// 0.5 is the neutral default for each dimension; a vector that is entirely
/// neutral signals a profile that was never genuinely computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraitVector {
    pub formality: f64,
    pub verbosity: f64,
    pub emotiveness: f64,
    pub humor: f64,
    pub curiosity: f64,
    pub directness: f64,
    pub politeness: f64,
    pub creativity: f64,
}

impl Default for TraitVector {
    fn default() -> Self {
        TraitVector {
            formality: 0.5,
            verbosity: 0.5,
            emotiveness: 0.5,
            humor: 0.5,
            curiosity: 0.5,
            directness: 0.5,
            politeness: 0.5,
            creativity: 0.5,
        }
    }
}

impl TraitVector {
    /// True when every dimension still sits at the 0.5 default.
    pub fn is_neutral(&self) -> bool {
        self.named().iter().all(|(_, v)| *v == 0.5)
    }

    /// Name/value pairs in a fixed presentation order.
    pub fn named(&self) -> [(&'static str, f64); 8] {
        [
            ("formality", self.formality),
            ("verbosity", self.verbosity),
            ("emotiveness", self.emotiveness),
            ("humor", self.humor),
            ("curiosity", self.curiosity),
            ("directness", self.directness),
            ("politeness", self.politeness),
            ("creativity", self.creativity),
        ]
    }
}

/// The current personality snapshot for one user. Overwritten on recompute,
/// never versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityProfile {
    #[serde(rename = "personality_traits")]
    pub traits: TraitVector,
    #[serde(default)]
    pub interests: Vec<String>,
    pub communication_style: String,
    #[serde(default)]
    pub common_phrases: Vec<String>,
    #[serde(default)]
    pub preferred_topics: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub message_count: usize,
    pub conversation_count: usize,
}
