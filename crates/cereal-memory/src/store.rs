// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-user JSON file store.
//!
//! Each user owns one directory under the configured root, named by
//! [`UserId::storage_key`], holding five independent files:
//!
//! - `memory.json` - the active conversation log (role-tagged records)
//! - `summary.json` - append-only digests produced by pruning
//! - `data.json` - preference key/value map with bookkeeping timestamps
//! - `search_cache.json` - recent web search results
//! - `profile.json` - the current personality snapshot
//!
//! Missing or corrupt files read back as empty; a corrupt file is logged
//! and overwritten on the next write rather than failing the turn.

use std::path::{Path, PathBuf};

use cereal_core::{
    CerealError, ConversationSummary, MemoryRecord, PersonalityProfile, SearchCacheEntry, UserId,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::summarizer::Summarizer;

const MEMORY_FILE: &str = "memory.json";
const SUMMARY_FILE: &str = "summary.json";
const DATA_FILE: &str = "data.json";
const SEARCH_CACHE_FILE: &str = "search_cache.json";
const PROFILE_FILE: &str = "profile.json";

/// Helper to convert filesystem errors into CerealError::Storage.
fn storage_err(e: std::io::Error) -> CerealError {
    CerealError::Storage {
        source: Box::new(e),
    }
}

/// Persistent per-user store backed by JSON files.
///
/// Holds the pruning parameters and the summarizer used to digest old
/// turns when the active log overflows.
#[derive(Clone)]
pub struct MemoryStore {
    root: PathBuf,
    prune_threshold: usize,
    active_window: usize,
    cache_cap: usize,
    summarizer: Summarizer,
}

impl MemoryStore {
    pub fn new(
        root: impl Into<PathBuf>,
        prune_threshold: usize,
        active_window: usize,
        cache_cap: usize,
        summarizer: Summarizer,
    ) -> Self {
        MemoryStore {
            root: root.into(),
            prune_threshold,
            active_window,
            cache_cap,
            summarizer,
        }
    }

    fn user_dir(&self, user: &UserId) -> PathBuf {
        self.root.join(user.storage_key())
    }

    fn user_file(&self, user: &UserId, name: &str) -> PathBuf {
        self.user_dir(user).join(name)
    }

    /// Loads the active conversation log. Missing or corrupt files read
    /// back as an empty log.
    pub async fn load_active(&self, user: &UserId) -> Result<Vec<MemoryRecord>, CerealError> {
        read_json_or_default(&self.user_file(user, MEMORY_FILE)).await
    }

    /// Appends one user/assistant exchange and prunes if the log has
    /// reached the threshold.
    ///
    /// Pruning summarizes everything except the most recent
    /// `active_window` records into one [`ConversationSummary`] and keeps
    /// only that window in the active log.
    pub async fn append_exchange(
        &self,
        user: &UserId,
        prompt: &str,
        reply: &str,
    ) -> Result<(), CerealError> {
        let mut records = self.load_active(user).await?;
        records.push(MemoryRecord::user(prompt));
        records.push(MemoryRecord::assistant(reply));

        if records.len() >= self.prune_threshold && records.len() > self.active_window {
            let keep_from = records.len() - self.active_window;
            let older: Vec<MemoryRecord> = records.drain(..keep_from).collect();
            debug!(
                user = %user,
                pruned = older.len(),
                kept = records.len(),
                "pruning active memory log"
            );

            let transcript = older
                .iter()
                .map(|r| format!("{}: {}", role_label(r), r.text()))
                .collect::<Vec<_>>()
                .join("\n");
            let output = self
                .summarizer
                .summarize(
                    &transcript,
                    "Condense these older conversation turns, keeping facts about the user \
                     and any ongoing topics.",
                )
                .await;

            let mut summaries = self.load_summaries(user).await?;
            summaries.push(ConversationSummary {
                text: output.text,
                user_email: user.as_str().to_string(),
                timestamp: Utc::now(),
            });
            self.write_user_json(user, SUMMARY_FILE, &summaries).await?;
        }

        self.write_user_json(user, MEMORY_FILE, &records).await
    }

    /// Wipes the active log and all summaries. Preferences, the search
    /// cache, and the personality profile are untouched.
    pub async fn clear(&self, user: &UserId) -> Result<(), CerealError> {
        for name in [MEMORY_FILE, SUMMARY_FILE] {
            match tokio::fs::remove_file(self.user_file(user, name)).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(storage_err(e)),
            }
        }
        Ok(())
    }

    /// Loads all conversation summaries, oldest first.
    pub async fn load_summaries(
        &self,
        user: &UserId,
    ) -> Result<Vec<ConversationSummary>, CerealError> {
        read_json_or_default(&self.user_file(user, SUMMARY_FILE)).await
    }

    /// Reads one preference value from `data.json`.
    pub async fn get_preference(
        &self,
        user: &UserId,
        key: &str,
    ) -> Result<Option<String>, CerealError> {
        let data: Value = read_json_or_default(&self.user_file(user, DATA_FILE)).await?;
        Ok(data
            .get(key)
            .and_then(Value::as_str)
            .map(ToString::to_string))
    }

    /// Writes one preference value, maintaining the `email`, `created_at`,
    /// and `last_updated` bookkeeping fields.
    pub async fn set_preference(
        &self,
        user: &UserId,
        key: &str,
        value: &str,
    ) -> Result<(), CerealError> {
        let mut data: Value = read_json_or_default(&self.user_file(user, DATA_FILE)).await?;
        if !data.is_object() {
            data = Value::Object(serde_json::Map::new());
        }
        let now = Utc::now().to_rfc3339();
        let map = data.as_object_mut().unwrap();
        map.entry("email".to_string())
            .or_insert_with(|| Value::String(user.as_str().to_string()));
        map.entry("created_at".to_string())
            .or_insert_with(|| Value::String(now.clone()));
        map.insert("last_updated".to_string(), Value::String(now));
        map.insert(key.to_string(), Value::String(value.to_string()));

        self.write_user_json(user, DATA_FILE, &data).await
    }

    /// Loads the search cache, oldest entry first.
    pub async fn load_search_cache(
        &self,
        user: &UserId,
    ) -> Result<Vec<SearchCacheEntry>, CerealError> {
        read_json_or_default(&self.user_file(user, SEARCH_CACHE_FILE)).await
    }

    /// Appends one cache entry, dropping the oldest entries beyond the cap.
    pub async fn save_search_entry(
        &self,
        user: &UserId,
        entry: SearchCacheEntry,
    ) -> Result<(), CerealError> {
        let mut cache = self.load_search_cache(user).await?;
        cache.push(entry);
        if cache.len() > self.cache_cap {
            let drop = cache.len() - self.cache_cap;
            cache.drain(..drop);
        }
        self.write_user_json(user, SEARCH_CACHE_FILE, &cache).await
    }

    /// Loads the personality profile, if one has been computed.
    pub async fn load_profile(
        &self,
        user: &UserId,
    ) -> Result<Option<PersonalityProfile>, CerealError> {
        let path = self.user_file(user, PROFILE_FILE);
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(profile) => Ok(Some(profile)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "corrupt profile file, ignoring");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_err(e)),
        }
    }

    pub async fn save_profile(
        &self,
        user: &UserId,
        profile: &PersonalityProfile,
    ) -> Result<(), CerealError> {
        self.write_user_json(user, PROFILE_FILE, profile).await
    }

    async fn write_user_json<T: Serialize>(
        &self,
        user: &UserId,
        name: &str,
        value: &T,
    ) -> Result<(), CerealError> {
        let dir = self.user_dir(user);
        tokio::fs::create_dir_all(&dir).await.map_err(storage_err)?;
        let body = serde_json::to_string_pretty(value).map_err(|e| CerealError::Storage {
            source: Box::new(e),
        })?;
        tokio::fs::write(dir.join(name), body)
            .await
            .map_err(storage_err)
    }
}

fn role_label(record: &MemoryRecord) -> &'static str {
    if record.is_user() {
        "User"
    } else {
        "Assistant"
    }
}

/// Reads a JSON file, treating a missing file as the default value and a
/// corrupt file as the default value with a warning.
async fn read_json_or_default<T>(path: &Path) -> Result<T, CerealError>
where
    T: DeserializeOwned + Default,
{
    match tokio::fs::read_to_string(path).await {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt store file, starting empty");
                Ok(T::default())
            }
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(T::default()),
        Err(e) => Err(storage_err(e)),
    }
}
