// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile lifecycle: staleness checks, recomputation, and rendering.
//!
//! The deterministic trait vector comes from [`crate::analysis`]; the
//! open-ended fields (interests, communication style, common phrases) come
//! from one utility-model call over the truncated conversation corpus.
//! Either half degrades independently: a failed model call leaves the
//! open-ended fields at their neutral defaults.

use std::sync::Arc;

use cereal_core::{
    CerealError, ChatMessage, CompletionProvider, CompletionRequest, PersonalityProfile, UserId,
};
use cereal_memory::MemoryStore;
use chrono::{Duration, Utc};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Matches the outermost JSON object in model output.
static JSON_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Open-ended profile fields extracted by the utility model.
#[derive(Debug, Clone, Deserialize)]
struct InterestData {
    #[serde(default)]
    interests: Vec<String>,
    #[serde(default = "neutral_style")]
    communication_style: String,
    #[serde(default)]
    common_phrases: Vec<String>,
    #[serde(default)]
    preferred_topics: Vec<String>,
}

fn neutral_style() -> String {
    "neutral".to_string()
}

impl Default for InterestData {
    fn default() -> Self {
        InterestData {
            interests: Vec::new(),
            communication_style: neutral_style(),
            common_phrases: Vec::new(),
            preferred_topics: Vec::new(),
        }
    }
}

/// Computes and maintains per-user personality profiles.
#[derive(Clone)]
pub struct Profiler {
    store: Arc<MemoryStore>,
    provider: Option<Arc<dyn CompletionProvider>>,
    model: Option<String>,
    temperature: f32,
    stale_after_days: i64,
    growth_threshold: usize,
    corpus_limit_chars: usize,
}

impl Profiler {
    pub fn new(
        store: Arc<MemoryStore>,
        provider: Option<Arc<dyn CompletionProvider>>,
        model: Option<String>,
        stale_after_days: i64,
        growth_threshold: usize,
        corpus_limit_chars: usize,
    ) -> Self {
        Profiler {
            store,
            provider,
            model,
            temperature: 0.3,
            stale_after_days,
            growth_threshold,
            corpus_limit_chars,
        }
    }

    /// Recomputes the profile when it is missing, stale, outgrown, or
    /// still entirely neutral. Returns true when a recompute ran.
    pub async fn refresh_if_needed(&self, user: &UserId) -> Result<bool, CerealError> {
        let profile = self.store.load_profile(user).await?;
        let records = self.store.load_active(user).await?;
        let user_message_count = records.iter().filter(|r| r.is_user()).count();

        if !self.should_recompute(profile.as_ref(), user_message_count) {
            return Ok(false);
        }

        debug!(user = %user, "recomputing personality profile");
        self.recompute(user).await?;
        Ok(true)
    }

    fn should_recompute(&self, profile: Option<&PersonalityProfile>, message_count: usize) -> bool {
        let Some(profile) = profile else {
            return true;
        };
        if Utc::now() - profile.last_updated > Duration::days(self.stale_after_days) {
            return true;
        }
        if message_count > profile.message_count + self.growth_threshold {
            return true;
        }
        profile.traits.is_neutral()
    }

    /// Rebuilds the profile from the current memory log and summaries,
    /// persists it, and returns it.
    pub async fn recompute(&self, user: &UserId) -> Result<PersonalityProfile, CerealError> {
        let records = self.store.load_active(user).await?;
        let summaries = self.store.load_summaries(user).await?;

        let user_texts: Vec<&str> = records
            .iter()
            .filter(|r| r.is_user())
            .map(|r| r.text())
            .collect();
        let traits = crate::analysis::compute_traits(&user_texts);

        let mut corpus = user_texts.join(" ");
        for summary in &summaries {
            corpus.push(' ');
            corpus.push_str(&summary.text);
        }
        let interests = self.extract_interests(&corpus).await;

        let profile = PersonalityProfile {
            traits,
            interests: interests.interests,
            communication_style: interests.communication_style,
            common_phrases: interests.common_phrases,
            preferred_topics: interests.preferred_topics,
            last_updated: Utc::now(),
            message_count: user_texts.len(),
            conversation_count: summaries.len(),
        };

        self.store.save_profile(user, &profile).await?;
        Ok(profile)
    }

    /// One utility-model call over the truncated corpus. Any failure, at
    /// transport or parse level, yields the neutral defaults.
    async fn extract_interests(&self, corpus: &str) -> InterestData {
        let Some(provider) = &self.provider else {
            return InterestData::default();
        };
        if corpus.trim().is_empty() {
            return InterestData::default();
        }

        let truncated: String = corpus.chars().take(self.corpus_limit_chars).collect();
        let prompt = format!(
            "Analyze the following text and extract:\n\
             1. Main interests and topics the person talks about\n\
             2. Communication style (formal/casual, emotional/analytical, direct/indirect)\n\
             3. Common phrases and preferred topics\n\n\
             Text: {truncated}\n\n\
             Respond in JSON format:\n\
             {{\n\
               \"interests\": [\"interest1\", \"interest2\"],\n\
               \"communication_style\": \"description\",\n\
               \"common_phrases\": [\"phrase1\", \"phrase2\"],\n\
               \"preferred_topics\": [\"topic1\", \"topic2\"]\n\
             }}"
        );

        let mut request =
            CompletionRequest::new(vec![ChatMessage::user(prompt)], self.temperature);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        match provider.complete(request).await {
            Ok(reply) => match JSON_OBJECT
                .find(&reply)
                .and_then(|m| serde_json::from_str::<InterestData>(m.as_str()).ok())
            {
                Some(data) => data,
                None => {
                    warn!("interest extraction returned unparseable output");
                    InterestData::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "interest extraction call failed");
                InterestData::default()
            }
        }
    }
}

/// Renders the adaptive system-prompt fragment for a profile.
///
/// With no profile (or a never-computed trait vector) this is a single
/// generic persona line.
pub fn render_prompt_fragment(profile: Option<&PersonalityProfile>) -> String {
    let Some(profile) = profile else {
        return "You are Cereal, a helpful AI assistant. Keep responses conversational and \
                engaging."
            .to_string();
    };

    let traits = &profile.traits;
    let mut parts = vec!["You are Cereal, adapting to this user's communication style:".to_string()];

    if traits.formality > 0.65 {
        parts.push("- Use respectful, well-structured language".into());
    } else if traits.formality < 0.35 {
        parts.push("- Keep it casual and relaxed, use contractions freely".into());
    }

    if traits.verbosity > 0.65 {
        parts.push("- Provide thorough explanations and details".into());
    } else if traits.verbosity < 0.35 {
        parts.push("- Keep responses concise and direct".into());
    }

    if traits.emotiveness > 0.6 {
        parts.push("- Match their emotional energy and enthusiasm".into());
    } else if traits.emotiveness < 0.4 {
        parts.push("- Stay factual and analytical in your responses".into());
    }

    if traits.humor > 0.6 {
        parts.push("- Feel free to include humor and playful banter".into());
    } else if traits.humor < 0.3 {
        parts.push("- Keep responses serious and professional".into());
    }

    if traits.curiosity > 0.6 {
        parts.push("- Engage their curiosity with follow-up questions".into());
    }

    if traits.directness > 0.6 {
        parts.push("- Be direct and straight to the point".into());
    } else if traits.directness < 0.4 {
        parts.push("- Use gentle, indirect communication".into());
    }

    if !profile.interests.is_empty() {
        let top: Vec<&str> = profile.interests.iter().take(5).map(String::as_str).collect();
        parts.push(format!("- They're interested in: {}", top.join(", ")));
    }

    if profile.message_count > 0 {
        parts.push(format!(
            "- Based on {} previous interactions",
            profile.message_count
        ));
    }

    parts.join("\n")
}

/// Five-bucket descriptions per trait, casual end first.
const TRAIT_BUCKETS: [(&str, [&str; 5]); 8] = [
    (
        "Formality",
        ["Very casual 🤙", "Somewhat casual", "Balanced", "Somewhat formal", "Very formal 🎩"],
    ),
    (
        "Verbosity",
        ["Brief & concise", "Somewhat brief", "Balanced", "Somewhat detailed", "Very detailed 📝"],
    ),
    (
        "Emotiveness",
        ["Analytical 🔬", "Somewhat analytical", "Balanced", "Somewhat emotional", "Very emotional ❤️"],
    ),
    (
        "Humor",
        ["Serious 😐", "Somewhat serious", "Balanced", "Somewhat humorous", "Very humorous 😄"],
    ),
    (
        "Curiosity",
        ["Passive", "Somewhat passive", "Balanced", "Somewhat curious", "Very curious 🤔"],
    ),
    (
        "Directness",
        ["Indirect", "Somewhat indirect", "Balanced", "Somewhat direct", "Very direct 🎯"],
    ),
    (
        "Politeness",
        ["Blunt", "Somewhat blunt", "Balanced", "Somewhat polite", "Very polite 🙏"],
    ),
    (
        "Creativity",
        ["Practical", "Somewhat practical", "Balanced", "Somewhat creative", "Very creative 🎨"],
    ),
];

/// Renders the human-readable personality stats reply.
pub fn render_stats_reply(profile: Option<&PersonalityProfile>) -> String {
    let Some(profile) = profile else {
        return "I haven't analyzed your personality yet. Keep chatting with me and I'll learn \
                your communication style!"
            .to_string();
    };

    let mut reply = String::from("Here's what I've learned about your communication style:\n\n");

    // TRAIT_BUCKETS follows the presentation order of TraitVector::named.
    for ((title, buckets), (_, value)) in TRAIT_BUCKETS.iter().zip(profile.traits.named()) {
        let index = ((value * 5.0) as usize).min(4);
        reply.push_str(&format!("• {}: {}\n", title, buckets[index]));
    }

    if !profile.interests.is_empty() {
        let top: Vec<&str> = profile.interests.iter().take(5).map(String::as_str).collect();
        reply.push_str(&format!("\nYour main interests: {}\n", top.join(", ")));
    }

    reply.push_str(&format!(
        "\nBased on {} messages across {} conversations.",
        profile.message_count, profile.conversation_count
    ));

    reply
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cereal_core::{TextStream, TraitVector};
    use cereal_memory::Summarizer;
    use tempfile::TempDir;

    struct JsonProvider(String);

    #[async_trait]
    impl CompletionProvider for JsonProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<String, CerealError> {
            Ok(self.0.clone())
        }

        async fn stream(&self, _request: CompletionRequest) -> Result<TextStream, CerealError> {
            Err(CerealError::Internal("not used".into()))
        }
    }

    fn store(dir: &TempDir) -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new(dir.path(), 10, 4, 50, Summarizer::naive()))
    }

    fn profiler(store: Arc<MemoryStore>, provider: Option<Arc<dyn CompletionProvider>>) -> Profiler {
        Profiler::new(store, provider, None, 3, 5, 2000)
    }

    fn user() -> UserId {
        UserId::new("test@example.com")
    }

    fn dated_profile(days_ago: i64, message_count: usize, traits: TraitVector) -> PersonalityProfile {
        PersonalityProfile {
            traits,
            interests: Vec::new(),
            communication_style: "casual".into(),
            common_phrases: Vec::new(),
            preferred_topics: Vec::new(),
            last_updated: Utc::now() - Duration::days(days_ago),
            message_count,
            conversation_count: 0,
        }
    }

    fn non_neutral() -> TraitVector {
        TraitVector {
            humor: 0.8,
            ..TraitVector::default()
        }
    }

    #[tokio::test]
    async fn missing_profile_triggers_recompute() {
        let dir = TempDir::new().unwrap();
        let p = profiler(store(&dir), None);
        assert!(p.should_recompute(None, 0));
    }

    #[tokio::test]
    async fn stale_profile_triggers_recompute() {
        let dir = TempDir::new().unwrap();
        let p = profiler(store(&dir), None);
        assert!(p.should_recompute(Some(&dated_profile(4, 0, non_neutral())), 0));
        assert!(!p.should_recompute(Some(&dated_profile(1, 0, non_neutral())), 0));
    }

    #[tokio::test]
    async fn message_growth_triggers_recompute() {
        let dir = TempDir::new().unwrap();
        let p = profiler(store(&dir), None);
        let profile = dated_profile(0, 3, non_neutral());
        assert!(p.should_recompute(Some(&profile), 9));
        assert!(!p.should_recompute(Some(&profile), 8));
    }

    #[tokio::test]
    async fn all_neutral_profile_triggers_recompute() {
        let dir = TempDir::new().unwrap();
        let p = profiler(store(&dir), None);
        assert!(p.should_recompute(Some(&dated_profile(0, 0, TraitVector::default())), 0));
    }

    #[tokio::test]
    async fn recompute_without_provider_saves_computed_traits() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .append_exchange(&user(), "hey lol whats up??", "not much!")
            .await
            .unwrap();

        let p = profiler(Arc::clone(&store), None);
        let profile = p.recompute(&user()).await.unwrap();

        assert!(profile.traits.formality < 0.5);
        assert_eq!(profile.communication_style, "neutral");
        assert_eq!(profile.message_count, 1);
        assert!(store.load_profile(&user()).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn recompute_parses_interest_json_with_surrounding_prose() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .append_exchange(&user(), "I went hiking again this weekend", "Nice!")
            .await
            .unwrap();

        let reply = "Sure, here is the analysis:\n{\"interests\": [\"hiking\"], \
                     \"communication_style\": \"casual\", \"common_phrases\": [], \
                     \"preferred_topics\": [\"outdoors\"]}";
        let p = profiler(Arc::clone(&store), Some(Arc::new(JsonProvider(reply.into()))));
        let profile = p.recompute(&user()).await.unwrap();

        assert_eq!(profile.interests, vec!["hiking"]);
        assert_eq!(profile.communication_style, "casual");
        assert_eq!(profile.preferred_topics, vec!["outdoors"]);
    }

    #[tokio::test]
    async fn unparseable_interest_output_degrades_to_neutral() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store
            .append_exchange(&user(), "hello there", "hi!")
            .await
            .unwrap();

        let p = profiler(
            Arc::clone(&store),
            Some(Arc::new(JsonProvider("no json here".into()))),
        );
        let profile = p.recompute(&user()).await.unwrap();
        assert!(profile.interests.is_empty());
        assert_eq!(profile.communication_style, "neutral");
    }

    #[test]
    fn fragment_without_profile_is_generic() {
        let fragment = render_prompt_fragment(None);
        assert!(fragment.contains("You are Cereal"));
        assert!(!fragment.contains("adapting"));
    }

    #[test]
    fn fragment_reflects_extreme_traits() {
        let profile = PersonalityProfile {
            traits: TraitVector {
                formality: 0.9,
                verbosity: 0.2,
                humor: 0.7,
                ..TraitVector::default()
            },
            interests: vec!["astronomy".into()],
            communication_style: "formal".into(),
            common_phrases: Vec::new(),
            preferred_topics: Vec::new(),
            last_updated: Utc::now(),
            message_count: 12,
            conversation_count: 2,
        };
        let fragment = render_prompt_fragment(Some(&profile));
        assert!(fragment.contains("respectful, well-structured"));
        assert!(fragment.contains("concise and direct"));
        assert!(fragment.contains("humor and playful banter"));
        assert!(fragment.contains("astronomy"));
        assert!(fragment.contains("12 previous interactions"));
    }

    #[test]
    fn stats_reply_without_profile_invites_more_chat() {
        assert!(render_stats_reply(None).contains("haven't analyzed"));
    }

    #[test]
    fn stats_reply_buckets_each_trait() {
        let profile = dated_profile(0, 20, TraitVector {
            formality: 0.05,
            humor: 0.95,
            ..TraitVector::default()
        });
        let reply = render_stats_reply(Some(&profile));
        assert!(reply.contains("• Formality: Very casual 🤙"));
        assert!(reply.contains("• Humor: Very humorous 😄"));
        assert!(reply.contains("• Curiosity: Balanced"));
        assert!(reply.contains("Based on 20 messages across 0 conversations."));
    }
}
