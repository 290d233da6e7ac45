// SPDX-FileCopyrightText: 2026 Cereal Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Search routing: decides whether a prompt needs a live web search.
//!
//! Rules run in strict priority order and the first conclusive rule wins:
//!
//! 1. Explicit search verbs ("search for", "look up", ...) always search.
//! 2. Personal questions about the assistant never search, even when a
//!    later rule would fire.
//! 3. Current events and time-sensitive phrasings search.
//! 4. Factual question forms search when the prompt is specific enough
//!    or names a factual topic, excluding a fixed list of philosophical
//!    common-knowledge questions.
//! 5. Recent history showing a pattern of search requests may search.
//! 6. Everything else is conversational.

use std::sync::LazyLock;

use cereal_core::MemoryRecord;
use regex::Regex;
use tracing::debug;

/// Why the router decided the way it did. Carried in logs and tests;
/// never shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionReason {
    ExplicitRequest,
    PersonalQuestion,
    CurrentEvents,
    FactualInformation,
    ContextBased,
    Conversational,
}

/// The routing verdict for one prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchDecision {
    pub search: bool,
    pub reason: DecisionReason,
    pub confidence: f64,
}

/// Specificity threshold for the factual rule.
const SPECIFICITY_THRESHOLD: f64 = 0.3;

/// How many recent records the history heuristic inspects.
const HISTORY_WINDOW: usize = 3;

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("(?i){p}"))
                .unwrap_or_else(|e| panic!("invalid router pattern `{p}`: {e}"))
        })
        .collect()
}

static EXPLICIT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"search\s+(for\s+)?(.+)",
        r"look\s+up\s+(.+)",
        r"find\s+(information\s+)?(about\s+)?(.+)",
        r"google\s+(.+)",
        r"what\s+can\s+you\s+find\s+(about\s+)?(.+)",
        r"research\s+(.+)",
        r"give\s+me\s+info\s+(on\s+|about\s+)?(.+)",
        r"can\s+you\s+search\s+",
        r"please\s+search\s+",
        r"i\s+need\s+information\s+about",
    ])
});

static PERSONAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(what('s| is)\s+)?your?\s+(favourite|favorite|fav)\s+",
        r"what\s+do\s+you\s+(like|enjoy|prefer|think|feel|recommend)",
        r"do\s+you\s+(like|enjoy|have|prefer|think|believe|recommend)",
        r"what('s| is)\s+your\s+(opinion|thought|view|take|preference)",
        r"how\s+do\s+you\s+(feel|think)\s+about",
        r"ur\s+(favourite|favorite|fav)\s+",
        r"tell\s+me\s+(about\s+)?your\s+",
        r"what\s+are\s+you\s+(into|interested)",
        r"describe\s+your\s+",
        r"what\s+would\s+you\s+(choose|pick|recommend)",
        r"if\s+you\s+(had\s+to\s+)?(choose|pick)",
        r"what('s| is)\s+your\s+(style|type|kind)",
        r"which\s+do\s+you\s+(like|prefer)",
        r"what\s+are\s+your\s+",
        r"can\s+you\s+recommend\s+your\s+favorite",
    ])
});

static CURRENT_EVENT_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"(latest|recent|current|today('s)?|this\s+(week|month))\s+(news|events?|updates?)",
        r"what('s| is)\s+happening\s+(now|today|recently|lately)",
        r"current\s+(status|situation|state)\s+of",
        r"(breaking|recent)\s+news",
        r"(today|yesterday|this\s+week)\s+in",
        r"what('s| is)\s+(new|recent|latest)\s+(with|about|in)",
        r"update\s+on\s+",
        r"(stock|market|price)\s+(today|now|current)",
        r"news\s+about\s+",
        r"current\s+events",
    ])
});

// Factual question forms. The original directed-at-the-assistant cases
// ("how do you...", "what is your...") are vetoed by YOU_DIRECTED below
// instead of per-pattern lookaheads.
static FACTUAL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    compile(&[
        r"^(what|when|where|who|why|how)\s+",
        r"tell\s+me\s+about\s+",
        r"explain\s+",
        r"define\s+",
        r"what\s+is\s+",
        r"how\s+does\s+",
        r"when\s+did\s+",
        r"where\s+is\s+",
        r"who\s+is\s+",
        r"how\s+to\s+",
        r"what\s+are\s+the\s+",
        r"list\s+of\s+",
        r"examples\s+of\s+",
    ])
});

static YOU_DIRECTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(you|your|yourself)\b").unwrap());

static NUMBERS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static CAPITALIZED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Z][a-zA-Z]+").unwrap());

const PERSONAL_TOPICS: &[&str] = &[
    "music", "song", "movie", "film", "food", "color", "hobby", "interest", "book", "game",
    "sport", "activity", "place", "travel", "style", "artist", "band", "genre", "album",
    "restaurant", "cuisine", "drink", "vacation", "holiday", "season", "weather", "animal", "pet",
];

const OPINION_WORDS: &[&str] = &[
    "opinion", "preference", "favorite", "favourite", "like", "dislike", "enjoy", "hate", "love",
    "think", "feel", "believe", "recommend", "suggest", "advise", "choose", "pick", "select",
];

const TIME_INDICATORS: &[&str] = &[
    "now", "today", "currently", "recent", "latest", "this week", "this month", "2024", "2025",
    "yesterday", "breaking", "live", "real-time", "up-to-date", "fresh", "new",
];

const CURRENT_TOPICS: &[&str] = &[
    "news", "politics", "stock", "weather", "events", "crisis", "election", "pandemic", "war",
    "market", "price", "update", "cryptocurrency", "bitcoin", "covid", "virus", "outbreak",
    "government", "president", "minister", "policy", "law",
];

const FACTUAL_TOPICS: &[&str] = &[
    "definition", "history", "science", "technology", "medicine", "law", "mathematics",
    "physics", "chemistry", "biology", "geography", "statistics", "data", "research", "study",
    "theory", "concept", "principle", "formula", "equation", "university", "college",
    "education", "academic", "scholarly",
];

const COMMON_KNOWLEDGE: &[&str] = &[
    "what is love",
    "what is happiness",
    "what is life",
    "what is death",
    "how to be happy",
    "how to make friends",
    "what is art",
    "what is beauty",
    "what is the meaning of life",
    "how to be successful",
    "what is friendship",
    "how to be confident",
    "what is wisdom",
    "how to be good person",
];

const HISTORY_SEARCH_WORDS: &[&str] = &["search", "find", "look up", "information"];

/// Routes a prompt, consulting up to the last three memory records for the
/// history heuristic.
pub fn should_search(prompt: &str, recent: &[MemoryRecord]) -> SearchDecision {
    let lower = prompt.to_lowercase();
    let lower = lower.trim();

    if EXPLICIT_PATTERNS.iter().any(|p| p.is_match(lower)) {
        return decided(true, DecisionReason::ExplicitRequest, 0.95);
    }

    if PERSONAL_PATTERNS.iter().any(|p| p.is_match(lower)) {
        let confidence = if PERSONAL_TOPICS.iter().any(|t| lower.contains(t)) {
            0.9
        } else if OPINION_WORDS.iter().any(|w| lower.contains(w)) {
            0.8
        } else {
            0.7
        };
        return decided(false, DecisionReason::PersonalQuestion, confidence);
    }

    if CURRENT_EVENT_PATTERNS.iter().any(|p| p.is_match(lower)) {
        return decided(true, DecisionReason::CurrentEvents, 0.9);
    }
    let has_time = TIME_INDICATORS.iter().any(|t| lower.contains(t));
    let has_current_topic = CURRENT_TOPICS.iter().any(|t| lower.contains(t));
    if has_time && has_current_topic {
        return decided(true, DecisionReason::CurrentEvents, 0.8);
    }

    if !COMMON_KNOWLEDGE.iter().any(|ck| lower.contains(ck))
        && FACTUAL_PATTERNS.iter().any(|p| p.is_match(lower))
        && !YOU_DIRECTED.is_match(lower)
    {
        let specificity = specificity_score(prompt);
        let has_factual_topic = FACTUAL_TOPICS.iter().any(|t| lower.contains(t));
        if specificity > SPECIFICITY_THRESHOLD || has_factual_topic {
            return decided(
                true,
                DecisionReason::FactualInformation,
                0.7 + specificity * 0.2,
            );
        }
    }

    let history_pattern = recent
        .iter()
        .rev()
        .take(HISTORY_WINDOW)
        .any(|r| {
            let text = r.text().to_lowercase();
            HISTORY_SEARCH_WORDS.iter().any(|w| text.contains(w))
        });
    if history_pattern {
        return decided(true, DecisionReason::ContextBased, 0.6);
    }

    decided(false, DecisionReason::Conversational, 0.5)
}

fn decided(search: bool, reason: DecisionReason, confidence: f64) -> SearchDecision {
    debug!(search, ?reason, confidence, "search routing decision");
    SearchDecision {
        search,
        reason,
        confidence,
    }
}

/// Density of digits, capitalized tokens, and precision adverbs per word.
fn specificity_score(prompt: &str) -> f64 {
    const SPECIFIC_INDICATORS: &[&str] = &[
        "specific", "exactly", "precisely", "detailed", "comprehensive", "thorough", "complete",
        "full", "entire", "exact", "particular", "certain", "definite", "explicit", "clear",
    ];

    let total_words = prompt.split_whitespace().count();
    if total_words == 0 {
        return 0.0;
    }

    let lower = prompt.to_lowercase();
    let numbers = NUMBERS.find_iter(prompt).count();
    let capitals = CAPITALIZED.find_iter(prompt).count();
    let specific_terms = SPECIFIC_INDICATORS
        .iter()
        .filter(|i| lower.contains(*i))
        .count();

    ((numbers + capitals + specific_terms) as f64 / total_words as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(prompt: &str) -> SearchDecision {
        should_search(prompt, &[])
    }

    #[test]
    fn explicit_verbs_always_search() {
        let d = route("search for rust async tutorials");
        assert!(d.search);
        assert_eq!(d.reason, DecisionReason::ExplicitRequest);
        assert!(route("please look up the tallest building").search);
        assert!(route("can you search the web for me").search);
    }

    #[test]
    fn explicit_beats_personal_phrasing() {
        let d = route("search for your favorite recipes");
        assert!(d.search);
        assert_eq!(d.reason, DecisionReason::ExplicitRequest);
    }

    #[test]
    fn personal_questions_never_search() {
        let d = route("what's your favorite food?");
        assert!(!d.search);
        assert_eq!(d.reason, DecisionReason::PersonalQuestion);
        assert!((d.confidence - 0.9).abs() < 1e-9);

        assert!(!route("do you like jazz music").search);
        assert!(!route("how do you feel about rainy days").search);
    }

    #[test]
    fn current_events_search() {
        let d = route("what's happening today in the city");
        assert!(d.search);
        assert_eq!(d.reason, DecisionReason::CurrentEvents);

        assert!(route("latest news about the election").search);
        assert!(route("bitcoin price today").search);
    }

    #[test]
    fn specific_factual_question_searches() {
        let d = route("who is Albert Einstein");
        assert!(d.search, "{d:?}");
        assert_eq!(d.reason, DecisionReason::FactualInformation);
    }

    #[test]
    fn factual_topic_without_specificity_searches() {
        let d = route("explain the theory behind general relativity physics");
        assert!(d.search, "{d:?}");
        assert_eq!(d.reason, DecisionReason::FactualInformation);
    }

    #[test]
    fn common_knowledge_questions_stay_conversational() {
        assert!(!route("what is love").search);
        assert!(!route("how to be happy").search);
    }

    #[test]
    fn vague_factual_form_stays_conversational() {
        // Interrogative form but no specificity signal and no factual topic.
        let d = route("why though");
        assert!(!d.search, "{d:?}");
    }

    #[test]
    fn plain_chat_is_conversational() {
        let d = route("i had a great day at the beach");
        assert!(!d.search);
        assert_eq!(d.reason, DecisionReason::Conversational);
        assert!((d.confidence - 0.5).abs() < 1e-9);
    }

    #[test]
    fn recent_search_history_tips_the_default() {
        let recent = vec![
            MemoryRecord::user("can you look up hiking trails"),
            MemoryRecord::assistant("Here's what I found: trails nearby."),
        ];
        let d = should_search("and the second one", &recent);
        assert!(d.search);
        assert_eq!(d.reason, DecisionReason::ContextBased);
        assert!((d.confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn history_window_is_limited_to_three_records() {
        let mut recent = vec![MemoryRecord::user("please look up train times")];
        for _ in 0..3 {
            recent.push(MemoryRecord::user("just chatting about the garden"));
        }
        let d = should_search("anything else going on", &recent);
        assert!(!d.search, "{d:?}");
    }

    #[test]
    fn specificity_counts_numbers_and_proper_nouns() {
        assert!(specificity_score("when did Apollo 11 land") > 0.3);
        assert!(specificity_score("why though") < 0.3);
    }
}
