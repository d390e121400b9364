use regex::{Regex, RegexBuilder};

/// Clearly non-health topics. A hit here blocks the message outright,
/// no matter what else it contains.
const OFF_TOPIC_WORDS: &[&str] = &[
    "movie",
    "movies",
    "music",
    "sport",
    "sports",
    "game",
    "games",
    "gaming",
    "stock",
    "stocks",
    "crypto",
    "bitcoin",
    "ethereum",
    "politics",
    "political",
    "weather",
    "recipe",
    "recipes",
    "cooking",
    "baking",
    "car",
    "cars",
    "vehicle",
    "phone",
    "computer",
    "javascript",
    "react",
    "python",
    "programming",
    "coding",
    "software",
    "book",
    "books",
    "novel",
    "celebrity",
    "celebrities",
    "actor",
    "actress",
    "vacation",
    "travel",
    "restaurant",
    "hobby",
    "hobbies",
    "craft",
    "shopping",
    // animal/pet words deliberately absent: they may refer to therapy or
    // service animals
];

/// Health and wellness vocabulary that marks a message as in-scope.
const HEALTH_KEYWORDS: &[&str] = &[
    "health",
    "wellness",
    "nutrition",
    "diet",
    "exercise",
    "fitness",
    "mental",
    "stress",
    "sleep",
    "medical",
    "doctor",
    "hospital",
    "pain",
    "illness",
    "symptom",
    "treatment",
    "medicine",
    "vitamin",
    "weight",
    "workout",
    "yoga",
    "meditation",
    "therapy",
    "healthy",
    "condition",
    "diagnosis",
    "recovery",
    "cardio",
    "calorie",
    "protein",
    "hydration",
    "depression",
    "anxiety",
    "insomnia",
    "fatigue",
    "blood pressure",
    "cholesterol",
    "diabetes",
    "heart",
    "lung",
    "brain",
    "rehabilitation",
    "prevention",
];

/// Outcome of topic gating on a single piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    OnTopic,
    OffTopic,
    Ambiguous,
}

/// Keyword-based topic gate. Both keyword sets are compiled once into
/// case-insensitive word-boundary regexes; some allow-list entries are
/// two-word phrases ("blood pressure"), so matching runs over the raw
/// text rather than split tokens.
pub struct TopicClassifier {
    off_topic: Regex,
    health: Regex,
}

fn keyword_regex(words: &[&str]) -> Regex {
    let pattern = format!(
        r"\b({})\b",
        words
            .iter()
            .map(|w| regex::escape(w))
            .collect::<Vec<_>>()
            .join("|")
    );
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .expect("keyword lists are fixed and always compile")
}

impl TopicClassifier {
    pub fn new() -> Self {
        Self {
            off_topic: keyword_regex(OFF_TOPIC_WORDS),
            health: keyword_regex(HEALTH_KEYWORDS),
        }
    }

    /// Pre-filter for user input. Block-list hits take absolute precedence.
    pub fn classify(&self, text: &str) -> Classification {
        if self.off_topic.is_match(text) {
            Classification::OffTopic
        } else if self.health.is_match(text) {
            Classification::OnTopic
        } else {
            Classification::Ambiguous
        }
    }

    /// Post-filter for model replies: block-list check only. Any off-topic
    /// token disqualifies the reply regardless of surrounding health content.
    pub fn contains_off_topic(&self, text: &str) -> bool {
        self.off_topic.is_match(text)
    }
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_list_hit_is_off_topic() {
        let c = TopicClassifier::new();
        assert_eq!(
            c.classify("What's the best crypto to buy?"),
            Classification::OffTopic
        );
        assert_eq!(c.classify("any good movie tonight"), Classification::OffTopic);
    }

    #[test]
    fn block_list_beats_allow_list() {
        let c = TopicClassifier::new();
        // "exercise" is allow-listed but "movies" disqualifies the whole message
        assert_eq!(
            c.classify("exercise tips while watching movies"),
            Classification::OffTopic
        );
    }

    #[test]
    fn allow_list_hit_is_on_topic() {
        let c = TopicClassifier::new();
        assert_eq!(c.classify("yoga"), Classification::OnTopic);
        assert_eq!(
            c.classify("how much sleep do adults need"),
            Classification::OnTopic
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        let c = TopicClassifier::new();
        assert_eq!(c.classify("YOGA and MEDITATION"), Classification::OnTopic);
        assert_eq!(c.classify("BITCOIN price"), Classification::OffTopic);
    }

    #[test]
    fn phrase_keywords_match_across_whitespace() {
        let c = TopicClassifier::new();
        assert_eq!(
            c.classify("my blood pressure readings worry me"),
            Classification::OnTopic
        );
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let c = TopicClassifier::new();
        // "scarf" contains "car", "cardiogram" contains "cardio" but not at a
        // word boundary on both sides
        assert_eq!(c.classify("I knitted a scarf"), Classification::Ambiguous);
    }

    #[test]
    fn neither_list_is_ambiguous() {
        let c = TopicClassifier::new();
        assert_eq!(c.classify("ok"), Classification::Ambiguous);
        assert_eq!(c.classify(""), Classification::Ambiguous);
        assert_eq!(c.classify("   "), Classification::Ambiguous);
    }

    #[test]
    fn post_filter_flags_off_topic_tokens() {
        let c = TopicClassifier::new();
        assert!(c.contains_off_topic("you should watch a movie to relax"));
        assert!(!c.contains_off_topic("a short walk helps with stress"));
    }
}
