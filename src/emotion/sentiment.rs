use serde::{Deserialize, Serialize};

const POSITIVE_WORDS: [&str; 13] = [
    "good",
    "great",
    "excellent",
    "amazing",
    "wonderful",
    "love",
    "like",
    "enjoy",
    "best",
    "awesome",
    "推荐",
    "精彩",
    "经典",
];

const NEGATIVE_WORDS: [&str; 12] = [
    "bad",
    "terrible",
    "awful",
    "poor",
    "disappointing",
    "hate",
    "dislike",
    "worst",
    "boring",
    "糟糕",
    "失望",
    "无聊",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

/// Keyword-counting review sentiment: score is the positive share of all
/// opinion-word hits, 0.5 when the text carries no signal.
pub fn analyze_sentiment(text: &str) -> (Sentiment, f64) {
    if text.trim().is_empty() {
        return (Sentiment::Neutral, 0.5);
    }

    let lower = text.to_lowercase();
    let positive = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let negative = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let total = positive + negative;

    if total == 0 {
        return (Sentiment::Neutral, 0.5);
    }

    let score = positive as f64 / total as f64;
    let label = if score > 0.6 {
        Sentiment::Positive
    } else if score < 0.4 {
        Sentiment::Negative
    } else {
        Sentiment::Neutral
    };
    (label, score)
}
