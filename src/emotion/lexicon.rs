//! Keyword lexicons and lookup tables backing the emotion scorer.
//!
//! The primary and expanded lexicons are compiled in; the genre map and the
//! per-title overrides are policy, not mechanism, so they ship as editable
//! JSON tables (`data/*.json`) with the embedded copies as defaults.

use crate::emotion::{Emotion, EmotionProfile};
use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const GENRE_EMOTIONS_JSON: &str = include_str!("../../data/genre_emotions.json");
const TITLE_OVERRIDES_JSON: &str = include_str!("../../data/title_overrides.json");

/// A single lexicon term with its precompiled matching strategy: short terms
/// (3 chars or fewer) require word-boundary matches, longer terms count raw
/// substring occurrences, doubled when the term is longer than 4 chars.
pub struct Keyword {
    term: &'static str,
    matcher: Matcher,
}

enum Matcher {
    Boundary(Regex),
    Substring { weight: f64 },
}

impl Keyword {
    fn new(term: &'static str) -> Self {
        let chars = term.chars().count();
        let matcher = if chars <= 3 {
            let pattern = format!(r"\b{}\b", regex::escape(term));
            Matcher::Boundary(Regex::new(&pattern).unwrap())
        } else {
            Matcher::Substring {
                weight: if chars > 4 { 2.0 } else { 1.0 },
            }
        };
        Self { term, matcher }
    }

    /// Weighted hit count of this term in the (lowercased) text.
    pub fn score(&self, text: &str) -> f64 {
        match &self.matcher {
            Matcher::Boundary(re) => re.find_iter(text).count() as f64,
            Matcher::Substring { weight } => text.matches(self.term).count() as f64 * weight,
        }
    }

    /// Presence weight used by the expanded (fallback) lexicon: 2 when the
    /// term is longer than 4 chars, else 1; 0 when absent.
    pub fn presence(&self, text: &str) -> f64 {
        if !text.contains(self.term) {
            return 0.0;
        }
        if self.term.chars().count() > 4 {
            2.0
        } else {
            1.0
        }
    }
}

macro_rules! lexicon {
    ($($emotion:expr => [$($term:literal),* $(,)?]),* $(,)?) => {
        vec![$(($emotion, vec![$(Keyword::new($term)),*])),*]
    };
}

pub static PRIMARY_LEXICON: Lazy<Vec<(Emotion, Vec<Keyword>)>> = Lazy::new(|| {
    lexicon! {
        Emotion::Joy => [
            "happy", "joy", "fun", "funny", "laughter", "smile", "cheerful",
            "delight", "euphoria", "bliss", "elation", "glee",
            "喜剧", "欢乐", "开心", "愉快",
        ],
        Emotion::Sadness => [
            "sad", "sadness", "grief", "sorrow", "melancholy", "depression",
            "tear", "cry", "mourn", "heartbreak", "despair", "misery",
            "悲剧", "悲伤", "难过", "忧郁",
        ],
        Emotion::Anger => [
            "anger", "angry", "rage", "fury", "wrath", "outrage", "frustration",
            "resentment", "hostility", "irritation", "annoyance",
            "愤怒", "生气", "怒火",
        ],
        Emotion::Fear => [
            "fear", "scary", "terror", "horror", "dread", "panic", "anxiety",
            "fright", "apprehension", "trepidation", "phobia",
            "恐惧", "恐怖", "害怕",
        ],
        Emotion::Love => [
            "love", "romance", "passion", "affection", "adore", "cherish",
            "devotion", "intimacy", "tenderness", "fondness", "infatuation",
            "爱情", "浪漫", "温馨", "甜蜜",
        ],
        Emotion::Hope => [
            "hope", "hopeful", "optimism", "faith", "confidence", "expectation",
            "aspiration", "dream", "wish", "anticipation",
            "希望", "梦想", "期待",
        ],
        Emotion::Loneliness => [
            "lonely", "loneliness", "isolated", "solitude", "alone",
            "abandoned", "desolate", "secluded", "forsaken",
            "孤独", "孤单", "寂寞",
        ],
        Emotion::Inspiration => [
            "inspire", "inspiring", "motivation", "encouraging", "uplifting",
            "empowering", "moving", "touching",
            "励志", "鼓舞", "激励",
        ],
        Emotion::Tension => [
            "tense", "tension", "suspense", "thrilling", "nerve-racking",
            "nail-biting", "edge-of-seat", "anxious", "stressful",
            "紧张", "悬疑", "惊悚",
        ],
        Emotion::Peace => [
            "peace", "peaceful", "calm", "serene", "tranquil", "relaxed",
            "quiet", "soothing", "placid", "composed",
            "平静", "安宁", "宁静",
        ],
    }
});

/// Broader vocabulary used by the first fallback stage. Terms here are
/// presence-checked rather than occurrence-counted.
pub static EXPANDED_LEXICON: Lazy<Vec<(Emotion, Vec<Keyword>)>> = Lazy::new(|| {
    lexicon! {
        Emotion::Joy => [
            "happy", "joy", "fun", "funny", "laughter", "smile", "cheerful",
            "delight", "euphoria", "bliss", "elation", "glee", "comic", "humor",
            "lighthearted", "喜剧", "欢乐", "开心", "愉快", "搞笑", "幽默",
        ],
        Emotion::Sadness => [
            "sad", "sadness", "grief", "sorrow", "melancholy", "depression",
            "tear", "cry", "mourn", "heartbreak", "despair", "misery",
            "tragedy", "loss", "death", "dying", "grave", "funeral",
            "悲剧", "悲伤", "难过",
        ],
        Emotion::Anger => [
            "anger", "angry", "rage", "fury", "wrath", "outrage", "frustration",
            "resentment", "hostility", "irritation", "annoyance", "violence",
            "fight", "war", "conflict", "battle", "愤怒", "生气", "怒火", "暴力",
        ],
        Emotion::Fear => [
            "fear", "scary", "terror", "horror", "dread", "panic", "anxiety",
            "fright", "apprehension", "trepidation", "phobia", "monster",
            "ghost", "haunted", "supernatural", "恐惧", "恐怖", "害怕", "惊吓",
        ],
        Emotion::Love => [
            "love", "romance", "passion", "affection", "adore", "cherish",
            "devotion", "intimacy", "tenderness", "fondness", "infatuation",
            "relationship", "couple", "marriage", "wedding", "爱情", "浪漫", "温馨",
        ],
        Emotion::Hope => [
            "hope", "hopeful", "optimism", "faith", "confidence", "expectation",
            "aspiration", "dream", "wish", "anticipation", "future", "better",
            "improve", "recover", "heal", "希望", "梦想", "期待", "信念",
        ],
        Emotion::Loneliness => [
            "lonely", "loneliness", "isolated", "solitude", "alone",
            "abandoned", "desolate", "secluded", "forsaken", "孤独", "孤单",
        ],
        Emotion::Tension => [
            "tense", "tension", "suspense", "thrilling", "nerve-racking",
            "nail-biting", "edge-of-seat", "anxious", "stressful", "紧张", "悬疑",
        ],
        Emotion::Peace => [
            "peace", "peaceful", "calm", "serene", "tranquil", "relaxed",
            "quiet", "soothing", "placid", "composed", "平静", "安宁", "宁静",
        ],
        Emotion::Inspiration => [
            "inspire", "inspiring", "motivation", "encouraging", "uplifting",
            "empowering", "moving", "touching", "励志", "鼓舞",
        ],
    }
});

/// Bilingual label aliases accepted wherever the user names an emotion
/// category directly (emotion-vector input, query targets).
pub static EMOTION_ALIASES: Lazy<HashMap<&'static str, Emotion>> = Lazy::new(|| {
    let mut aliases: HashMap<&'static str, Emotion> = HashMap::new();
    for emotion in Emotion::ALL {
        aliases.insert(emotion.as_str(), emotion);
    }
    let zh: [(&str, Emotion); 36] = [
        ("快乐", Emotion::Joy),
        ("开心", Emotion::Joy),
        ("高兴", Emotion::Joy),
        ("愉快", Emotion::Joy),
        ("欢乐", Emotion::Joy),
        ("悲伤", Emotion::Sadness),
        ("难过", Emotion::Sadness),
        ("伤心", Emotion::Sadness),
        ("忧郁", Emotion::Sadness),
        ("愤怒", Emotion::Anger),
        ("生气", Emotion::Anger),
        ("怒火", Emotion::Anger),
        ("恐惧", Emotion::Fear),
        ("害怕", Emotion::Fear),
        ("恐怖", Emotion::Fear),
        ("惊吓", Emotion::Fear),
        ("爱", Emotion::Love),
        ("爱情", Emotion::Love),
        ("浪漫", Emotion::Love),
        ("甜蜜", Emotion::Love),
        ("希望", Emotion::Hope),
        ("期望", Emotion::Hope),
        ("期待", Emotion::Hope),
        ("梦想", Emotion::Hope),
        ("孤独", Emotion::Loneliness),
        ("孤单", Emotion::Loneliness),
        ("寂寞", Emotion::Loneliness),
        ("励志", Emotion::Inspiration),
        ("鼓舞", Emotion::Inspiration),
        ("激励", Emotion::Inspiration),
        ("紧张", Emotion::Tension),
        ("刺激", Emotion::Tension),
        ("悬疑", Emotion::Tension),
        ("惊悚", Emotion::Tension),
        ("平静", Emotion::Peace),
        ("安宁", Emotion::Peace),
    ];
    aliases.extend(zh);
    aliases.insert("宁静", Emotion::Peace);
    aliases.insert("祥和", Emotion::Peace);
    aliases
});

/// Resolve a user-supplied label (canonical or alias) to its category.
pub fn resolve_label(label: &str) -> Option<Emotion> {
    let trimmed = label.trim();
    EMOTION_ALIASES
        .get(trimmed)
        .copied()
        .or_else(|| Emotion::parse(trimmed))
}

/// Genre name (either language) to emotion category, used by the second
/// fallback stage of the scorer.
#[derive(Debug, Clone)]
pub struct GenreEmotionMap(HashMap<String, Emotion>);

impl GenreEmotionMap {
    pub fn embedded() -> Result<Self> {
        Self::parse(GENRE_EMOTIONS_JSON)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(raw)?;
        let mut map = HashMap::with_capacity(entries.len());
        for (genre, label) in entries {
            let emotion = Emotion::parse(&label).ok_or_else(|| {
                AppError::CorpusError(format!(
                    "genre table maps '{}' to unknown emotion '{}'",
                    genre, label
                ))
            })?;
            map.insert(genre, emotion);
        }
        Ok(Self(map))
    }

    pub fn lookup(&self, genre: &str) -> Option<Emotion> {
        self.0.get(genre.trim()).copied()
    }
}

/// Hardcoded emotion distributions for well-known works, matched by substring
/// against the lowercased overview. Table order decides which entry wins.
#[derive(Debug, Clone)]
pub struct TitleOverrides(Vec<(String, EmotionProfile)>);

impl TitleOverrides {
    pub fn embedded() -> Result<Self> {
        Self::parse(TITLE_OVERRIDES_JSON)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    fn parse(raw: &str) -> Result<Self> {
        // serde_json's preserve_order feature keeps the table's file order.
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)?;
        let mut overrides = Vec::with_capacity(entries.len());
        for (title, scores) in entries {
            let profile: EmotionProfile = serde_json::from_value(scores)?;
            overrides.push((title.to_lowercase(), profile));
        }
        Ok(Self(overrides))
    }

    /// First override whose title key occurs in the given overview.
    pub fn matching(&self, overview: &str) -> Option<&EmotionProfile> {
        let haystack = overview.to_lowercase();
        self.0
            .iter()
            .find(|(title, _)| haystack.contains(title.as_str()))
            .map(|(_, profile)| profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_keywords_require_word_boundaries() {
        let keyword = Keyword::new("joy");
        assert_eq!(keyword.score("joy and joyful"), 1.0);
        assert_eq!(keyword.score("enjoyment"), 0.0);
    }

    #[test]
    fn long_keywords_count_substrings_with_weight() {
        let keyword = Keyword::new("laughter");
        assert_eq!(keyword.score("laughter after laughter"), 4.0);
        let short_long = Keyword::new("fear");
        // 4 chars: substring matching at weight 1
        assert_eq!(short_long.score("fearless fear"), 2.0);
    }

    #[test]
    fn aliases_cover_both_languages() {
        assert_eq!(resolve_label("joy"), Some(Emotion::Joy));
        assert_eq!(resolve_label("快乐"), Some(Emotion::Joy));
        assert_eq!(resolve_label("惊悚"), Some(Emotion::Tension));
        assert_eq!(resolve_label("no-such-mood"), None);
    }

    #[test]
    fn embedded_genre_table_parses() {
        let map = GenreEmotionMap::embedded().unwrap();
        assert_eq!(map.lookup("Comedy"), Some(Emotion::Joy));
        assert_eq!(map.lookup("恐怖"), Some(Emotion::Fear));
        assert_eq!(map.lookup("Western"), None);
    }

    #[test]
    fn title_overrides_match_by_overview_substring() {
        let overrides = TitleOverrides::embedded().unwrap();
        let profile = overrides
            .matching("Two imprisoned men bond over years in Shawshank prison.")
            .expect("known work should match");
        assert_eq!(profile.get(Emotion::Hope), 4.0);
    }

    #[test]
    fn godfather_sequel_wins_over_prefix() {
        let overrides = TitleOverrides::embedded().unwrap();
        let profile = overrides
            .matching("the godfather part ii continues the saga")
            .unwrap();
        assert_eq!(profile.get(Emotion::Sadness), 3.0);
    }
}
