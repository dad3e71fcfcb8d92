use crate::emotion::lexicon::{
    GenreEmotionMap, TitleOverrides, EXPANDED_LEXICON, PRIMARY_LEXICON,
};
use crate::emotion::tags::mood_tags;
use crate::emotion::{Emotion, EmotionProfile};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Full output of a scoring pass over one title's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmotionAnalysis {
    pub emotion_profile: EmotionProfile,
    pub dominant_emotions: Vec<Emotion>,
    pub mood_tags: Vec<String>,
    pub emotional_complexity: usize,
}

/// Lexicon-based emotion scorer with a five-stage fallback chain for text
/// that the primary lexicon cannot place.
pub struct EmotionScorer {
    genre_map: GenreEmotionMap,
    overrides: TitleOverrides,
}

impl EmotionScorer {
    /// Scorer backed by the embedded lookup tables.
    pub fn new() -> Result<Self> {
        Ok(Self {
            genre_map: GenreEmotionMap::embedded()?,
            overrides: TitleOverrides::embedded()?,
        })
    }

    /// Scorer with externally supplied genre and title tables; either path
    /// may be `None` to keep the embedded default.
    pub fn with_tables(genre_path: Option<&Path>, overrides_path: Option<&Path>) -> Result<Self> {
        let genre_map = match genre_path {
            Some(path) => GenreEmotionMap::from_path(path)?,
            None => GenreEmotionMap::embedded()?,
        };
        let overrides = match overrides_path {
            Some(path) => TitleOverrides::from_path(path)?,
            None => TitleOverrides::embedded()?,
        };
        Ok(Self {
            genre_map,
            overrides,
        })
    }

    /// Score one title: normalized profile, dominant emotions, mood tags and
    /// emotional complexity (number of scored categories).
    pub fn score(
        &self,
        overview: &str,
        tagline: &str,
        keywords: &[String],
        genres: &[String],
    ) -> EmotionAnalysis {
        let blob = format!("{} {} {}", tagline, overview, keywords.join(" ")).to_lowercase();

        let mut raw = EmotionProfile::new();
        for (emotion, terms) in PRIMARY_LEXICON.iter() {
            let score: f64 = terms.iter().map(|kw| kw.score(&blob)).sum();
            if score > 0.0 {
                raw.insert(*emotion, score);
            }
        }

        if raw.is_empty() {
            debug!("primary lexicon found no signal, entering fallback chain");
            raw = self.fallback_scores(overview, tagline, genres);
        }

        let emotion_profile = raw.normalized();
        let dominant_emotions = emotion_profile.dominant();
        let mood_tags = mood_tags(&emotion_profile);
        let emotional_complexity = emotion_profile.len();

        EmotionAnalysis {
            emotion_profile,
            dominant_emotions,
            mood_tags,
            emotional_complexity,
        }
    }

    /// Ordered fallback strategies, stopping at the first that produces any
    /// non-zero score: expanded lexicon, genre table, title overrides, then
    /// the text heuristics (which always yield a distribution).
    fn fallback_scores(&self, overview: &str, tagline: &str, genres: &[String]) -> EmotionProfile {
        let text = format!("{} {}", tagline, overview).to_lowercase();

        let mut scores = EmotionProfile::new();
        for (emotion, terms) in EXPANDED_LEXICON.iter() {
            let score: f64 = terms.iter().map(|kw| kw.presence(&text)).sum();
            if score > 0.0 {
                scores.insert(*emotion, score);
            }
        }
        if !scores.is_empty() {
            return scores;
        }

        for genre in genres {
            if let Some(emotion) = self.genre_map.lookup(genre) {
                scores.add(emotion, 2.0);
            }
        }
        if !scores.is_empty() {
            return scores;
        }

        if let Some(profile) = self.overrides.matching(overview) {
            return profile.clone();
        }

        heuristic_scores(overview, tagline, &text)
    }
}

/// Last-resort heuristics keyed on text length and a few trigger words; the
/// final arm is the fixed default distribution.
fn heuristic_scores(overview: &str, tagline: &str, text: &str) -> EmotionProfile {
    let text_length = overview.chars().count() + tagline.chars().count();
    if text_length < 50 {
        return [
            (Emotion::Hope, 2.0),
            (Emotion::Inspiration, 1.0),
            (Emotion::Joy, 1.0),
        ]
        .into_iter()
        .collect();
    }

    let contains_any = |words: &[&str]| words.iter().any(|w| text.contains(w));

    if contains_any(&["war", "battle", "fight", "战争", "战斗"]) {
        [
            (Emotion::Fear, 3.0),
            (Emotion::Tension, 2.0),
            (Emotion::Anger, 1.0),
        ]
        .into_iter()
        .collect()
    } else if contains_any(&["love", "romance", "爱", "爱情"]) {
        [
            (Emotion::Love, 4.0),
            (Emotion::Joy, 2.0),
            (Emotion::Hope, 1.0),
        ]
        .into_iter()
        .collect()
    } else if contains_any(&["death", "die", "dead", "死亡", "死去"]) {
        [
            (Emotion::Sadness, 4.0),
            (Emotion::Hope, 1.0),
            (Emotion::Inspiration, 1.0),
        ]
        .into_iter()
        .collect()
    } else {
        [
            (Emotion::Hope, 2.0),
            (Emotion::Inspiration, 2.0),
            (Emotion::Joy, 1.0),
            (Emotion::Sadness, 1.0),
        ]
        .into_iter()
        .collect()
    }
}
