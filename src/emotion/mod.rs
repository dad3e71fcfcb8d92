use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

pub mod lexicon;
pub mod scorer;
pub mod sentiment;
pub mod tags;

pub use scorer::{EmotionAnalysis, EmotionScorer};
pub use sentiment::{analyze_sentiment, Sentiment};

/// The fixed set of emotion categories shared by the scorer, the exporter and
/// the recommender. Declaration order is the canonical (sorted-label) order
/// used for every dense vector, so matrix columns line up between the batch
/// builder and the retrieval engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Anger,
    Fear,
    Hope,
    Inspiration,
    Joy,
    Loneliness,
    Love,
    Peace,
    Sadness,
    Tension,
}

pub const EMOTION_DIMENSIONS: usize = 10;

impl Emotion {
    pub const ALL: [Emotion; EMOTION_DIMENSIONS] = [
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Hope,
        Emotion::Inspiration,
        Emotion::Joy,
        Emotion::Loneliness,
        Emotion::Love,
        Emotion::Peace,
        Emotion::Sadness,
        Emotion::Tension,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Hope => "hope",
            Emotion::Inspiration => "inspiration",
            Emotion::Joy => "joy",
            Emotion::Loneliness => "loneliness",
            Emotion::Love => "love",
            Emotion::Peace => "peace",
            Emotion::Sadness => "sadness",
            Emotion::Tension => "tension",
        }
    }

    /// Parse a canonical (English, lowercase) label. Aliases, including the
    /// Chinese ones, live in [`lexicon::emotion_aliases`].
    pub fn parse(label: &str) -> Option<Emotion> {
        match label.trim().to_lowercase().as_str() {
            "anger" => Some(Emotion::Anger),
            "fear" => Some(Emotion::Fear),
            "hope" => Some(Emotion::Hope),
            "inspiration" => Some(Emotion::Inspiration),
            "joy" => Some(Emotion::Joy),
            "loneliness" => Some(Emotion::Loneliness),
            "love" => Some(Emotion::Love),
            "peace" => Some(Emotion::Peace),
            "sadness" => Some(Emotion::Sadness),
            "tension" => Some(Emotion::Tension),
            _ => None,
        }
    }

    /// Column index in the canonical dense-vector layout.
    pub fn index(&self) -> usize {
        Emotion::ALL.iter().position(|e| e == self).unwrap_or(0)
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// A distribution over the fixed emotion categories. Non-empty profiles are
/// normalized to sum to 1.0 (each entry rounded to 3 decimals); an empty
/// profile means the scorer found no signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmotionProfile(BTreeMap<Emotion, f64>);

impl EmotionProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, emotion: Emotion, score: f64) {
        self.0.insert(emotion, score);
    }

    pub fn add(&mut self, emotion: Emotion, score: f64) {
        *self.0.entry(emotion).or_insert(0.0) += score;
    }

    pub fn get(&self, emotion: Emotion) -> f64 {
        self.0.get(&emotion).copied().unwrap_or(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Emotion, f64)> + '_ {
        self.0.iter().map(|(e, v)| (*e, *v))
    }

    /// Normalize scores to sum to 1.0, rounding each to 3 decimals.
    /// A zero-sum or empty profile normalizes to the empty profile.
    pub fn normalized(&self) -> EmotionProfile {
        let total = self.total();
        if total <= 0.0 {
            return EmotionProfile::new();
        }
        EmotionProfile(
            self.0
                .iter()
                .map(|(e, v)| (*e, round3(v / total)))
                .collect(),
        )
    }

    /// Densify into the canonical 10-dimension layout, zero-filling missing
    /// categories.
    pub fn to_dense(&self) -> [f64; EMOTION_DIMENSIONS] {
        let mut dense = [0.0; EMOTION_DIMENSIONS];
        for (i, emotion) in Emotion::ALL.iter().enumerate() {
            dense[i] = self.get(*emotion);
        }
        dense
    }

    /// Entries sorted by descending score, ties broken by category order.
    pub fn ranked(&self) -> Vec<(Emotion, f64)> {
        let mut entries: Vec<(Emotion, f64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        entries
    }

    /// Top 3 categories with normalized score above 0.1.
    pub fn dominant(&self) -> Vec<Emotion> {
        self.ranked()
            .into_iter()
            .take(3)
            .filter(|(_, score)| *score > 0.1)
            .map(|(emotion, _)| emotion)
            .collect()
    }
}

impl FromIterator<(Emotion, f64)> for EmotionProfile {
    fn from_iter<T: IntoIterator<Item = (Emotion, f64)>>(iter: T) -> Self {
        EmotionProfile(iter.into_iter().collect())
    }
}

impl Serialize for EmotionProfile {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (emotion, score) in &self.0 {
            map.serialize_entry(emotion.as_str(), score)?;
        }
        map.end()
    }
}

struct ProfileVisitor;

impl<'de> Visitor<'de> for ProfileVisitor {
    type Value = EmotionProfile;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of emotion labels to scores")
    }

    fn visit_map<A: MapAccess<'de>>(
        self,
        mut access: A,
    ) -> std::result::Result<Self::Value, A::Error> {
        let mut profile = EmotionProfile::new();
        // Labels outside the fixed category set are dropped rather than
        // rejected so foreign corpora still load.
        while let Some((label, score)) = access.next_entry::<String, f64>()? {
            if let Some(emotion) = Emotion::parse(&label) {
                profile.insert(emotion, score);
            }
        }
        Ok(profile)
    }
}

impl<'de> Deserialize<'de> for EmotionProfile {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_map(ProfileVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_order_is_sorted_by_label() {
        let labels: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }

    #[test]
    fn normalized_profile_sums_to_one() {
        let mut profile = EmotionProfile::new();
        profile.insert(Emotion::Joy, 3.0);
        profile.insert(Emotion::Sadness, 1.0);
        let normalized = profile.normalized();
        assert!((normalized.total() - 1.0).abs() < 1e-2);
        assert_eq!(normalized.get(Emotion::Joy), 0.75);
        assert_eq!(normalized.get(Emotion::Sadness), 0.25);
    }

    #[test]
    fn zero_sum_profile_normalizes_to_empty() {
        let mut profile = EmotionProfile::new();
        profile.insert(Emotion::Joy, 0.0);
        assert!(profile.normalized().is_empty());
    }

    #[test]
    fn dense_layout_matches_canonical_order() {
        let mut profile = EmotionProfile::new();
        profile.insert(Emotion::Anger, 0.4);
        profile.insert(Emotion::Tension, 0.6);
        let dense = profile.to_dense();
        assert_eq!(dense[0], 0.4);
        assert_eq!(dense[EMOTION_DIMENSIONS - 1], 0.6);
        assert_eq!(dense[1..EMOTION_DIMENSIONS - 1], [0.0; 8]);
    }

    #[test]
    fn dominant_skips_weak_scores() {
        let mut profile = EmotionProfile::new();
        profile.insert(Emotion::Hope, 0.5);
        profile.insert(Emotion::Joy, 0.4);
        profile.insert(Emotion::Peace, 0.06);
        profile.insert(Emotion::Fear, 0.04);
        assert_eq!(profile.dominant(), vec![Emotion::Hope, Emotion::Joy]);
    }

    #[test]
    fn unknown_labels_are_dropped_on_deserialize() {
        let json = r#"{"joy": 0.6, "wonder": 0.3, "hope": 0.1}"#;
        let profile: EmotionProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get(Emotion::Joy), 0.6);
    }

    #[test]
    fn profile_round_trips_through_json() {
        let mut profile = EmotionProfile::new();
        profile.insert(Emotion::Love, 0.7);
        profile.insert(Emotion::Sadness, 0.3);
        let json = serde_json::to_string(&profile).unwrap();
        let reloaded: EmotionProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(profile, reloaded);
    }
}
