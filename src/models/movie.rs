use crate::emotion::{Emotion, EmotionProfile, Sentiment};
use serde::{Deserialize, Deserializer, Serialize};

fn deserialize_string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrVec {
        String(String),
        Vec(Vec<String>),
    }

    match StringOrVec::deserialize(deserializer)? {
        StringOrVec::String(s) => {
            // Older CSV-derived corpora flatten lists with a '|' delimiter
            if s.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(s.split('|').map(|part| part.trim().to_string()).collect())
            }
        }
        StringOrVec::Vec(v) => Ok(v),
    }
}

fn default_source() -> String {
    "unknown".to_string()
}

/// One entry of the ranked-list endpoint, plus its position in that list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    pub rank: usize,
}

/// Detail sub-resource for one catalog item (credits and keywords embedded).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDetail {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub runtime: u32,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub imdb_id: String,
    #[serde(default)]
    pub production_companies: Vec<String>,
    #[serde(default)]
    pub production_countries: Vec<String>,
}

/// A single review with its keyword-counted sentiment attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_source")]
    pub source: String,
}

/// The persisted unit: catalog item joined with its detail, emotion analysis
/// and reviews. Exported to the JSON corpus and reloaded by the recommender.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergedRecord {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub release_year: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u64,
    #[serde(default)]
    pub popularity: f64,
    pub rank: usize,

    #[serde(default, deserialize_with = "deserialize_string_or_list")]
    pub genres: Vec<String>,
    #[serde(default)]
    pub runtime: u32,
    #[serde(default)]
    pub director: String,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub imdb_id: String,

    #[serde(default)]
    pub emotion_profile: EmotionProfile,
    #[serde(default)]
    pub dominant_emotions: Vec<Emotion>,
    #[serde(default, deserialize_with = "deserialize_string_or_list")]
    pub mood_tags: Vec<String>,
    #[serde(default)]
    pub emotional_complexity: usize,

    #[serde(default)]
    pub reviews: Vec<Review>,
    #[serde(default)]
    pub review_count: usize,

    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub crawl_date: String,
}

impl MergedRecord {
    /// First four characters of the release date, or empty.
    pub fn year_of(release_date: &str) -> String {
        release_date.chars().take(4).collect()
    }

    /// Mean review sentiment score, 0.5 when there are no reviews.
    pub fn avg_review_sentiment(&self) -> f64 {
        if self.reviews.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.reviews.iter().map(|r| r.sentiment_score).sum();
        let avg = sum / self.reviews.len() as f64;
        (avg * 1000.0).round() / 1000.0
    }

    /// Top-3 emotion intensities as an `emotion:score|...` string for the
    /// compact CSV exports.
    pub fn emotion_vector_string(&self) -> String {
        self.emotion_profile
            .ranked()
            .into_iter()
            .take(3)
            .map(|(emotion, score)| format!("{}:{:.3}", emotion, score))
            .collect::<Vec<_>>()
            .join("|")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_profile(profile: EmotionProfile) -> MergedRecord {
        MergedRecord {
            id: 1,
            title: "Test".into(),
            original_title: String::new(),
            release_date: "1994-09-23".into(),
            release_year: "1994".into(),
            overview: String::new(),
            vote_average: 8.7,
            vote_count: 1000,
            popularity: 50.0,
            rank: 1,
            genres: vec!["Drama".into()],
            runtime: 142,
            director: String::new(),
            cast: Vec::new(),
            keywords: Vec::new(),
            tagline: String::new(),
            imdb_id: String::new(),
            emotion_profile: profile,
            dominant_emotions: Vec::new(),
            mood_tags: Vec::new(),
            emotional_complexity: 0,
            reviews: Vec::new(),
            review_count: 0,
            source: "test".into(),
            crawl_date: String::new(),
        }
    }

    #[test]
    fn year_is_prefix_of_release_date() {
        assert_eq!(MergedRecord::year_of("1994-09-23"), "1994");
        assert_eq!(MergedRecord::year_of(""), "");
    }

    #[test]
    fn emotion_vector_string_takes_top_three() {
        let profile: EmotionProfile = [
            (Emotion::Hope, 0.4),
            (Emotion::Sadness, 0.3),
            (Emotion::Joy, 0.2),
            (Emotion::Fear, 0.1),
        ]
        .into_iter()
        .collect();
        let record = record_with_profile(profile);
        assert_eq!(
            record.emotion_vector_string(),
            "hope:0.400|sadness:0.300|joy:0.200"
        );
    }

    #[test]
    fn avg_sentiment_defaults_without_reviews() {
        let record = record_with_profile(EmotionProfile::new());
        assert_eq!(record.avg_review_sentiment(), 0.5);
    }

    #[test]
    fn merged_record_round_trips_through_json() {
        let profile: EmotionProfile = [(Emotion::Love, 0.7), (Emotion::Sadness, 0.3)]
            .into_iter()
            .collect();
        let record = record_with_profile(profile.clone());
        let json = serde_json::to_string(&record).unwrap();
        let reloaded: MergedRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded.emotion_profile, profile);
        assert_eq!(reloaded.rank, 1);
    }

    #[test]
    fn pipe_delimited_lists_still_deserialize() {
        let json = r#"{
            "id": 5,
            "title": "Legacy",
            "rank": 5,
            "genres": "Drama|Crime",
            "mood_tags": "very-hope|uplifting"
        }"#;
        let record: MergedRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.genres, vec!["Drama", "Crime"]);
        assert_eq!(record.mood_tags, vec!["very-hope", "uplifting"]);
    }
}
