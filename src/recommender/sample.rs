use crate::emotion::{Emotion, EmotionProfile};
use crate::models::MergedRecord;

fn record(
    id: u64,
    rank: usize,
    title: &str,
    original_title: &str,
    year: &str,
    overview: &str,
    genres: &[&str],
    vote_average: f64,
    raw_profile: &[(Emotion, f64)],
    mood_tags: &[&str],
    dominant: &[Emotion],
) -> MergedRecord {
    let emotion_profile: EmotionProfile = raw_profile.iter().copied().collect();
    let emotion_profile = emotion_profile.normalized();
    let emotional_complexity = emotion_profile
        .iter()
        .filter(|(_, score)| *score > 0.05)
        .count();

    MergedRecord {
        id,
        title: title.to_string(),
        original_title: original_title.to_string(),
        release_date: format!("{}-01-01", year),
        release_year: year.to_string(),
        overview: overview.to_string(),
        vote_average,
        vote_count: 0,
        popularity: 0.0,
        rank,
        genres: genres.iter().map(|g| g.to_string()).collect(),
        runtime: 120,
        director: String::new(),
        cast: Vec::new(),
        keywords: Vec::new(),
        tagline: String::new(),
        imdb_id: String::new(),
        emotion_profile,
        dominant_emotions: dominant.to_vec(),
        mood_tags: mood_tags.iter().map(|t| t.to_string()).collect(),
        emotional_complexity,
        reviews: Vec::new(),
        review_count: 0,
        source: "example".to_string(),
        crawl_date: String::new(),
    }
}

/// Three-title fallback corpus, used when no exported corpus can be loaded so
/// every search mode still has something to answer with.
pub fn sample_records() -> Vec<MergedRecord> {
    vec![
        record(
            1,
            1,
            "The Shawshank Redemption",
            "肖申克的救赎",
            "1994",
            "Wrongly convicted of murdering his wife, banker Andy Dufresne is \
             sentenced to life in Shawshank prison, where his knowledge and quiet \
             resolve improve the lives of his fellow inmates and set up an \
             astonishing escape.",
            &["Drama", "Crime"],
            9.3,
            &[
                (Emotion::Hope, 0.35),
                (Emotion::Inspiration, 0.25),
                (Emotion::Sadness, 0.15),
                (Emotion::Anger, 0.10),
                (Emotion::Loneliness, 0.10),
                (Emotion::Love, 0.05),
            ],
            &["very-hope", "uplifting", "sad-but-hopeful"],
            &[Emotion::Hope, Emotion::Inspiration],
        ),
        record(
            2,
            2,
            "Interstellar",
            "星际穿越",
            "2014",
            "With Earth failing, a crew of astronauts travels through a wormhole \
             in search of a new home for humanity, testing the bounds of time \
             and the love between a father and daughter.",
            &["Science Fiction", "Adventure", "Drama"],
            9.2,
            &[
                (Emotion::Hope, 0.30),
                (Emotion::Love, 0.25),
                (Emotion::Loneliness, 0.15),
                (Emotion::Fear, 0.10),
            ],
            &["very-hope", "very-love", "heartwarming"],
            &[Emotion::Hope, Emotion::Love],
        ),
        record(
            3,
            3,
            "Life Is Beautiful",
            "美丽人生",
            "1997",
            "A Jewish father and his young son are sent to a concentration camp, \
             where the father turns their days into an elaborate game to shield \
             the boy from horror, a testament to a parent's love.",
            &["Drama", "Comedy", "Romance"],
            9.5,
            &[
                (Emotion::Love, 0.35),
                (Emotion::Hope, 0.25),
                (Emotion::Joy, 0.20),
                (Emotion::Sadness, 0.20),
            ],
            &["very-love", "heartwarming", "sad-but-hopeful"],
            &[Emotion::Love, Emotion::Hope],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_profiles_are_normalized() {
        for record in sample_records() {
            let total = record.emotion_profile.total();
            assert!(
                (total - 1.0).abs() < 5e-3,
                "{} profile sums to {}",
                record.title,
                total
            );
        }
    }

    #[test]
    fn sample_has_three_titles_with_distinct_ids() {
        let records = sample_records();
        assert_eq!(records.len(), 3);
        assert_ne!(records[0].id, records[1].id);
        assert_ne!(records[1].id, records[2].id);
    }
}
