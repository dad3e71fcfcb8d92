use crate::emotion::Emotion;
use crate::error::Result;
use crate::models::MergedRecord;
use chrono::Local;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths of one export run, all stamped with the same timestamp.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    pub json_corpus: PathBuf,
    pub csv_data: PathBuf,
    pub enhanced_csv: PathBuf,
    pub reviews: PathBuf,
    pub emotion_vectors: PathBuf,
    pub ranking: PathBuf,
    pub statistics: PathBuf,
}

/// Writes the corpus in every downstream-consumed shape: the JSON corpus the
/// recommender reloads, CSV flattenings, per-review rows and a plain-text
/// statistics report.
pub struct Exporter {
    out_dir: PathBuf,
}

#[derive(Serialize)]
struct FlatReview<'a> {
    movie_id: u64,
    movie_title: &'a str,
    rank: usize,
    author: &'a str,
    content: &'a str,
    sentiment: &'a str,
    sentiment_score: f64,
    created_at: &'a str,
    source: &'a str,
}

impl Exporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn save_all(&self, records: &[MergedRecord]) -> Result<ExportPaths> {
        fs::create_dir_all(&self.out_dir)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let stamped = |name: &str, ext: &str| -> PathBuf {
            self.out_dir.join(format!("{}_{}.{}", name, timestamp, ext))
        };

        let paths = ExportPaths {
            json_corpus: stamped("top_rated_movie_emotions", "json"),
            csv_data: stamped("top_rated_movies", "csv"),
            enhanced_csv: stamped("enhanced_top_rated_movies", "csv"),
            reviews: stamped("top_rated_reviews", "json"),
            emotion_vectors: stamped("top_rated_emotion_vectors", "csv"),
            ranking: stamped("top_rated_ranking", "csv"),
            statistics: stamped("top_rated_statistics", "txt"),
        };

        serde_json::to_writer_pretty(buffered(&paths.json_corpus)?, records)?;
        write_basic_csv(records, csv::Writer::from_path(&paths.csv_data)?)?;
        write_enhanced_csv(records, csv::Writer::from_path(&paths.enhanced_csv)?)?;
        serde_json::to_writer_pretty(buffered(&paths.reviews)?, &flatten_reviews(records))?;
        write_emotion_vectors(records, csv::Writer::from_path(&paths.emotion_vectors)?)?;
        write_ranking(records, csv::Writer::from_path(&paths.ranking)?)?;
        fs::write(&paths.statistics, statistics_report(records))?;

        info!(
            "Exported {} records to {}",
            records.len(),
            self.out_dir.display()
        );
        Ok(paths)
    }
}

fn buffered(path: &Path) -> io::Result<BufWriter<File>> {
    Ok(BufWriter::new(File::create(path)?))
}

fn join_list(values: &[String]) -> String {
    values.join("|")
}

fn join_emotions(emotions: &[Emotion]) -> String {
    emotions
        .iter()
        .map(|e| e.as_str())
        .collect::<Vec<_>>()
        .join("|")
}

fn write_basic_csv<W: io::Write>(
    records: &[MergedRecord],
    mut writer: csv::Writer<W>,
) -> Result<()> {
    writer.write_record([
        "movie_id",
        "title",
        "original_title",
        "plot",
        "genres",
        "year",
        "rating",
        "vote_count",
        "director",
        "runtime",
        "tagline",
        "mood_tags",
        "dominant_emotions",
        "review_count",
        "tmdb_top_rated_rank",
    ])?;
    for record in records {
        writer.write_record([
            record.id.to_string(),
            record.title.clone(),
            record.original_title.clone(),
            record.overview.clone(),
            join_list(&record.genres),
            record.release_year.clone(),
            record.vote_average.to_string(),
            record.vote_count.to_string(),
            record.director.clone(),
            record.runtime.to_string(),
            record.tagline.clone(),
            join_list(&record.mood_tags),
            join_emotions(&record.dominant_emotions),
            record.review_count.to_string(),
            record.rank.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_enhanced_csv<W: io::Write>(
    records: &[MergedRecord],
    mut writer: csv::Writer<W>,
) -> Result<()> {
    writer.write_record([
        "movie_id",
        "title",
        "original_title",
        "plot",
        "tagline",
        "genres",
        "year",
        "rating",
        "runtime",
        "director",
        "main_cast",
        "tmdb_top_rated_rank",
        "mood_tags",
        "dominant_emotions",
        "emotional_complexity",
        "review_count",
        "avg_review_sentiment",
        "popularity",
        "vote_count",
        "emotion_vector",
    ])?;
    for record in records {
        let main_cast: Vec<String> = record.cast.iter().take(3).cloned().collect();
        writer.write_record([
            record.id.to_string(),
            record.title.clone(),
            record.original_title.clone(),
            record.overview.clone(),
            record.tagline.clone(),
            join_list(&record.genres),
            record.release_year.clone(),
            record.vote_average.to_string(),
            record.runtime.to_string(),
            record.director.clone(),
            join_list(&main_cast),
            record.rank.to_string(),
            join_list(&record.mood_tags),
            join_emotions(&record.dominant_emotions),
            record.emotional_complexity.to_string(),
            record.review_count.to_string(),
            format!("{:.3}", record.avg_review_sentiment()),
            record.popularity.to_string(),
            record.vote_count.to_string(),
            record.emotion_vector_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// One column per category in the canonical sorted order, zero-filled, so the
/// matrix loads without inspecting headers.
fn write_emotion_vectors<W: io::Write>(
    records: &[MergedRecord],
    mut writer: csv::Writer<W>,
) -> Result<()> {
    let mut header: Vec<String> = vec![
        "movie_id".into(),
        "title".into(),
        "year".into(),
        "rank".into(),
    ];
    header.extend(Emotion::ALL.iter().map(|e| e.as_str().to_string()));
    writer.write_record(&header)?;

    for record in records {
        let mut row: Vec<String> = vec![
            record.id.to_string(),
            record.title.clone(),
            record.release_year.clone(),
            record.rank.to_string(),
        ];
        row.extend(
            record
                .emotion_profile
                .to_dense()
                .iter()
                .map(|v| format!("{:.3}", v)),
        );
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_ranking<W: io::Write>(records: &[MergedRecord], mut writer: csv::Writer<W>) -> Result<()> {
    let mut sorted: Vec<&MergedRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.rank);

    writer.write_record([
        "rank",
        "title",
        "original_title",
        "year",
        "rating",
        "vote_count",
        "director",
        "genres",
        "mood_tags",
        "imdb_id",
    ])?;
    for record in sorted {
        let top_tags: Vec<String> = record.mood_tags.iter().take(3).cloned().collect();
        writer.write_record([
            record.rank.to_string(),
            record.title.clone(),
            record.original_title.clone(),
            record.release_year.clone(),
            record.vote_average.to_string(),
            record.vote_count.to_string(),
            record.director.clone(),
            join_list(&record.genres),
            join_list(&top_tags),
            record.imdb_id.clone(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn flatten_reviews(records: &[MergedRecord]) -> Vec<FlatReview<'_>> {
    records
        .iter()
        .flat_map(|record| {
            record.reviews.iter().map(move |review| FlatReview {
                movie_id: record.id,
                movie_title: &record.title,
                rank: record.rank,
                author: &review.author,
                content: &review.content,
                sentiment: review.sentiment.as_str(),
                sentiment_score: review.sentiment_score,
                created_at: &review.created_at,
                source: &review.source,
            })
        })
        .collect()
}

fn sorted_counts(counter: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counter.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

fn statistics_report(records: &[MergedRecord]) -> String {
    let total = records.len();
    let mut report = String::new();
    let _ = writeln!(report, "Top-rated movie corpus statistics ({} titles)", total);
    let _ = writeln!(
        report,
        "Generated: {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(report, "{}", "=".repeat(60));
    let _ = writeln!(report);

    if total == 0 {
        let _ = writeln!(report, "No records.");
        return report;
    }

    let total_reviews: usize = records.iter().map(|r| r.reviews.len()).sum();
    let avg_rating: f64 = records.iter().map(|r| r.vote_average).sum::<f64>() / total as f64;
    let avg_votes: f64 = records.iter().map(|r| r.vote_count as f64).sum::<f64>() / total as f64;

    let _ = writeln!(report, "Total movies: {}", total);
    let _ = writeln!(report, "Total reviews: {}", total_reviews);
    let _ = writeln!(
        report,
        "Average reviews per movie: {:.1}",
        total_reviews as f64 / total as f64
    );
    let _ = writeln!(report, "Average rating: {:.2}/10", avg_rating);
    let _ = writeln!(report, "Average vote count: {:.0}", avg_votes);
    let _ = writeln!(report);

    let mut emotion_counter: HashMap<String, usize> = HashMap::new();
    let mut tag_counter: HashMap<String, usize> = HashMap::new();
    for record in records {
        for emotion in &record.dominant_emotions {
            *emotion_counter.entry(emotion.to_string()).or_insert(0) += 1;
        }
        for tag in &record.mood_tags {
            *tag_counter.entry(tag.clone()).or_insert(0) += 1;
        }
    }

    let _ = writeln!(report, "Dominant emotion distribution:");
    for (emotion, count) in sorted_counts(emotion_counter) {
        let percentage = count as f64 / total as f64 * 100.0;
        let _ = writeln!(report, "  {}: {} ({:.1}%)", emotion, count, percentage);
    }
    let _ = writeln!(report);

    let _ = writeln!(report, "Mood tag distribution (top 20):");
    for (tag, count) in sorted_counts(tag_counter).into_iter().take(20) {
        let percentage = count as f64 / total as f64 * 100.0;
        let _ = writeln!(report, "  {}: {} ({:.1}%)", tag, count, percentage);
    }
    let _ = writeln!(report);

    let mut by_rank: Vec<&MergedRecord> = records.iter().collect();
    by_rank.sort_by_key(|r| r.rank);
    let _ = writeln!(report, "Top 10 movies:");
    for record in by_rank.into_iter().take(10) {
        let _ = writeln!(report);
        let _ = writeln!(report, "  {}. {}", record.rank, record.title);
        let _ = writeln!(
            report,
            "     Rating: {}/10, votes: {}",
            record.vote_average, record.vote_count
        );
        let _ = writeln!(report, "     Mood tags: {}", record.mood_tags.join(", "));
        let _ = writeln!(
            report,
            "     Dominant emotions: {}",
            record
                .dominant_emotions
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let _ = writeln!(report, "     Director: {}", record.director);
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionProfile, Sentiment};
    use crate::models::Review;

    fn sample_record(rank: usize, title: &str) -> MergedRecord {
        let profile: EmotionProfile = [(Emotion::Hope, 0.6), (Emotion::Sadness, 0.4)]
            .into_iter()
            .collect();
        MergedRecord {
            id: rank as u64,
            title: title.to_string(),
            original_title: title.to_string(),
            release_date: "1994-09-23".into(),
            release_year: "1994".into(),
            overview: "Two imprisoned men bond over a number of years.".into(),
            vote_average: 8.7,
            vote_count: 28000,
            popularity: 88.0,
            rank,
            genres: vec!["Drama".into(), "Crime".into()],
            runtime: 142,
            director: "Frank Darabont".into(),
            cast: vec![
                "Tim Robbins".into(),
                "Morgan Freeman".into(),
                "Bob Gunton".into(),
                "William Sadler".into(),
            ],
            keywords: vec!["prison".into()],
            tagline: "Hope can set you free.".into(),
            imdb_id: "tt0111161".into(),
            emotion_profile: profile,
            dominant_emotions: vec![Emotion::Hope, Emotion::Sadness],
            mood_tags: vec!["very-hope".into(), "sad-but-hopeful".into()],
            emotional_complexity: 2,
            reviews: vec![Review {
                author: "critic".into(),
                content: "An excellent film.".into(),
                created_at: "2020-01-01".into(),
                sentiment: Sentiment::Positive,
                sentiment_score: 1.0,
                url: String::new(),
                source: "tmdb".into(),
            }],
            review_count: 1,
            source: "tmdb_top_rated".into(),
            crawl_date: String::new(),
        }
    }

    fn csv_lines(buffer: Vec<u8>) -> Vec<String> {
        String::from_utf8(buffer)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect()
    }

    #[test]
    fn basic_csv_has_header_and_one_row_per_record() {
        let records = vec![sample_record(1, "A"), sample_record(2, "B")];
        let mut buffer = Vec::new();
        write_basic_csv(&records, csv::Writer::from_writer(&mut buffer)).unwrap();
        let lines = csv_lines(buffer);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("movie_id,title"));
        assert!(lines[1].contains("Drama|Crime"));
    }

    #[test]
    fn enhanced_csv_carries_emotion_vector_and_cast_cap() {
        let records = vec![sample_record(1, "A")];
        let mut buffer = Vec::new();
        write_enhanced_csv(&records, csv::Writer::from_writer(&mut buffer)).unwrap();
        let lines = csv_lines(buffer);
        assert!(lines[1].contains("hope:0.600|sadness:0.400"));
        assert!(lines[1].contains("Tim Robbins|Morgan Freeman|Bob Gunton"));
        assert!(!lines[1].contains("William Sadler"));
    }

    #[test]
    fn emotion_vector_columns_follow_canonical_order() {
        let records = vec![sample_record(1, "A")];
        let mut buffer = Vec::new();
        write_emotion_vectors(&records, csv::Writer::from_writer(&mut buffer)).unwrap();
        let lines = csv_lines(buffer);
        assert_eq!(
            lines[0],
            "movie_id,title,year,rank,anger,fear,hope,inspiration,joy,loneliness,love,peace,sadness,tension"
        );
        let fields: Vec<&str> = lines[1].split(',').collect();
        assert_eq!(fields[6], "0.600");
        assert_eq!(fields[12], "0.400");
    }

    #[test]
    fn ranking_is_sorted_by_rank() {
        let records = vec![sample_record(3, "C"), sample_record(1, "A")];
        let mut buffer = Vec::new();
        write_ranking(&records, csv::Writer::from_writer(&mut buffer)).unwrap();
        let lines = csv_lines(buffer);
        assert!(lines[1].starts_with("1,A"));
        assert!(lines[2].starts_with("3,C"));
    }

    #[test]
    fn reviews_flatten_with_movie_context() {
        let records = vec![sample_record(1, "A"), sample_record(2, "B")];
        let flat = flatten_reviews(&records);
        assert_eq!(flat.len(), 2);
        assert_eq!(flat[0].movie_title, "A");
        assert_eq!(flat[0].sentiment, "positive");
    }

    #[test]
    fn statistics_report_summarizes_corpus() {
        let records = vec![sample_record(1, "A"), sample_record(2, "B")];
        let report = statistics_report(&records);
        assert!(report.contains("Total movies: 2"));
        assert!(report.contains("Total reviews: 2"));
        assert!(report.contains("hope: 2 (100.0%)"));
        assert!(report.contains("1. A"));
    }

    #[test]
    fn empty_corpus_report_does_not_divide_by_zero() {
        let report = statistics_report(&[]);
        assert!(report.contains("No records."));
    }
}
