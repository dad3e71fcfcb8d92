use crate::emotion::{lexicon, Emotion, EmotionProfile, EMOTION_DIMENSIONS};
use crate::error::Result;
use crate::ml::HuggingFaceEmbedder;
use crate::models::MergedRecord;
use crate::recommender::query::parse_weighted_pairs;
use crate::recommender::sample::sample_records;
use ndarray::Array2;
use serde::Deserialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::{error, info, warn};

/// The loaded corpus before any matrices exist.
pub struct MovieIndex {
    records: Vec<MergedRecord>,
}

/// The corpus plus its two search matrices: one embedding row and one dense
/// emotion row per record, rows aligned by index.
pub struct SearchIndex {
    pub(crate) records: Vec<MergedRecord>,
    pub(crate) semantic: Array2<f32>,
    pub(crate) emotion: Array2<f64>,
}

#[derive(Debug, Deserialize)]
struct EnhancedCsvRow {
    #[serde(default)]
    movie_id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    original_title: String,
    #[serde(default)]
    plot: String,
    #[serde(default)]
    tagline: String,
    #[serde(default)]
    genres: String,
    #[serde(default)]
    year: String,
    #[serde(default)]
    rating: f64,
    #[serde(default)]
    runtime: u32,
    #[serde(default)]
    director: String,
    #[serde(default)]
    main_cast: String,
    #[serde(default)]
    tmdb_top_rated_rank: usize,
    #[serde(default)]
    mood_tags: String,
    #[serde(default)]
    dominant_emotions: String,
    #[serde(default)]
    emotional_complexity: usize,
    #[serde(default)]
    review_count: usize,
    #[serde(default)]
    popularity: f64,
    #[serde(default)]
    vote_count: u64,
    #[serde(default)]
    emotion_vector: String,
}

fn split_list(value: &str) -> Vec<String> {
    if value.trim().is_empty() {
        return Vec::new();
    }
    value.split('|').map(|part| part.trim().to_string()).collect()
}

impl From<EnhancedCsvRow> for MergedRecord {
    fn from(row: EnhancedCsvRow) -> Self {
        // Unparseable or unknown emotion:score pairs are skipped.
        let emotion_profile: EmotionProfile = parse_weighted_pairs(&row.emotion_vector, '|')
            .into_iter()
            .filter_map(|(label, score)| lexicon::resolve_label(&label).map(|e| (e, score)))
            .collect();
        let dominant_emotions: Vec<Emotion> = split_list(&row.dominant_emotions)
            .iter()
            .filter_map(|label| lexicon::resolve_label(label))
            .collect();

        MergedRecord {
            id: row.movie_id,
            title: row.title,
            original_title: row.original_title,
            release_date: String::new(),
            release_year: row.year,
            overview: row.plot,
            vote_average: row.rating,
            vote_count: row.vote_count,
            popularity: row.popularity,
            rank: row.tmdb_top_rated_rank,
            genres: split_list(&row.genres),
            runtime: row.runtime,
            director: row.director,
            cast: split_list(&row.main_cast),
            keywords: Vec::new(),
            tagline: row.tagline,
            imdb_id: String::new(),
            emotion_profile,
            dominant_emotions,
            mood_tags: split_list(&row.mood_tags),
            emotional_complexity: row.emotional_complexity,
            reviews: Vec::new(),
            review_count: row.review_count,
            source: "csv".to_string(),
            crawl_date: String::new(),
        }
    }
}

impl MovieIndex {
    pub fn from_records(records: Vec<MergedRecord>) -> Self {
        Self { records }
    }

    /// Load a corpus from either export format, dispatching on the `.csv`
    /// extension. Missing, malformed or empty files degrade to the embedded
    /// sample corpus so the recommender always starts.
    pub fn load(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            Self::or_sample(Self::try_load_csv(path), path)
        } else {
            Self::load_json(path)
        }
    }

    /// Load the JSON corpus, renormalizing each profile.
    pub fn load_json(path: &Path) -> Self {
        Self::or_sample(Self::try_load_json(path), path)
    }

    fn or_sample(loaded: Result<Vec<MergedRecord>>, path: &Path) -> Self {
        let records = match loaded {
            Ok(records) if !records.is_empty() => {
                info!("Loaded {} titles from {}", records.len(), path.display());
                records
            }
            Ok(_) => {
                warn!("Corpus at {} contains no records", path.display());
                warn!("Falling back to the embedded sample corpus");
                sample_records()
            }
            Err(e) => {
                error!("Failed to load corpus from {}: {}", path.display(), e);
                warn!("Falling back to the embedded sample corpus");
                sample_records()
            }
        };
        Self::from_records(records)
    }

    fn try_load_json(path: &Path) -> Result<Vec<MergedRecord>> {
        let raw = std::fs::read_to_string(path)?;
        let mut records: Vec<MergedRecord> = serde_json::from_str(&raw)?;
        for record in &mut records {
            record.emotion_profile = record.emotion_profile.normalized();
            if record.release_year.is_empty() {
                record.release_year = MergedRecord::year_of(&record.release_date);
            }
        }
        Ok(records)
    }

    /// Compatibility loader for the enhanced CSV export.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let records = Self::try_load_csv(path)?;
        info!("Loaded {} titles from {}", records.len(), path.display());
        Ok(Self::from_records(records))
    }

    fn try_load_csv(path: &Path) -> Result<Vec<MergedRecord>> {
        let file = File::open(path)?;
        records_from_csv(file)
    }

    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Encode every record's searchable text and densify the emotion
    /// profiles, producing the searchable index.
    pub async fn build(self, embedder: &HuggingFaceEmbedder) -> Result<SearchIndex> {
        let texts: Vec<String> = self.records.iter().map(searchable_text).collect();
        info!("Encoding {} record texts", texts.len());
        let semantic = embedder.encode_batch(&texts).await?;
        let emotion = emotion_matrix(&self.records);
        Ok(SearchIndex {
            records: self.records,
            semantic,
            emotion,
        })
    }
}

impl SearchIndex {
    pub fn records(&self) -> &[MergedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn for_tests(
        records: Vec<MergedRecord>,
        semantic: Array2<f32>,
        emotion: Array2<f64>,
    ) -> Self {
        Self {
            records,
            semantic,
            emotion,
        }
    }
}

fn records_from_csv<R: io::Read>(reader: R) -> Result<Vec<MergedRecord>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize::<EnhancedCsvRow>() {
        records.push(MergedRecord::from(row?));
    }
    Ok(records)
}

/// One dense row per record, columns in the canonical sorted label order.
pub(crate) fn emotion_matrix(records: &[MergedRecord]) -> Array2<f64> {
    let mut matrix = Array2::zeros((records.len(), EMOTION_DIMENSIONS));
    for (i, record) in records.iter().enumerate() {
        let dense = record.emotion_profile.to_dense();
        for (j, value) in dense.iter().enumerate() {
            matrix[[i, j]] = *value;
        }
    }
    matrix
}

/// Compose the text a record is embedded under: semantics first, then the
/// emotional signature so mood language is searchable too.
pub(crate) fn searchable_text(record: &MergedRecord) -> String {
    let mut parts: Vec<String> = vec![format!("Movie \"{}\".", record.title)];

    if !record.tagline.is_empty() {
        parts.push(format!("Tagline: {}.", record.tagline));
    }
    if !record.overview.is_empty() {
        parts.push(format!("Plot: {}", record.overview));
    }
    if !record.genres.is_empty() {
        parts.push(format!("Genres: {}.", record.genres.join(", ")));
    }
    if !record.release_year.is_empty() {
        parts.push(format!("Year: {}.", record.release_year));
    }
    if !record.mood_tags.is_empty() {
        let tags: Vec<&str> = record.mood_tags.iter().take(5).map(|t| t.as_str()).collect();
        parts.push(format!("Mood: {}.", tags.join(", ")));
    }
    if !record.dominant_emotions.is_empty() {
        let emotions: Vec<&str> = record.dominant_emotions.iter().map(|e| e.as_str()).collect();
        parts.push(format!("Dominant emotions: {}.", emotions.join(", ")));
    }

    let top: Vec<String> = record
        .emotion_profile
        .ranked()
        .into_iter()
        .take(3)
        .filter(|(_, score)| *score > 0.0)
        .map(|(emotion, score)| format!("{}({:.2})", emotion, score))
        .collect();
    if !top.is_empty() {
        parts.push(format!("Emotion intensities: {}.", top.join(", ")));
    }

    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_corpus(name: &str, contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("cinemood-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn missing_corpus_falls_back_to_sample() {
        let index = MovieIndex::load_json(&PathBuf::from("/nonexistent/corpus.json"));
        assert_eq!(index.len(), 3);
        assert_eq!(index.records()[0].source, "example");
    }

    #[test]
    fn empty_corpus_falls_back_to_sample() {
        let path = temp_corpus("empty-corpus.json", "[]");
        let index = MovieIndex::load_json(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(index.len(), 3);
        assert_eq!(index.records()[0].source, "example");
    }

    #[test]
    fn load_dispatches_on_csv_extension() {
        let csv = "\
movie_id,title,plot,genres,year,rating,emotion_vector
7,Dispatched,A long journey home.,Drama,2001,8.1,hope:0.700|joy:0.300
";
        let path = temp_corpus("corpus.CSV", csv);
        let index = MovieIndex::load(&path);
        std::fs::remove_file(&path).ok();
        assert_eq!(index.len(), 1);
        assert_eq!(index.records()[0].title, "Dispatched");
        assert_eq!(index.records()[0].source, "csv");
    }

    #[test]
    fn unreadable_csv_degrades_to_sample() {
        let index = MovieIndex::load(&PathBuf::from("/nonexistent/corpus.csv"));
        assert_eq!(index.len(), 3);
        assert_eq!(index.records()[0].source, "example");
    }

    #[test]
    fn csv_rows_become_records() {
        let csv = "\
movie_id,title,plot,genres,year,rating,mood_tags,dominant_emotions,tmdb_top_rated_rank,emotion_vector
1,Example,A quiet story.,Drama|Crime,1994,8.7,very-hope|uplifting,hope|sadness,1,hope:0.600|sadness:0.400
";
        let records = records_from_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.genres, vec!["Drama", "Crime"]);
        assert_eq!(record.emotion_profile.get(Emotion::Hope), 0.6);
        assert_eq!(record.dominant_emotions, vec![Emotion::Hope, Emotion::Sadness]);
        assert_eq!(record.rank, 1);
    }

    #[test]
    fn csv_skips_unparseable_vector_pairs() {
        let csv = "\
movie_id,title,emotion_vector
2,Partial,hope:0.5|broken|wonder:0.3|joy:0.5
";
        let records = records_from_csv(csv.as_bytes()).unwrap();
        let profile = &records[0].emotion_profile;
        assert_eq!(profile.len(), 2);
        assert_eq!(profile.get(Emotion::Hope), 0.5);
        assert_eq!(profile.get(Emotion::Joy), 0.5);
    }

    #[test]
    fn emotion_matrix_columns_follow_canonical_order() {
        let records = sample_records();
        let matrix = emotion_matrix(&records);
        assert_eq!(matrix.dim(), (3, EMOTION_DIMENSIONS));
        // Shawshank's hope sits in the hope column
        let hope_col = Emotion::Hope.index();
        assert!(matrix[[0, hope_col]] > 0.3);
        assert_eq!(matrix[[0, Emotion::Tension.index()]], 0.0);
    }

    #[test]
    fn searchable_text_carries_semantics_and_mood() {
        let records = sample_records();
        let text = searchable_text(&records[0]);
        assert!(text.contains("The Shawshank Redemption"));
        assert!(text.contains("Plot:"));
        assert!(text.contains("Genres: Drama, Crime."));
        assert!(text.contains("Dominant emotions: hope, inspiration."));
        assert!(text.contains("Emotion intensities:"));
    }
}
