use crate::emotion::{lexicon, EMOTION_DIMENSIONS};
use crate::error::Result;
use crate::ml::HuggingFaceEmbedder;
use crate::models::MergedRecord;
use crate::recommender::index::SearchIndex;
use crate::recommender::query::extract_emotions_from_query;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One ranked answer: the record's row index, the score the ranking used and
/// both component scores for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub index: usize,
    pub score: f64,
    pub semantic_score: f64,
    pub emotion_score: f64,
}

impl SearchIndex {
    /// Cosine of the query embedding against every record embedding.
    pub(crate) fn semantic_scores(&self, query_embedding: &[f32]) -> Vec<f64> {
        self.semantic
            .rows()
            .into_iter()
            .map(|row| cosine_f32(query_embedding, row.as_slice().unwrap_or(&[])))
            .collect()
    }

    pub fn semantic_search_with(&self, query_embedding: &[f32], top_k: usize) -> Vec<SearchHit> {
        let scores = self.semantic_scores(query_embedding);
        top_indices(&scores, top_k)
            .into_iter()
            .map(|index| SearchHit {
                index,
                score: scores[index],
                semantic_score: scores[index],
                emotion_score: 0.0,
            })
            .collect()
    }

    /// Cosine of a target emotion distribution against every record's dense
    /// emotion row. Labels go through the bilingual alias table; unknown ones
    /// are dropped with a warning, intensities are clamped to [0, 1]. An
    /// all-zero target yields no results.
    pub fn emotion_search(&self, target: &BTreeMap<String, f64>, top_k: usize) -> Vec<SearchHit> {
        let target_vector = match self.emotion_target(target) {
            Some(vector) => vector,
            None => return Vec::new(),
        };

        let scores = self.emotion_scores(&target_vector);
        top_indices(&scores, top_k)
            .into_iter()
            .map(|index| SearchHit {
                index,
                score: scores[index],
                semantic_score: 0.0,
                emotion_score: scores[index],
            })
            .collect()
    }

    pub(crate) fn emotion_scores(&self, target_vector: &[f64]) -> Vec<f64> {
        self.emotion
            .rows()
            .into_iter()
            .map(|row| cosine_f64(target_vector, row.as_slice().unwrap_or(&[])))
            .collect()
    }

    /// Resolve, clamp and L2-normalize the target. `None` when nothing
    /// usable remains.
    pub(crate) fn emotion_target(&self, target: &BTreeMap<String, f64>) -> Option<Vec<f64>> {
        let mut vector = vec![0.0; EMOTION_DIMENSIONS];
        for (label, intensity) in target {
            match lexicon::resolve_label(label) {
                Some(emotion) => {
                    vector[emotion.index()] = intensity.clamp(0.0, 1.0);
                }
                None => warn!("Unknown emotion label '{}', dropping it", label),
            }
        }

        let norm: f64 = vector.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm == 0.0 {
            warn!("Target emotion vector is all zeros, nothing to rank against");
            return None;
        }
        for value in &mut vector {
            *value /= norm;
        }
        debug!("Normalized emotion target: {:?}", vector);
        Some(vector)
    }

    /// Weighted sum of independently computed semantic and emotion scores
    /// over the full corpus.
    pub(crate) fn hybrid_rank(
        &self,
        semantic_scores: &[f64],
        emotion_scores: &[f64],
        semantic_weight: f64,
        emotion_weight: f64,
        top_k: usize,
    ) -> Vec<SearchHit> {
        let combined: Vec<f64> = semantic_scores
            .iter()
            .zip(emotion_scores)
            .map(|(sem, emo)| sem * semantic_weight + emo * emotion_weight)
            .collect();
        top_indices(&combined, top_k)
            .into_iter()
            .map(|index| SearchHit {
                index,
                score: combined[index],
                semantic_score: semantic_scores[index],
                emotion_score: emotion_scores[index],
            })
            .collect()
    }
}

/// The query-facing engine: the built index plus the embedder for query text.
pub struct MoodRecommender {
    index: SearchIndex,
    embedder: HuggingFaceEmbedder,
}

impl MoodRecommender {
    pub fn new(index: SearchIndex, embedder: HuggingFaceEmbedder) -> Self {
        Self { index, embedder }
    }

    pub fn record(&self, hit: &SearchHit) -> &MergedRecord {
        &self.index.records()[hit.index]
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub async fn semantic_search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let query_embedding = self.embedder.encode(query).await?;
        Ok(self.index.semantic_search_with(&query_embedding, top_k))
    }

    pub fn emotion_search(&self, target: &BTreeMap<String, f64>, top_k: usize) -> Vec<SearchHit> {
        self.index.emotion_search(target, top_k)
    }

    /// Combined ranking. Without an explicit target the query text itself is
    /// mined for one.
    pub async fn hybrid_search(
        &self,
        query: &str,
        target: Option<&BTreeMap<String, f64>>,
        semantic_weight: f64,
        emotion_weight: f64,
        top_k: usize,
    ) -> Result<Vec<SearchHit>> {
        let extracted;
        let target = match target {
            Some(target) => target,
            None => {
                extracted = extract_emotions_from_query(query)
                    .into_iter()
                    .map(|(emotion, weight)| (emotion.as_str().to_string(), weight))
                    .collect();
                &extracted
            }
        };

        let query_embedding = self.embedder.encode(query).await?;
        let semantic_scores = self.index.semantic_scores(&query_embedding);
        let emotion_scores = match self.index.emotion_target(target) {
            Some(vector) => self.index.emotion_scores(&vector),
            None => vec![0.0; self.index.len()],
        };

        Ok(self.index.hybrid_rank(
            &semantic_scores,
            &emotion_scores,
            semantic_weight,
            emotion_weight,
            top_k,
        ))
    }

    /// Mood-description entry point: extract a target distribution from the
    /// text and rank by emotion, falling back to semantic search when the
    /// target turns out unusable.
    pub async fn recommend_by_mood(&self, mood: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        let target: BTreeMap<String, f64> = extract_emotions_from_query(mood)
            .into_iter()
            .map(|(emotion, weight)| (emotion.as_str().to_string(), weight))
            .collect();
        info!("Mood target for \"{}\": {:?}", mood, target);

        let hits = self.index.emotion_search(&target, top_k);
        if !hits.is_empty() {
            return Ok(hits);
        }
        info!("No usable emotion target, falling back to semantic search");
        self.semantic_search(mood, top_k).await
    }
}

fn cosine_f32(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot / (norm_a * norm_b)) as f64
}

fn cosine_f64(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Indices of the `top_k` highest scores, descending, ties kept in record
/// order.
fn top_indices(scores: &[f64], top_k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..scores.len()).collect();
    indices.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    indices.truncate(top_k.min(scores.len()));
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommender::index::{emotion_matrix, SearchIndex};
    use crate::recommender::sample::sample_records;
    use ndarray::Array2;

    fn test_index() -> SearchIndex {
        let records = sample_records();
        let emotion = emotion_matrix(&records);
        // Orthogonal unit embeddings, one axis per record
        let semantic = Array2::from_shape_vec(
            (3, 3),
            vec![1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
        )
        .unwrap();
        SearchIndex::for_tests(records, semantic, emotion)
    }

    fn joyful_index() -> SearchIndex {
        use crate::emotion::{Emotion, EmotionProfile};
        let mut records = sample_records();
        // Make record 0 the only joyful one
        records[0].emotion_profile = [(Emotion::Joy, 1.0)].into_iter().collect::<EmotionProfile>();
        records[1].emotion_profile = [(Emotion::Sadness, 1.0)].into_iter().collect();
        records[2].emotion_profile = [(Emotion::Fear, 1.0)].into_iter().collect();
        let emotion = emotion_matrix(&records);
        let semantic = Array2::zeros((3, 3));
        SearchIndex::for_tests(records, semantic, emotion)
    }

    #[test]
    fn semantic_search_ranks_by_cosine() {
        let index = test_index();
        let hits = index.semantic_search_with(&[0.0, 1.0, 0.0], 2);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].index, 1);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
        assert_eq!(hits[0].emotion_score, 0.0);
    }

    #[test]
    fn zero_target_vector_returns_no_hits() {
        let index = test_index();
        let target: BTreeMap<String, f64> = [("joy".to_string(), 0.0)].into_iter().collect();
        assert!(index.emotion_search(&target, 5).is_empty());
    }

    #[test]
    fn unknown_labels_are_dropped_but_rest_searches() {
        let index = joyful_index();
        let target: BTreeMap<String, f64> = [
            ("joy".to_string(), 0.9),
            ("wonder".to_string(), 0.5),
        ]
        .into_iter()
        .collect();
        let hits = index.emotion_search(&target, 3);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn only_unknown_labels_means_empty_result() {
        let index = test_index();
        let target: BTreeMap<String, f64> = [("wonder".to_string(), 0.9)].into_iter().collect();
        assert!(index.emotion_search(&target, 3).is_empty());
    }

    #[test]
    fn joy_weighted_target_ranks_joyful_record_first() {
        let index = joyful_index();
        let target: BTreeMap<String, f64> = [("joy".to_string(), 1.0)].into_iter().collect();
        let hits = index.emotion_search(&target, 3);
        assert_eq!(hits[0].index, 0);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
        assert!(hits[1].score < 0.5);
    }

    #[test]
    fn chinese_aliases_resolve_in_targets() {
        let index = joyful_index();
        let target: BTreeMap<String, f64> = [("快乐".to_string(), 1.0)].into_iter().collect();
        let hits = index.emotion_search(&target, 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn intensities_are_clamped_to_unit_range() {
        let index = joyful_index();
        let target: BTreeMap<String, f64> = [("joy".to_string(), 7.5)].into_iter().collect();
        let hits = index.emotion_search(&target, 1);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn hybrid_score_is_the_weighted_sum() {
        let index = test_index();
        let semantic = vec![0.9, 0.1, 0.5];
        let emotion = vec![0.2, 0.8, 0.5];
        let hits = index.hybrid_rank(&semantic, &emotion, 0.7, 0.3, 3);
        for hit in &hits {
            let expected = semantic[hit.index] * 0.7 + emotion[hit.index] * 0.3;
            assert!((hit.score - expected).abs() < 1e-9);
            assert_eq!(hit.semantic_score, semantic[hit.index]);
            assert_eq!(hit.emotion_score, emotion[hit.index]);
        }
        assert_eq!(hits[0].index, 0);
    }

    #[test]
    fn top_indices_caps_and_orders() {
        let scores = vec![0.1, 0.9, 0.5, 0.9];
        assert_eq!(top_indices(&scores, 3), vec![1, 3, 2]);
        assert_eq!(top_indices(&scores, 10).len(), 4);
    }
}
