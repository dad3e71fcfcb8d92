use crate::error::{AppError, Result};
use lazy_static::lazy_static;
use lru::LruCache;
use ndarray::Array2;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::num::NonZeroUsize;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";
const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const MAX_TEXT_PREVIEW_LENGTH: usize = 100;
const EMBEDDING_CACHE_SIZE: usize = 256;

lazy_static! {
    // Process-wide embedding cache; the batch builder and the query loop hit
    // the same texts repeatedly.
    static ref EMBEDDING_CACHE: RwLock<LruCache<String, Vec<f32>>> = {
        let size = NonZeroUsize::new(EMBEDDING_CACHE_SIZE).unwrap();
        RwLock::new(LruCache::new(size))
    };
}

/// Text-to-vector provider backed by the HuggingFace Inference API.
/// Treated as an opaque function: the crate never inspects vector contents
/// beyond L2 normalization.
#[derive(Clone)]
pub struct HuggingFaceEmbedder {
    client: Client,
    api_key: String,
    model_url: String,
    model_name: String,
}

impl HuggingFaceEmbedder {
    pub fn new() -> Result<Self> {
        let api_key = env::var("APP_HUGGINGFACE_API_KEY").map_err(|_| {
            AppError::ModelError("Missing APP_HUGGINGFACE_API_KEY environment variable".to_string())
        })?;
        if api_key.trim().is_empty() {
            return Err(AppError::ModelError(
                "APP_HUGGINGFACE_API_KEY is empty".to_string(),
            ));
        }

        let timeout_seconds = env::var("APP_HUGGINGFACE_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let base_url =
            env::var("APP_HUGGINGFACE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model_name = env::var("APP_HUGGINGFACE_MODEL_NAME")
            .unwrap_or_else(|_| DEFAULT_MODEL_NAME.to_string());

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .connect_timeout(Duration::from_secs(timeout_seconds.min(15)))
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        let model_url = format!("{}/models/{}", base_url, model_name);
        debug!("Embedder ready: {} ({}s timeout)", model_name, timeout_seconds);

        Ok(Self {
            client,
            api_key,
            model_url,
            model_name,
        })
    }

    /// Encode a single text into an L2-normalized embedding.
    pub async fn encode(&self, text: &str) -> Result<Vec<f32>> {
        let preprocessed = preprocess_text(text);

        if let Some(embedding) = cache_lookup(&preprocessed) {
            debug!(
                "Embedding cache hit: {}",
                &preprocessed[..preprocessed.len().min(30)]
            );
            return Ok(embedding);
        }

        debug!(
            "Encoding text (length {}): {}{}",
            preprocessed.len(),
            &preprocessed[..preprocessed.len().min(MAX_TEXT_PREVIEW_LENGTH)],
            if preprocessed.len() > MAX_TEXT_PREVIEW_LENGTH {
                "..."
            } else {
                ""
            }
        );

        let response = self.request_embedding(&preprocessed).await?;
        let embedding = normalize_vector(&parse_embedding_response(response, &self.model_name)?);

        cache_store(preprocessed, embedding.clone());
        Ok(embedding)
    }

    /// Encode a batch of texts into one row-per-text matrix. Texts are sent
    /// sequentially; the provider is the only place parallelism could live
    /// and it is out of this crate's hands.
    pub async fn encode_batch(&self, texts: &[String]) -> Result<Array2<f32>> {
        if texts.is_empty() {
            return Err(AppError::InvalidInput("Empty batch provided".to_string()));
        }

        let mut rows: Vec<Vec<f32>> = Vec::with_capacity(texts.len());
        for text in texts {
            rows.push(self.encode(text).await?);
        }

        let dim = rows[0].len();
        if let Some(bad) = rows.iter().find(|r| r.len() != dim) {
            return Err(AppError::ModelError(format!(
                "Inconsistent embedding dimensions in batch: expected {}, got {}",
                dim,
                bad.len()
            )));
        }

        let flat: Vec<f32> = rows.into_iter().flatten().collect();
        Ok(Array2::from_shape_vec((texts.len(), dim), flat)?)
    }

    async fn request_embedding(&self, input: &str) -> Result<serde_json::Value> {
        #[derive(Serialize)]
        struct Request<'a> {
            inputs: &'a str,
            options: Options,
        }

        #[derive(Serialize)]
        struct Options {
            wait_for_model: bool,
            use_cache: bool,
        }

        let request = Request {
            inputs: input,
            options: Options {
                wait_for_model: true,
                use_cache: true,
            },
        };

        let response = self
            .client
            .post(&self.model_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::ModelError(format!("Failed to send request to model API: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(AppError::ModelError(
                    "Authentication failed. Check your HuggingFace API key.".to_string(),
                ));
            }
            if status.as_u16() == 429 {
                warn!("HuggingFace rate limit hit");
            }
            return Err(AppError::ModelError(format!(
                "HuggingFace API returned non-success status: {} - {}",
                status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::ModelError(format!("Failed to parse response as JSON: {}", e)))
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

// `get` (not `peek`) so a hit refreshes the entry's recency.
fn cache_lookup(key: &str) -> Option<Vec<f32>> {
    let mut cache = EMBEDDING_CACHE.write().ok()?;
    cache.get(key).cloned()
}

fn cache_store(key: String, embedding: Vec<f32>) {
    if let Ok(mut cache) = EMBEDDING_CACHE.write() {
        cache.put(key, embedding);
    }
}

fn preprocess_text(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "empty text".to_string();
    }
    trimmed.to_string()
}

/// The inference API answers in several shapes depending on the model:
/// `[0.1, ...]`, `[[0.1, ...]]`, `{"embedding": [...]}` or
/// `{"embeddings": [[...]]}`.
fn parse_embedding_response(value: serde_json::Value, model_name: &str) -> Result<Vec<f32>> {
    #[derive(Debug, Deserialize, Default)]
    struct EmbeddingResponse {
        #[serde(default)]
        embeddings: Vec<Vec<f32>>,
        #[serde(default)]
        embedding: Vec<f32>,
    }

    let mut embedding: Vec<f32> = Vec::new();

    if let Some(array) = value.as_array() {
        if array.is_empty() {
            return Err(AppError::ModelError(
                "Received empty array from model".to_string(),
            ));
        }
        if let Some(first) = array.first().and_then(|v| v.as_array()) {
            embedding = first
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
        } else {
            embedding = array
                .iter()
                .filter_map(|v| v.as_f64().map(|f| f as f32))
                .collect();
        }
    } else if value.is_object() {
        let parsed: EmbeddingResponse = serde_json::from_value(value)
            .map_err(|e| AppError::ModelError(format!("Failed to parse embedding response: {}", e)))?;
        if !parsed.embedding.is_empty() {
            embedding = parsed.embedding;
        } else if !parsed.embeddings.is_empty() {
            embedding = parsed.embeddings.into_iter().next().unwrap_or_default();
        }
    }

    if embedding.is_empty() {
        return Err(AppError::ModelError(format!(
            "Failed to extract embedding from {} response",
            model_name
        )));
    }
    Ok(embedding)
}

fn normalize_vector(vector: &[f32]) -> Vec<f32> {
    let magnitude = vector.iter().map(|&x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        vector.iter().map(|&x| x / magnitude).collect()
    } else {
        vec![0.0; vector.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_flat_array_response() {
        let value = json!([0.5, 0.5]);
        assert_eq!(
            parse_embedding_response(value, "test").unwrap(),
            vec![0.5, 0.5]
        );
    }

    #[test]
    fn parses_nested_array_response() {
        let value = json!([[1.0, 0.0, 0.0]]);
        assert_eq!(
            parse_embedding_response(value, "test").unwrap(),
            vec![1.0, 0.0, 0.0]
        );
    }

    #[test]
    fn parses_object_responses() {
        let value = json!({ "embedding": [0.1, 0.2] });
        assert_eq!(
            parse_embedding_response(value, "test").unwrap(),
            vec![0.1, 0.2]
        );
        let value = json!({ "embeddings": [[0.3, 0.4]] });
        assert_eq!(
            parse_embedding_response(value, "test").unwrap(),
            vec![0.3, 0.4]
        );
    }

    #[test]
    fn empty_response_is_an_error() {
        assert!(parse_embedding_response(json!([]), "test").is_err());
        assert!(parse_embedding_response(json!({}), "test").is_err());
    }

    #[test]
    fn normalization_produces_unit_length() {
        let normalized = normalize_vector(&[3.0, 4.0]);
        assert!((normalized[0] - 0.6).abs() < 1e-6);
        assert!((normalized[1] - 0.8).abs() < 1e-6);
        assert_eq!(normalize_vector(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn preprocess_substitutes_empty_text() {
        assert_eq!(preprocess_text("  "), "empty text");
        assert_eq!(preprocess_text(" hi "), "hi");
    }

    #[test]
    fn cache_hits_refresh_recency() {
        for i in 0..EMBEDDING_CACHE_SIZE {
            cache_store(format!("recency-{}", i), vec![i as f32]);
        }
        // Touching the oldest entry must save it from the next eviction.
        assert_eq!(cache_lookup("recency-0"), Some(vec![0.0]));
        cache_store("recency-extra".to_string(), vec![1.0]);
        assert!(cache_lookup("recency-0").is_some());
        assert!(cache_lookup("recency-1").is_none());
    }
}
