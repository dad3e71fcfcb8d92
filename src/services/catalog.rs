use crate::config::Config;
use crate::emotion::EmotionScorer;
use crate::error::Result;
use crate::models::{CatalogItem, ItemDetail, MergedRecord};
use crate::services::tmdb::TmdbClient;
use chrono::Local;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;
use std::time::Duration;
use tracing::{error, info, warn};

/// Drives the whole batch: paginate the ranked list, enrich each entry with
/// details and reviews, score emotions, and merge into persisted records.
pub struct CatalogBuilder {
    client: TmdbClient,
    scorer: EmotionScorer,
    page_delay: Duration,
    detail_delay: Duration,
    movie_delay: Duration,
}

impl CatalogBuilder {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            client: TmdbClient::new(config)?,
            scorer: EmotionScorer::with_tables(
                config.genre_table_path.as_deref(),
                config.title_overrides_path.as_deref(),
            )?,
            page_delay: Duration::from_millis(config.page_delay_ms),
            detail_delay: Duration::from_millis(config.detail_delay_ms),
            movie_delay: Duration::from_millis(config.movie_delay_ms),
        })
    }

    /// Crawl until `count` unique titles are collected, then merge each one.
    /// Individual request failures are logged and skipped; an empty list page
    /// ends pagination early.
    pub async fn crawl(&self, count: usize, max_reviews: usize) -> Result<Vec<MergedRecord>> {
        let items = self.collect_ranked(count).await;
        if items.is_empty() {
            warn!("Ranked list fetch produced no titles");
            return Ok(Vec::new());
        }
        info!("Collected {} ranked titles, enriching each", items.len());

        let progress = ProgressBar::new(items.len() as u64);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .progress_chars("=>-"),
        );

        let mut records = Vec::with_capacity(items.len());
        for item in items {
            progress.set_message(item.title.clone());
            records.push(self.merge_one(item, max_reviews).await);
            progress.inc(1);
            tokio::time::sleep(self.movie_delay).await;
        }
        progress.finish_with_message("done");
        Ok(records)
    }

    async fn collect_ranked(&self, count: usize) -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = Vec::with_capacity(count);
        let mut seen: HashSet<u64> = HashSet::new();
        let mut page = 1;

        while items.len() < count {
            let batch = match self.client.top_rated(page).await {
                Ok(batch) => batch,
                Err(e) => {
                    error!("Failed to fetch top-rated page {}: {}", page, e);
                    Vec::new()
                }
            };
            if batch.is_empty() {
                break;
            }
            for item in batch {
                if seen.insert(item.id) {
                    items.push(item);
                }
            }
            page += 1;
            tokio::time::sleep(self.page_delay).await;
        }

        items.truncate(count);
        items
    }

    async fn merge_one(&self, item: CatalogItem, max_reviews: usize) -> MergedRecord {
        let detail = match self.client.movie_details(item.id).await {
            Ok(detail) => detail,
            Err(e) => {
                error!("Failed to fetch details for {} ({}): {}", item.title, item.id, e);
                ItemDetail::default()
            }
        };
        tokio::time::sleep(self.detail_delay).await;

        let reviews = match self.client.movie_reviews(item.id, max_reviews).await {
            Ok(reviews) => reviews,
            Err(e) => {
                error!("Failed to fetch reviews for {} ({}): {}", item.title, item.id, e);
                Vec::new()
            }
        };
        tokio::time::sleep(self.detail_delay).await;

        let analysis = self
            .scorer
            .score(&item.overview, &detail.tagline, &detail.keywords, &detail.genres);

        let review_count = reviews.len();
        MergedRecord {
            id: item.id,
            title: item.title,
            original_title: item.original_title,
            release_year: MergedRecord::year_of(&item.release_date),
            release_date: item.release_date,
            overview: item.overview,
            vote_average: item.vote_average,
            vote_count: item.vote_count,
            popularity: item.popularity,
            rank: item.rank,
            genres: detail.genres,
            runtime: detail.runtime,
            director: detail.director,
            cast: detail.cast,
            keywords: detail.keywords,
            tagline: detail.tagline,
            imdb_id: detail.imdb_id,
            emotion_profile: analysis.emotion_profile,
            dominant_emotions: analysis.dominant_emotions,
            mood_tags: analysis.mood_tags,
            emotional_complexity: analysis.emotional_complexity,
            reviews,
            review_count,
            source: "tmdb_top_rated".to_string(),
            crawl_date: Local::now().to_rfc3339(),
        }
    }
}
