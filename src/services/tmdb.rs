use crate::config::Config;
use crate::emotion::analyze_sentiment;
use crate::error::Result;
use crate::models::{CatalogItem, ItemDetail, Review};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

/// Entries per ranked-list page, fixed by the API.
pub const PAGE_SIZE: usize = 20;

/// Thin client for the TMDB v3 API. Callers decide what a failed call means;
/// the catalog builder logs and keeps going.
#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
    language: String,
}

#[derive(Deserialize)]
struct ListResponse {
    #[serde(default)]
    results: Vec<RawListItem>,
}

#[derive(Deserialize)]
struct RawListItem {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    original_title: String,
    #[serde(default)]
    overview: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    vote_average: f64,
    #[serde(default)]
    vote_count: u64,
    #[serde(default)]
    popularity: f64,
}

#[derive(Deserialize, Default)]
struct RawDetails {
    #[serde(default)]
    genres: Vec<Named>,
    #[serde(default)]
    runtime: u32,
    #[serde(default)]
    budget: u64,
    #[serde(default)]
    revenue: u64,
    #[serde(default)]
    tagline: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    imdb_id: Option<String>,
    #[serde(default)]
    production_companies: Vec<Named>,
    #[serde(default)]
    production_countries: Vec<Named>,
    #[serde(default)]
    credits: RawCredits,
    #[serde(default)]
    keywords: RawKeywords,
}

#[derive(Deserialize, Default)]
struct RawCredits {
    #[serde(default)]
    crew: Vec<RawCrewMember>,
    #[serde(default)]
    cast: Vec<Named>,
}

#[derive(Deserialize)]
struct RawCrewMember {
    #[serde(default)]
    job: String,
    #[serde(default)]
    name: String,
}

#[derive(Deserialize, Default)]
struct RawKeywords {
    #[serde(default)]
    keywords: Vec<Named>,
}

#[derive(Deserialize)]
struct Named {
    #[serde(default)]
    name: String,
}

#[derive(Deserialize)]
struct ReviewsResponse {
    #[serde(default)]
    results: Vec<RawReview>,
}

#[derive(Deserialize)]
struct RawReview {
    #[serde(default)]
    id: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    created_at: String,
}

impl TmdbClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| {
                crate::error::AppError::InternalError(format!("Failed to create HTTP client: {}", e))
            })?;
        Ok(Self {
            client,
            api_key: config.tmdb_api_key.clone(),
            base_url: config.tmdb_base_url.clone(),
            language: config.language.clone(),
        })
    }

    /// One page of the top-rated list. Rank is the absolute position in the
    /// ranked list, so `(page - 1) * 20 + index + 1`.
    pub async fn top_rated(&self, page: usize) -> Result<Vec<CatalogItem>> {
        let url = format!("{}/movie/top_rated", self.base_url);
        let response: ListResponse = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("page", &page.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!("Fetched top-rated page {} ({} entries)", page, response.results.len());
        Ok(response
            .results
            .into_iter()
            .enumerate()
            .map(|(index, raw)| CatalogItem {
                id: raw.id,
                title: raw.title,
                original_title: raw.original_title,
                overview: raw.overview,
                release_date: raw.release_date,
                vote_average: raw.vote_average,
                vote_count: raw.vote_count,
                popularity: raw.popularity,
                rank: list_rank(page, index),
            })
            .collect())
    }

    /// Detail record with credits and keywords in one round trip.
    pub async fn movie_details(&self, movie_id: u64) -> Result<ItemDetail> {
        let url = format!("{}/movie/{}", self.base_url, movie_id);
        let raw: RawDetails = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", self.language.as_str()),
                ("append_to_response", "credits,keywords"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let director = raw
            .credits
            .crew
            .iter()
            .find(|person| person.job == "Director")
            .map(|person| person.name.clone())
            .unwrap_or_default();
        let cast = raw
            .credits
            .cast
            .iter()
            .take(5)
            .map(|person| person.name.clone())
            .collect();

        Ok(ItemDetail {
            genres: raw.genres.into_iter().map(|g| g.name).collect(),
            runtime: raw.runtime,
            budget: raw.budget,
            revenue: raw.revenue,
            director,
            cast,
            keywords: raw.keywords.keywords.into_iter().map(|k| k.name).collect(),
            tagline: raw.tagline,
            status: raw.status,
            imdb_id: raw.imdb_id.unwrap_or_default(),
            production_companies: raw
                .production_companies
                .into_iter()
                .map(|c| c.name)
                .collect(),
            production_countries: raw
                .production_countries
                .into_iter()
                .map(|c| c.name)
                .collect(),
        })
    }

    /// First page of English reviews, capped at `max_reviews`, with keyword
    /// sentiment attached.
    pub async fn movie_reviews(&self, movie_id: u64, max_reviews: usize) -> Result<Vec<Review>> {
        let url = format!("{}/movie/{}/reviews", self.base_url, movie_id);
        let response: ReviewsResponse = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("language", "en-US"),
                ("page", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .results
            .into_iter()
            .take(max_reviews)
            .map(|raw| {
                let (sentiment, sentiment_score) = analyze_sentiment(&raw.content);
                Review {
                    author: if raw.author.is_empty() {
                        "Anonymous".to_string()
                    } else {
                        raw.author
                    },
                    content: raw.content,
                    created_at: raw.created_at,
                    sentiment,
                    sentiment_score,
                    url: format!("https://www.themoviedb.org/review/{}", raw.id),
                    source: "tmdb".to_string(),
                }
            })
            .collect())
    }
}

fn list_rank(page: usize, index: usize) -> usize {
    (page - 1) * PAGE_SIZE + index + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rank_is_absolute_list_position() {
        assert_eq!(list_rank(1, 0), 1);
        assert_eq!(list_rank(1, 19), 20);
        assert_eq!(list_rank(2, 0), 21);
        assert_eq!(list_rank(13, 9), 250);
    }

    #[test]
    fn details_response_parses_credits_and_keywords() {
        let json = r#"{
            "genres": [{"name": "Drama"}],
            "runtime": 142,
            "tagline": "Fear can hold you prisoner. Hope can set you free.",
            "imdb_id": "tt0111161",
            "credits": {
                "crew": [
                    {"job": "Producer", "name": "Niki Marvin"},
                    {"job": "Director", "name": "Frank Darabont"}
                ],
                "cast": [{"name": "Tim Robbins"}, {"name": "Morgan Freeman"}]
            },
            "keywords": {"keywords": [{"name": "prison"}, {"name": "friendship"}]}
        }"#;
        let raw: RawDetails = serde_json::from_str(json).unwrap();
        let director = raw
            .credits
            .crew
            .iter()
            .find(|p| p.job == "Director")
            .map(|p| p.name.clone());
        assert_eq!(director.as_deref(), Some("Frank Darabont"));
        assert_eq!(raw.keywords.keywords.len(), 2);
        assert_eq!(raw.genres[0].name, "Drama");
    }

    #[test]
    fn details_with_null_imdb_id_still_parse() {
        let raw: RawDetails = serde_json::from_str(r#"{"imdb_id": null}"#).unwrap();
        assert_eq!(raw.imdb_id, None);
    }
}
