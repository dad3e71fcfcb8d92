use crate::error::{AppError, Result};
use std::env;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_OUTPUT_DIR: &str = "top_rated_movies";
const DEFAULT_PAGE_DELAY_MS: u64 = 500;
const DEFAULT_DETAIL_DELAY_MS: u64 = 300;
const DEFAULT_MOVIE_DELAY_MS: u64 = 500;

/// Runtime configuration, read once from the environment (`.env` supported).
#[derive(Debug, Clone)]
pub struct Config {
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub language: String,
    pub output_dir: PathBuf,
    /// Fixed polite delay between ranked-list page requests.
    pub page_delay_ms: u64,
    /// Fixed polite delay after each detail / review request.
    pub detail_delay_ms: u64,
    /// Fixed polite delay between fully-processed movies.
    pub movie_delay_ms: u64,
    /// Optional external genre→emotion lookup table (embedded default otherwise).
    pub genre_table_path: Option<PathBuf>,
    /// Optional external known-title override table.
    pub title_overrides_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let tmdb_api_key = env::var("TMDB_API_KEY").map_err(|_| {
            AppError::InvalidInput("Missing TMDB_API_KEY environment variable".to_string())
        })?;
        if tmdb_api_key.trim().is_empty() {
            return Err(AppError::InvalidInput("TMDB_API_KEY is empty".to_string()));
        }

        let config = Self {
            tmdb_api_key,
            tmdb_base_url: env::var("TMDB_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_TMDB_BASE_URL.to_string()),
            language: env::var("TMDB_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string()),
            output_dir: env::var("APP_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            page_delay_ms: env_u64("APP_PAGE_DELAY_MS", DEFAULT_PAGE_DELAY_MS),
            detail_delay_ms: env_u64("APP_DETAIL_DELAY_MS", DEFAULT_DETAIL_DELAY_MS),
            movie_delay_ms: env_u64("APP_MOVIE_DELAY_MS", DEFAULT_MOVIE_DELAY_MS),
            genre_table_path: env::var("APP_GENRE_TABLE_PATH").ok().map(PathBuf::from),
            title_overrides_path: env::var("APP_TITLE_OVERRIDES_PATH").ok().map(PathBuf::from),
        };
        debug!(
            "Config loaded: base_url={}, language={}, output_dir={}",
            config.tmdb_base_url,
            config.language,
            config.output_dir.display()
        );
        Ok(config)
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_u64_falls_back_on_garbage() {
        env::set_var("TEST_DELAY_MS_GARBAGE", "not-a-number");
        assert_eq!(env_u64("TEST_DELAY_MS_GARBAGE", 500), 500);
        env::remove_var("TEST_DELAY_MS_GARBAGE");
    }

    #[test]
    fn env_u64_parses_valid_values() {
        env::set_var("TEST_DELAY_MS_VALID", "250");
        assert_eq!(env_u64("TEST_DELAY_MS_VALID", 500), 250);
        env::remove_var("TEST_DELAY_MS_VALID");
    }
}
