use anyhow::Context;
use cinemood::cli;
use cinemood::ml::HuggingFaceEmbedder;
use cinemood::recommender::{parse_emotion_vector, MoodRecommender, MovieIndex};
use console::style;
use log::{info, warn};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cinemood=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("{}", style("Mood-based movie recommender").bold().cyan());

    let default_dir =
        std::env::var("APP_OUTPUT_DIR").unwrap_or_else(|_| "top_rated_movies".to_string());
    let corpus_default = find_latest_corpus(Path::new(&default_dir))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| format!("{}/top_rated_movie_emotions.json", default_dir));
    let corpus_path = cli::prompt_with_default("Corpus path (.json or enhanced .csv)", &corpus_default)?;

    let index = MovieIndex::load(Path::new(&corpus_path));
    info!("Corpus ready: {} titles", index.len());

    let embedder = HuggingFaceEmbedder::new().context("Embedding provider setup failed")?;
    println!("Building search index ({} titles)...", index.len());
    let search_index = index
        .build(&embedder)
        .await
        .context("Failed to build the search index")?;
    let recommender = MoodRecommender::new(search_index, embedder);

    loop {
        println!();
        println!("1. Semantic search");
        println!("2. Emotion search");
        println!("3. Hybrid search");
        println!("4. Mood recommendation");
        println!("q. Quit");

        let choice = cli::prompt("Choose a mode")?;
        match choice.as_str() {
            "1" => semantic_mode(&recommender).await?,
            "2" => emotion_mode(&recommender)?,
            "3" => hybrid_mode(&recommender).await?,
            "4" => mood_mode(&recommender).await?,
            "q" | "quit" | "exit" => break,
            "" => continue,
            other => println!("Unknown choice '{}'", other),
        }
    }

    println!("Bye.");
    Ok(())
}

async fn semantic_mode(recommender: &MoodRecommender) -> anyhow::Result<()> {
    let query = cli::prompt("Describe the movie you want")?;
    if query.is_empty() {
        return Ok(());
    }
    let top_k = cli::prompt_usize("How many results", 5)?;
    match recommender.semantic_search(&query, top_k).await {
        Ok(hits) => cli::print_results(recommender, &format!("Semantic: {}", query), &hits),
        Err(e) => warn!("Semantic search failed: {}", e),
    }
    Ok(())
}

fn emotion_mode(recommender: &MoodRecommender) -> anyhow::Result<()> {
    let target = match prompt_emotion_vector()? {
        Some(target) => target,
        None => return Ok(()),
    };
    let top_k = cli::prompt_usize("How many results", 5)?;
    let hits = recommender.emotion_search(&target, top_k);
    cli::print_results(recommender, "Emotion match", &hits);
    Ok(())
}

async fn hybrid_mode(recommender: &MoodRecommender) -> anyhow::Result<()> {
    let query = cli::prompt("Describe the movie you want")?;
    if query.is_empty() {
        return Ok(());
    }
    println!("Optional target emotions (leave empty to infer from the query).");
    let target = prompt_emotion_vector()?;

    let semantic_weight = cli::prompt_f64("Semantic weight", 0.7)?;
    let emotion_weight = cli::prompt_f64("Emotion weight", 0.3)?;
    let (semantic_weight, emotion_weight) = cli::normalize_weights(semantic_weight, emotion_weight);
    let top_k = cli::prompt_usize("How many results", 5)?;

    match recommender
        .hybrid_search(&query, target.as_ref(), semantic_weight, emotion_weight, top_k)
        .await
    {
        Ok(hits) => cli::print_results(recommender, &format!("Hybrid: {}", query), &hits),
        Err(e) => warn!("Hybrid search failed: {}", e),
    }
    Ok(())
}

async fn mood_mode(recommender: &MoodRecommender) -> anyhow::Result<()> {
    let mood = cli::prompt("How are you feeling")?;
    if mood.is_empty() {
        return Ok(());
    }
    let top_k = cli::prompt_usize("How many results", 5)?;
    match recommender.recommend_by_mood(&mood, top_k).await {
        Ok(hits) => cli::print_results(recommender, &format!("Mood: {}", mood), &hits),
        Err(e) => warn!("Mood recommendation failed: {}", e),
    }
    Ok(())
}

/// Ask for a `label:intensity, ...` vector until it parses. An empty line
/// means "no target".
fn prompt_emotion_vector() -> anyhow::Result<Option<BTreeMap<String, f64>>> {
    loop {
        let raw = cli::prompt("Emotion vector (e.g. joy:0.8, hope:0.2)")?;
        if raw.is_empty() {
            return Ok(None);
        }
        match parse_emotion_vector(&raw) {
            Ok(target) => return Ok(Some(target)),
            Err(e) => {
                warn!("{}", e);
                println!("Could not parse that vector, try again (empty line to cancel).");
            }
        }
    }
}

/// Newest corpus export in `dir`; timestamped names sort chronologically.
fn find_latest_corpus(dir: &Path) -> Option<PathBuf> {
    let mut corpora: Vec<PathBuf> = fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| {
                    name.starts_with("top_rated_movie_emotions") && name.ends_with(".json")
                })
                .unwrap_or(false)
        })
        .collect();
    corpora.sort();
    corpora.pop()
}
