use anyhow::Context;
use cinemood::cli;
use cinemood::config::Config;
use cinemood::services::{CatalogBuilder, Exporter};
use console::style;
use log::info;
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

    println!("{}", style("Top-rated movie corpus builder").bold().cyan());
    println!("Fetches the ranked catalog, scores emotions and exports the corpus files.");
    println!();

    let config = Config::from_env().context("Configuration error")?;

    let count = cli::prompt_usize("How many titles to fetch", 250)?;
    let max_reviews = cli::prompt_usize("Reviews per title", 5)?;
    let out_dir =
        cli::prompt_with_default("Output directory", &config.output_dir.display().to_string())?;

    let confirm = cli::prompt_with_default("Start the crawl? (y/n)", "y")?;
    if !confirm.eq_ignore_ascii_case("y") {
        println!("Aborted.");
        return Ok(());
    }

    let builder = CatalogBuilder::new(&config)?;
    let records = builder
        .crawl(count, max_reviews)
        .await
        .context("Crawl failed")?;
    if records.is_empty() {
        anyhow::bail!("the crawl produced no records, nothing to export");
    }
    info!("Crawled {} records", records.len());

    let exporter = Exporter::new(out_dir);
    let paths = exporter.save_all(&records).context("Export failed")?;

    println!();
    println!("{}", style("Exported files").bold());
    println!("  corpus JSON:     {}", paths.json_corpus.display());
    println!("  basic CSV:       {}", paths.csv_data.display());
    println!("  enhanced CSV:    {}", paths.enhanced_csv.display());
    println!("  reviews JSON:    {}", paths.reviews.display());
    println!("  emotion vectors: {}", paths.emotion_vectors.display());
    println!("  ranking CSV:     {}", paths.ranking.display());
    println!("  statistics:      {}", paths.statistics.display());

    let total_reviews: usize = records.iter().map(|r| r.review_count).sum();
    let avg_rating: f64 =
        records.iter().map(|r| r.vote_average).sum::<f64>() / records.len() as f64;
    println!();
    println!(
        "{} titles, {} reviews, average rating {:.2}/10",
        records.len(),
        total_reviews,
        avg_rating
    );
    Ok(())
}
