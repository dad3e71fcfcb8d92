use crate::recommender::{MoodRecommender, SearchHit};
use console::style;
use std::io::{self, Write};

const SCORE_BAR_WIDTH: usize = 20;
const PLOT_PREVIEW_CHARS: usize = 120;

pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", style(label).bold());
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn prompt_with_default(label: &str, default: &str) -> io::Result<String> {
    let answer = prompt(&format!("{} [{}]", label, default))?;
    if answer.is_empty() {
        Ok(default.to_string())
    } else {
        Ok(answer)
    }
}

pub fn prompt_usize(label: &str, default: usize) -> io::Result<usize> {
    let answer = prompt(&format!("{} [{}]", label, default))?;
    Ok(answer.parse().unwrap_or(default))
}

pub fn prompt_f64(label: &str, default: f64) -> io::Result<f64> {
    let answer = prompt(&format!("{} [{}]", label, default))?;
    Ok(answer.parse().unwrap_or(default))
}

/// Scale a pair of search weights so they sum to 1. Non-positive sums get the
/// standard 0.7/0.3 split.
pub fn normalize_weights(semantic: f64, emotion: f64) -> (f64, f64) {
    let sum = semantic + emotion;
    if sum <= 0.0 {
        return (0.7, 0.3);
    }
    if (sum - 1.0).abs() < 1e-9 {
        return (semantic, emotion);
    }
    (semantic / sum, emotion / sum)
}

fn score_bar(score: f64) -> String {
    let filled = (score.clamp(0.0, 1.0) * SCORE_BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(SCORE_BAR_WIDTH - filled))
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

pub fn print_results(recommender: &MoodRecommender, heading: &str, hits: &[SearchHit]) {
    if hits.is_empty() {
        println!("\n{}", style("No results.").yellow());
        return;
    }

    println!("\n{} ({} results)", style(heading).cyan().bold(), hits.len());
    for (position, hit) in hits.iter().enumerate() {
        let record = recommender.record(hit);
        let year = if record.release_year.is_empty() {
            String::new()
        } else {
            format!(" ({})", record.release_year)
        };
        println!("\n{}. {}{}", position + 1, style(&record.title).bold(), year);
        println!(
            "   {} {:.3}  [semantic {:.3} | emotion {:.3}]",
            score_bar(hit.score),
            hit.score,
            hit.semantic_score,
            hit.emotion_score
        );
        if !record.genres.is_empty() {
            println!("   Genres: {}", record.genres.join(", "));
        }
        if !record.mood_tags.is_empty() {
            println!("   Mood tags: {}", record.mood_tags.join(", "));
        }
        if !record.dominant_emotions.is_empty() {
            let emotions: Vec<&str> = record
                .dominant_emotions
                .iter()
                .map(|e| e.as_str())
                .collect();
            println!("   Dominant emotions: {}", emotions.join(", "));
        }
        let top: Vec<String> = record
            .emotion_profile
            .ranked()
            .into_iter()
            .take(3)
            .filter(|(_, score)| *score > 0.0)
            .map(|(emotion, score)| format!("{} {:.3}", emotion, score))
            .collect();
        if !top.is_empty() {
            println!("   Top emotions: {}", top.join(", "));
        }
        if !record.overview.is_empty() {
            println!("   {}", truncate_chars(&record.overview, PLOT_PREVIEW_CHARS));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_renormalize_when_sum_differs_from_one() {
        let (sw, ew) = normalize_weights(0.6, 0.6);
        assert!((sw - 0.5).abs() < 1e-9);
        assert!((ew - 0.5).abs() < 1e-9);
        assert!((sw + ew - 1.0).abs() < 1e-9);
    }

    #[test]
    fn unit_sum_weights_pass_through() {
        assert_eq!(normalize_weights(0.7, 0.3), (0.7, 0.3));
    }

    #[test]
    fn degenerate_weights_get_the_default_split() {
        assert_eq!(normalize_weights(0.0, 0.0), (0.7, 0.3));
        assert_eq!(normalize_weights(-1.0, 0.5), (0.7, 0.3));
    }

    #[test]
    fn score_bar_width_is_fixed() {
        assert_eq!(score_bar(0.0).chars().count(), SCORE_BAR_WIDTH);
        assert_eq!(score_bar(1.0).chars().count(), SCORE_BAR_WIDTH);
        assert_eq!(score_bar(2.5).chars().count(), SCORE_BAR_WIDTH);
    }

    #[test]
    fn plot_preview_truncates_on_char_boundaries() {
        let text = "电影".repeat(100);
        let preview = truncate_chars(&text, 10);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), 13);
        assert_eq!(truncate_chars("short", 10), "short");
    }
}
