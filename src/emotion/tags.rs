use crate::emotion::{Emotion, EmotionProfile};

const MAX_TAGS: usize = 6;
const STRONG_THRESHOLD: f64 = 0.15;
const MODERATE_THRESHOLD: f64 = 0.05;

const GENERIC_TAGS: [&str; 3] = ["emotionally-rich", "thought-provoking", "worth-watching"];

/// Derive human-readable mood tags from a normalized emotion profile.
/// At most 6 tags, deduplicated, in derivation order.
pub fn mood_tags(profile: &EmotionProfile) -> Vec<String> {
    if profile.is_empty() {
        return GENERIC_TAGS.iter().map(|t| t.to_string()).collect();
    }

    let mut tags: Vec<String> = Vec::new();
    let mut push = |tags: &mut Vec<String>, tag: String| {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    for (emotion, score) in profile.iter() {
        if score >= STRONG_THRESHOLD {
            push(&mut tags, format!("very-{}", emotion));
        } else if score >= MODERATE_THRESHOLD {
            push(&mut tags, format!("somewhat-{}", emotion));
        }
    }

    // Combination rules on emotion pairs and standout single categories.
    if profile.get(Emotion::Joy) > 0.1 && profile.get(Emotion::Love) > 0.1 {
        push(&mut tags, "heartwarming".to_string());
    }
    if profile.get(Emotion::Sadness) > 0.1 && profile.get(Emotion::Hope) > 0.05 {
        push(&mut tags, "sad-but-hopeful".to_string());
    }
    if profile.get(Emotion::Fear) > 0.15 {
        push(&mut tags, "edge-of-seat".to_string());
    }
    if profile.get(Emotion::Peace) > 0.1 {
        push(&mut tags, "calming".to_string());
    }
    if profile.get(Emotion::Inspiration) > 0.1 {
        push(&mut tags, "uplifting".to_string());
    }

    if tags.len() < 2 {
        if let Some((top, _)) = profile.ranked().into_iter().next() {
            let generics = match top {
                Emotion::Joy | Emotion::Love => ["emotionally-rich", "crowd-pleaser"],
                Emotion::Sadness | Emotion::Fear | Emotion::Tension => {
                    ["thought-provoking", "intense"]
                }
                _ => ["heartfelt", "worth-watching"],
            };
            for tag in generics {
                push(&mut tags, tag.to_string());
            }
        }
    }

    tags.truncate(MAX_TAGS);
    tags
}
