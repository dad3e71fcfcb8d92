use crate::emotion::Emotion;
use crate::error::{AppError, Result};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;
use tracing::debug;

/// Mood vocabulary for free-text queries, bilingual like the scoring lexicons.
/// Order follows the category declaration order so extraction is deterministic.
static MOOD_KEYWORDS: Lazy<Vec<(Emotion, Vec<&'static str>)>> = Lazy::new(|| {
    vec![
        (
            Emotion::Anger,
            vec!["angry", "furious", "rage", "愤怒", "生气", "气愤", "怒火", "愤慨", "恼怒", "暴力"],
        ),
        (
            Emotion::Fear,
            vec!["scared", "afraid", "horror", "frightening", "恐惧", "害怕", "恐怖", "惊吓", "惊悚", "恐慌", "可怕"],
        ),
        (
            Emotion::Hope,
            vec!["hopeful", "hope", "optimistic", "希望", "期望", "盼望", "期待", "憧憬", "向往"],
        ),
        (
            Emotion::Inspiration,
            vec!["inspiring", "motivational", "uplifting", "励志", "鼓舞", "激励", "振奋", "奋发", "向上"],
        ),
        (
            Emotion::Joy,
            vec!["happy", "joyful", "cheerful", "funny", "comedy", "humor", "快乐", "开心", "高兴", "愉快", "欢乐", "喜悦", "搞笑", "幽默", "喜剧"],
        ),
        (
            Emotion::Loneliness,
            vec!["lonely", "alone", "isolated", "孤独", "孤单", "寂寞", "孤立", "独处", "疏离"],
        ),
        (
            Emotion::Love,
            vec!["romantic", "romance", "sweet", "touching", "爱", "爱情", "恋爱", "浪漫", "甜蜜", "温馨", "感人", "温暖"],
        ),
        (
            Emotion::Peace,
            vec!["calm", "peaceful", "relaxing", "soothing", "平静", "安宁", "宁静", "祥和", "安逸", "恬静"],
        ),
        (
            Emotion::Sadness,
            vec!["melancholy", "tearjerker", "heartbroken", "悲伤", "难过", "伤心", "忧郁", "哀伤", "悲痛", "悲剧", "伤感"],
        ),
        (
            Emotion::Tension,
            vec!["tense", "thrilling", "suspense", "gripping", "紧张", "刺激", "悬疑", "惊险", "惊心动魄", "扣人心弦"],
        ),
    ]
});

/// Ordered trigger fallbacks for when no vocabulary word matched, each a small
/// fixed target distribution.
static MOOD_TRIGGERS: Lazy<Vec<(Vec<&'static str>, Vec<(Emotion, f64)>)>> = Lazy::new(|| {
    vec![
        (
            vec!["孤独", "寂寞", "无聊", "bored", "by myself"],
            vec![(Emotion::Loneliness, 0.8), (Emotion::Sadness, 0.2)],
        ),
        (
            vec!["开心", "快乐", "高兴", "cheer me up", "feel good"],
            vec![(Emotion::Joy, 0.8), (Emotion::Love, 0.2)],
        ),
        (
            vec!["悲伤", "难过", "伤心", "sad", "cry"],
            vec![(Emotion::Sadness, 0.8), (Emotion::Loneliness, 0.2)],
        ),
        (
            vec!["紧张", "刺激", "惊悚", "thrill", "exciting"],
            vec![(Emotion::Tension, 0.8), (Emotion::Fear, 0.2)],
        ),
        (
            vec!["爱情", "浪漫", "甜蜜", "love story", "date night"],
            vec![(Emotion::Love, 0.8), (Emotion::Joy, 0.2)],
        ),
    ]
});

/// General-purpose distribution returned when nothing in the text matched.
fn default_mood() -> BTreeMap<Emotion, f64> {
    [
        (Emotion::Joy, 0.3),
        (Emotion::Hope, 0.3),
        (Emotion::Inspiration, 0.4),
    ]
    .into_iter()
    .collect()
}

/// Turn a free-text mood description into a target emotion distribution.
/// Vocabulary hits are counted and normalized to weights; without any hit,
/// the trigger fallbacks are tried in order, then the default distribution.
pub fn extract_emotions_from_query(query: &str) -> BTreeMap<Emotion, f64> {
    let lower = query.to_lowercase();

    let mut counts: BTreeMap<Emotion, usize> = BTreeMap::new();
    for (emotion, keywords) in MOOD_KEYWORDS.iter() {
        let hits = keywords.iter().filter(|kw| lower.contains(*kw)).count();
        if hits > 0 {
            counts.insert(*emotion, hits);
        }
    }

    let total: usize = counts.values().sum();
    if total > 0 {
        let extracted: BTreeMap<Emotion, f64> = counts
            .into_iter()
            .map(|(emotion, count)| (emotion, count as f64 / total as f64))
            .collect();
        debug!("Extracted mood target from vocabulary: {:?}", extracted);
        return extracted;
    }

    for (triggers, target) in MOOD_TRIGGERS.iter() {
        if triggers.iter().any(|t| lower.contains(*t)) {
            debug!("Mood trigger fallback matched: {:?}", target);
            return target.iter().copied().collect();
        }
    }

    debug!("No mood signal in query, using default distribution");
    default_mood()
}

/// Parse a user-entered emotion vector such as `joy:0.8, hope:0.2`.
/// Pairs that fail to parse are skipped; an input yielding no valid pair is
/// an error so the prompt loop can ask again. Labels are kept verbatim, the
/// alias table resolves them at search time.
pub fn parse_emotion_vector(input: &str) -> Result<BTreeMap<String, f64>> {
    let pairs = parse_weighted_pairs(input, ',');
    if pairs.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "No emotion:intensity pairs found in '{}'",
            input.trim()
        )));
    }
    Ok(pairs.into_iter().collect())
}

/// Split `label:value` pairs on `separator`, skipping malformed entries.
/// Also used for the `emotion:score|...` column of the enhanced CSV.
pub fn parse_weighted_pairs(input: &str, separator: char) -> Vec<(String, f64)> {
    input
        .split(separator)
        .filter_map(|pair| {
            let (label, value) = pair.split_once(':')?;
            let label = label.trim();
            let value: f64 = value.trim().parse().ok()?;
            if label.is_empty() {
                return None;
            }
            Some((label.to_string(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_hits_are_normalized_to_weights() {
        let target = extract_emotions_from_query("something happy and funny, maybe romantic");
        assert_eq!(target.get(&Emotion::Joy), Some(&(2.0 / 3.0)));
        assert_eq!(target.get(&Emotion::Love), Some(&(1.0 / 3.0)));
    }

    #[test]
    fn chinese_queries_extract_too() {
        let target = extract_emotions_from_query("我想看一部温馨浪漫的电影");
        assert!(target.get(&Emotion::Love).is_some());
    }

    #[test]
    fn trigger_fallback_when_vocabulary_misses() {
        let target = extract_emotions_from_query("stuck home bored tonight");
        assert_eq!(target.get(&Emotion::Loneliness), Some(&0.8));
        assert_eq!(target.get(&Emotion::Sadness), Some(&0.2));
    }

    #[test]
    fn unrecognized_text_gets_default_distribution() {
        let target = extract_emotions_from_query("xyzzy");
        assert_eq!(target, default_mood());
    }

    #[test]
    fn emotion_vector_parses_and_skips_garbage() {
        let target = parse_emotion_vector("joy:0.8, broken, hope:0.2").unwrap();
        assert_eq!(target.len(), 2);
        assert_eq!(target.get("joy"), Some(&0.8));
    }

    #[test]
    fn empty_emotion_vector_is_an_error() {
        assert!(parse_emotion_vector("no colons here").is_err());
        assert!(parse_emotion_vector("").is_err());
    }

    #[test]
    fn pipe_separated_pairs_parse_for_csv_vectors() {
        let pairs = parse_weighted_pairs("hope:0.600|sadness:0.400", '|');
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], ("hope".to_string(), 0.6));
    }
}
