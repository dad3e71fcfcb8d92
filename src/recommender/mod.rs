pub mod index;
pub mod query;
pub mod sample;
pub mod search;

pub use index::{MovieIndex, SearchIndex};
pub use query::{extract_emotions_from_query, parse_emotion_vector};
pub use search::{MoodRecommender, SearchHit};
