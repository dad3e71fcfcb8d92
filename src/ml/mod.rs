pub mod embedder;

pub use embedder::HuggingFaceEmbedder;
