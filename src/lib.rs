pub mod cli;
pub mod config;
pub mod emotion;
pub mod error;
pub mod ml;
pub mod models;
pub mod recommender;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
