pub mod catalog;
pub mod exporter;
pub mod tmdb;

pub use catalog::CatalogBuilder;
pub use exporter::{ExportPaths, Exporter};
pub use tmdb::TmdbClient;
