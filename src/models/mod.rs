pub use movie::{CatalogItem, ItemDetail, MergedRecord, Review};

mod movie;
