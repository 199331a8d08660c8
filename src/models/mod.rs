//! Core data models for the digest pipeline.

mod record;
mod search;

pub use record::{normalize_title, Record, RecordId, PUBMED_ARTICLE_BASE_URL};
pub use search::{SearchQuery, SortBy};
