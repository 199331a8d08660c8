//! Literature sources.
//!
//! A [`Source`] covers the first half of the digest pipeline: search for
//! record identifiers, fetch the raw records, and extract `(id, title)` pairs
//! from them. [`PubMedSource`] talks to NCBI E-utilities; [`MockSource`]
//! serves canned responses in tests.

pub mod mock;
mod pubmed;

pub use mock::MockSource;
pub use pubmed::{extract_records, PubMedSource};

use crate::models::{Record, RecordId, SearchQuery};
use async_trait::async_trait;

/// The Source trait defines the interface of a literature search backend.
#[async_trait]
pub trait Source: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search for up to `max_results` identifiers, in the order returned
    async fn search_ids(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<RecordId>, SourceError>;

    /// Fetch the raw record markup for `ids`.
    ///
    /// Returns an empty string without touching the network when `ids` is
    /// empty.
    async fn fetch_raw(&self, ids: &[RecordId]) -> Result<String, SourceError>;

    /// Extract records from a raw fetch response
    fn extract(&self, raw: &str) -> Result<Vec<Record>, SourceError>;
}

/// Errors that can occur when interacting with a source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network, connection or timeout error
    #[error("Network error: {0}")]
    Network(String),

    /// Parsing error (XML, JSON)
    #[error("Parse error: {0}")]
    Parse(String),

    /// API error from the source (non-success status)
    #[error("API error: {0}")]
    Api(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        SourceError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(format!("JSON: {}", err))
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}
