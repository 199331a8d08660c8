//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::models::{Record, RecordId, SearchQuery};
use crate::sources::{extract_records, Source, SourceError};

/// A mock source for testing that returns predefined responses.
///
/// Extraction runs the real PubMed extractor over the configured fetch body.
#[derive(Debug, Default)]
pub struct MockSource {
    ids: Mutex<Vec<RecordId>>,
    fetch_body: Mutex<String>,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MockSource {
    /// Create a new mock source with no results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the identifiers returned by `search_ids`.
    pub fn set_ids<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<RecordId>,
    {
        let mut guard = self.ids.lock().unwrap();
        *guard = ids.into_iter().map(Into::into).collect();
    }

    /// Set the body returned by `fetch_raw`.
    pub fn set_fetch_body(&self, body: impl Into<String>) {
        let mut guard = self.fetch_body.lock().unwrap();
        *guard = body.into();
    }

    /// Number of `search_ids` calls so far
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of `fetch_raw` calls so far
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search_ids(
        &self,
        _query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<RecordId>, SourceError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        let guard = self.ids.lock().unwrap();
        Ok(guard.iter().take(max_results).cloned().collect())
    }

    async fn fetch_raw(&self, _ids: &[RecordId]) -> Result<String, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let guard = self.fetch_body.lock().unwrap();
        Ok(guard.clone())
    }

    fn extract(&self, raw: &str) -> Result<Vec<Record>, SourceError> {
        extract_records(raw)
    }
}

/// Helper to build an efetch-style article block for tests.
pub fn make_article(pmid: &str, title: &str) -> String {
    format!(
        "<PubmedArticle><MedlineCitation><PMID Version=\"1\">{}</PMID>\
         <Article><ArticleTitle>{}</ArticleTitle></Article></MedlineCitation></PubmedArticle>",
        pmid, title
    )
}
