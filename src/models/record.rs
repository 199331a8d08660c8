//! Article records extracted from PubMed responses.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical landing page prefix for a PubMed article
pub const PUBMED_ARTICLE_BASE_URL: &str = "https://pubmed.ncbi.nlm.nih.gov/";

/// Opaque PubMed identifier (PMID) as returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    /// Wrap a raw identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier text
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single publication: identifier plus whitespace-normalized title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
}

impl Record {
    /// Build a record, normalizing the raw title text.
    ///
    /// Newlines become spaces and surrounding whitespace is trimmed; the
    /// identifier is trimmed as well.
    pub fn new(id: impl AsRef<str>, raw_title: impl AsRef<str>) -> Self {
        Self {
            id: RecordId::new(id.as_ref().trim()),
            title: normalize_title(raw_title.as_ref()),
        }
    }

    /// Landing page URL of this article
    pub fn url(&self) -> String {
        format!("{}{}/", PUBMED_ARTICLE_BASE_URL, self.id)
    }
}

/// Replace embedded newlines with spaces and trim the result
pub fn normalize_title(raw: &str) -> String {
    raw.replace('\n', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_normalizes_title() {
        let record = Record::new(" 222 ", "\n  Beta\nReview  \n");
        assert_eq!(record.id.as_str(), "222");
        assert_eq!(record.title, "Beta Review");
        assert!(!record.title.contains('\n'));
    }

    #[test]
    fn test_normalize_title_keeps_inner_spacing() {
        // Only newlines are replaced; runs of spaces are kept as they are.
        assert_eq!(normalize_title("A\n\nB"), "A  B");
        assert_eq!(normalize_title("\tTabbed title\t"), "Tabbed title");
    }

    #[test]
    fn test_record_url() {
        let record = Record::new("111", "Alpha Trial");
        assert_eq!(record.url(), "https://pubmed.ncbi.nlm.nih.gov/111/");
    }

    #[test]
    fn test_record_id_serializes_as_string() {
        let id = RecordId::from("40123456");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"40123456\"");
        let back: RecordId = serde_json::from_str("\"40123456\"").unwrap();
        assert_eq!(back, id);
    }
}
