//! Search query model and PubMed term rendering.

use serde::{Deserialize, Serialize};

/// Sort field understood by the E-utilities search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    /// Most recent publication date first
    #[default]
    PubDate,
    /// Best match
    Relevance,
}

impl SortBy {
    /// Value of the `sort` request parameter
    pub fn as_param(&self) -> &'static str {
        match self {
            SortBy::PubDate => "pub date",
            SortBy::Relevance => "relevance",
        }
    }
}

/// Search query parameters
///
/// Clauses are combined with `AND`; terms inside the topic and publication
/// type clauses are combined with `OR`. Empty clauses are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Topic terms, already quoted when they are phrases
    pub topic_terms: Vec<String>,

    /// Publication type tags (e.g. "systematic review")
    pub publication_types: Vec<String>,

    /// MeSH species filter (e.g. "humans")
    pub species: Option<String>,

    /// Restrict to publications from the last N days
    pub recency_days: Option<u32>,

    /// Sort order requested from the search endpoint
    pub sort_by: SortBy,
}

impl SearchQuery {
    /// Create an empty query
    pub fn new() -> Self {
        Self::default()
    }

    /// The weekly digest query: TMD / splint therapy RCTs, systematic reviews
    /// and meta-analyses in humans, published in the last 7 days.
    pub fn tmd_splint_weekly() -> Self {
        Self::new()
            .topic("temporomandibular disorders")
            .topic("TMJ")
            .topic("temporomandibular joint")
            .topic_phrase("splint therapy")
            .topic_phrase("stabilization splint")
            .topic_phrase("Michigan splint")
            .topic("occlusal splint")
            .publication_type("randomized controlled trial")
            .publication_type("systematic review")
            .publication_type("meta-analysis")
            .species("humans")
            .recency_days(7)
    }

    /// Add an unquoted topic term matched against title/abstract
    pub fn topic(mut self, term: impl Into<String>) -> Self {
        self.topic_terms.push(term.into());
        self
    }

    /// Add a quoted topic phrase matched against title/abstract
    pub fn topic_phrase(mut self, phrase: impl AsRef<str>) -> Self {
        self.topic_terms.push(format!("\"{}\"", phrase.as_ref()));
        self
    }

    /// Add a publication type tag
    pub fn publication_type(mut self, kind: impl Into<String>) -> Self {
        self.publication_types.push(kind.into());
        self
    }

    /// Set species filter
    pub fn species(mut self, species: impl Into<String>) -> Self {
        self.species = Some(species.into());
        self
    }

    /// Set recency window in days
    pub fn recency_days(mut self, days: u32) -> Self {
        self.recency_days = Some(days);
        self
    }

    /// Set sort order
    pub fn sort_by(mut self, sort: SortBy) -> Self {
        self.sort_by = sort;
        self
    }

    /// Render the query as a PubMed search term
    pub fn term(&self) -> String {
        let mut clauses = Vec::new();

        if !self.topic_terms.is_empty() {
            let topic = self
                .topic_terms
                .iter()
                .map(|t| format!("{}[Title/Abstract]", t))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("(({}))", topic));
        }

        if !self.publication_types.is_empty() {
            let types = self
                .publication_types
                .iter()
                .map(|t| format!("(\"{}\"[Publication Type])", t))
                .collect::<Vec<_>>()
                .join(" OR ");
            clauses.push(format!("({})", types));
        }

        if let Some(species) = &self.species {
            clauses.push(format!("({}[MeSH Terms])", species));
        }

        if let Some(days) = self.recency_days {
            clauses.push(format!("(\"last {} days\"[PDat])", days));
        }

        clauses.join(" AND ")
    }
}
