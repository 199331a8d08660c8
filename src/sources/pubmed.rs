//! PubMed research source implementation using E-utilities API.

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use std::sync::Arc;

use crate::config::PubMedConfig;
use crate::models::{Record, RecordId, SearchQuery};
use crate::sources::{Source, SourceError};
use crate::utils::HttpClient;

/// PubMed research source
///
/// Uses NCBI E-utilities: `esearch` (JSON) for identifiers, `efetch` (XML)
/// for the records themselves.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: Arc<HttpClient>,
    esearch_url: String,
    efetch_url: String,
    api_key: Option<String>,
}

impl PubMedSource {
    /// Create from the `[pubmed]` configuration section and a shared client
    pub fn from_config(config: &PubMedConfig, client: Arc<HttpClient>) -> Self {
        Self {
            client,
            esearch_url: config.esearch_url.clone(),
            efetch_url: config.efetch_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Build E-utilities search URL
    fn build_search_url(&self, query: &SearchQuery, max_results: usize) -> String {
        let params = vec![
            ("db", "pubmed".to_string()),
            ("term", query.term()),
            ("retmode", "json".to_string()),
            ("retmax", max_results.to_string()),
            ("sort", query.sort_by.as_param().to_string()),
        ];
        format!("{}?{}", self.esearch_url, self.encode_params(params))
    }

    /// Build E-utilities fetch URL for specific PubMed IDs
    fn build_fetch_url(&self, ids: &[RecordId]) -> String {
        let joined = ids
            .iter()
            .map(RecordId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let params = vec![
            ("db", "pubmed".to_string()),
            ("id", joined),
            ("retmode", "xml".to_string()),
        ];
        format!("{}?{}", self.efetch_url, self.encode_params(params))
    }

    fn encode_params(&self, mut params: Vec<(&str, String)>) -> String {
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }

        params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Parse E-utilities search response JSON
    fn parse_search_response(json: &str) -> Result<Vec<RecordId>, SourceError> {
        #[derive(Debug, Deserialize)]
        struct ESearchResponse {
            esearchresult: ESearchResult,
        }

        #[derive(Debug, Deserialize)]
        struct ESearchResult {
            #[serde(default)]
            idlist: Vec<String>,
            #[serde(rename = "ERROR", default)]
            error: Option<String>,
        }

        let response: ESearchResponse = serde_json::from_str(json).map_err(|e| {
            SourceError::Parse(format!("Failed to parse PubMed search JSON: {}", e))
        })?;

        if let Some(error) = &response.esearchresult.error {
            tracing::warn!("PubMed search reported an error: {}", error);
        }

        Ok(response
            .esearchresult
            .idlist
            .into_iter()
            .map(RecordId::from)
            .collect())
    }

    async fn get_text(&self, url: &str, action: &str) -> Result<String, SourceError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            SourceError::Network(format!("Failed to {}: {}", action, e.without_url()))
        })?;

        if !response.status().is_success() {
            return Err(SourceError::Api(format!(
                "PubMed API returned status: {}",
                response.status()
            )));
        }

        response.text().await.map_err(|e| {
            SourceError::Network(format!("Failed to read response: {}", e.without_url()))
        })
    }
}

#[async_trait]
impl Source for PubMedSource {
    fn name(&self) -> &str {
        "PubMed"
    }

    async fn search_ids(
        &self,
        query: &SearchQuery,
        max_results: usize,
    ) -> Result<Vec<RecordId>, SourceError> {
        tracing::debug!(term = %query.term(), max_results, "Searching PubMed");

        let url = self.build_search_url(query, max_results);
        let body = self.get_text(&url, "search PubMed").await?;
        Self::parse_search_response(&body)
    }

    async fn fetch_raw(&self, ids: &[RecordId]) -> Result<String, SourceError> {
        if ids.is_empty() {
            return Ok(String::new());
        }

        tracing::debug!(count = ids.len(), "Fetching PubMed records");

        let url = self.build_fetch_url(ids);
        self.get_text(&url, "fetch PubMed details").await
    }

    fn extract(&self, raw: &str) -> Result<Vec<Record>, SourceError> {
        extract_records(raw)
    }
}

#[derive(Debug, Clone, Copy)]
enum Field {
    Pmid,
    Title,
}

/// Text collected for one field, including text of nested inline markup
struct Capture {
    field: Field,
    depth: usize,
    text: String,
}

#[derive(Debug, Default)]
struct ArticleFields {
    pmid: Option<String>,
    title: Option<String>,
}

impl ArticleFields {
    fn wants(&self, field: Field) -> bool {
        match field {
            Field::Pmid => self.pmid.is_none(),
            Field::Title => self.title.is_none(),
        }
    }

    fn set(&mut self, field: Field, text: String) {
        match field {
            Field::Pmid => self.pmid = Some(text),
            Field::Title => self.title = Some(text),
        }
    }
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"PMID" => Some(Field::Pmid),
        b"ArticleTitle" => Some(Field::Title),
        _ => None,
    }
}

/// Extract `(PMID, title)` records from an efetch XML response.
///
/// Every `<PubmedArticle>` yields one record built from its first `<PMID>`
/// and first `<ArticleTitle>` element. Articles missing either element are
/// skipped. Titles have newlines replaced by spaces and are trimmed.
pub fn extract_records(xml: &str) -> Result<Vec<Record>, SourceError> {
    let mut reader = Reader::from_str(xml);
    let mut records = Vec::new();
    let mut article: Option<ArticleFields> = None;
    let mut capture: Option<Capture> = None;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(SourceError::Parse(format!(
                    "Failed to parse PubMed fetch XML at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        };

        match event {
            Event::Start(e) => {
                if let Some(cap) = capture.as_mut() {
                    cap.depth += 1;
                    continue;
                }

                let name = e.local_name();
                if name.as_ref() == b"PubmedArticle" {
                    article = Some(ArticleFields::default());
                } else if let (Some(fields), Some(field)) =
                    (article.as_ref(), field_for(name.as_ref()))
                {
                    if fields.wants(field) {
                        capture = Some(Capture {
                            field,
                            depth: 0,
                            text: String::new(),
                        });
                    }
                }
            }
            Event::Empty(e) => {
                if capture.is_some() {
                    continue;
                }
                if let (Some(fields), Some(field)) =
                    (article.as_mut(), field_for(e.local_name().as_ref()))
                {
                    if fields.wants(field) {
                        fields.set(field, String::new());
                    }
                }
            }
            Event::Text(t) => {
                if let Some(cap) = capture.as_mut() {
                    match t.unescape() {
                        Ok(text) => cap.text.push_str(&text),
                        // Unknown entities are kept verbatim
                        Err(_) => cap.text.push_str(&String::from_utf8_lossy(&t)),
                    }
                }
            }
            Event::CData(c) => {
                if let Some(cap) = capture.as_mut() {
                    cap.text.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Event::End(e) => {
                if let Some(cap) = capture.as_mut() {
                    if cap.depth > 0 {
                        cap.depth -= 1;
                        continue;
                    }
                    if let (Some(cap), Some(fields)) = (capture.take(), article.as_mut()) {
                        fields.set(cap.field, cap.text);
                    }
                    continue;
                }

                if e.local_name().as_ref() == b"PubmedArticle" {
                    match article.take() {
                        Some(ArticleFields {
                            pmid: Some(pmid),
                            title: Some(title),
                        }) => records.push(Record::new(pmid, title)),
                        Some(fields) => {
                            tracing::debug!(
                                pmid = ?fields.pmid,
                                "Skipping PubMed article without PMID or ArticleTitle"
                            );
                        }
                        None => {}
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(records)
}
