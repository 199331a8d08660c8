//! The weekly digest pipeline.
//!
//! search -> fetch -> extract -> format -> notify, strictly in sequence. An
//! empty search result skips straight to sending [`FALLBACK_MESSAGE`].

use serde::Serialize;
use std::sync::Arc;

use crate::config::{Config, ConfigError, TelegramCredentials};
use crate::models::{Record, SearchQuery};
use crate::notify::{ConsoleNotifier, Notifier, NotifyError, TelegramNotifier};
use crate::sources::{PubMedSource, Source, SourceError};
use crate::utils::HttpClient;

/// First lines of every digest message
pub const DIGEST_HEADER: &str = "🧠 Новые статьи за неделю (ВНЧС / сплинты)\n\n";

/// Sent instead of a digest when the search finds nothing
pub const FALLBACK_MESSAGE: &str =
    "За последние 7 дней новых РКИ/обзоров по теме ВНЧС/сплинтов не найдено.";

/// Summary of a completed run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestOutcome {
    /// Identifiers returned by the search
    pub ids_found: usize,
    /// Records extracted from the fetched markup
    pub records: usize,
    /// Message chunks delivered
    pub chunks_sent: usize,
    /// Whether the "nothing found" message was sent
    pub fallback: bool,
}

/// Errors that abort a digest run
#[derive(Debug, thiserror::Error)]
pub enum DigestError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("PubMed request failed: {0}")]
    Source(#[from] SourceError),

    #[error("Delivery failed: {0}")]
    Notify(#[from] NotifyError),
}

/// Render the numbered digest for `records`
pub fn format_digest(records: &[Record]) -> String {
    let mut message = String::from(DIGEST_HEADER);
    for (index, record) in records.iter().enumerate() {
        message.push_str(&format!(
            "{}) {}\n{}\n\n",
            index + 1,
            record.title,
            record.url()
        ));
    }
    message
}

/// Run the pipeline against an arbitrary source and notifier
pub async fn run_digest(
    source: &dyn Source,
    notifier: &dyn Notifier,
    query: &SearchQuery,
    max_results: usize,
) -> Result<DigestOutcome, DigestError> {
    let ids = source.search_ids(query, max_results).await?;
    tracing::info!(source = source.name(), count = ids.len(), "Search finished");

    if ids.is_empty() {
        let chunks_sent = notifier.send(FALLBACK_MESSAGE).await?;
        tracing::info!(notifier = notifier.name(), "No new articles, fallback sent");
        return Ok(DigestOutcome {
            ids_found: 0,
            records: 0,
            chunks_sent,
            fallback: true,
        });
    }

    let raw = source.fetch_raw(&ids).await?;
    let records = source.extract(&raw)?;
    if records.is_empty() {
        tracing::warn!(
            ids = ids.len(),
            "Search returned identifiers but no article could be extracted"
        );
    }

    let message = format_digest(&records);
    let chunks_sent = notifier.send(&message).await?;
    tracing::info!(
        notifier = notifier.name(),
        records = records.len(),
        chunks = chunks_sent,
        "Digest delivered"
    );

    Ok(DigestOutcome {
        ids_found: ids.len(),
        records: records.len(),
        chunks_sent,
        fallback: false,
    })
}

/// Run the configured PubMed -> Telegram digest, reading credentials from
/// the process environment.
///
/// With `dry_run` the message is printed to stdout and no credentials are
/// needed.
pub async fn run(
    config: &Config,
    query: &SearchQuery,
    dry_run: bool,
) -> Result<DigestOutcome, DigestError> {
    let credentials = if dry_run {
        None
    } else {
        Some(TelegramCredentials::from_env()?)
    };
    run_with_credentials(config, query, credentials).await
}

/// Like [`run`], with credentials resolved through `lookup`.
///
/// Credentials are resolved before anything touches the network.
pub async fn run_with_lookup<F>(
    config: &Config,
    query: &SearchQuery,
    dry_run: bool,
    lookup: F,
) -> Result<DigestOutcome, DigestError>
where
    F: Fn(&str) -> Option<String>,
{
    let credentials = if dry_run {
        None
    } else {
        Some(TelegramCredentials::from_lookup(lookup)?)
    };
    run_with_credentials(config, query, credentials).await
}

/// Build the clients and run; `None` credentials print to stdout instead
async fn run_with_credentials(
    config: &Config,
    query: &SearchQuery,
    credentials: Option<TelegramCredentials>,
) -> Result<DigestOutcome, DigestError> {
    let client = Arc::new(HttpClient::from_config(&config.http)?);
    let source = PubMedSource::from_config(&config.pubmed, Arc::clone(&client));
    let notifier: Box<dyn Notifier> = match credentials {
        Some(credentials) => Box::new(TelegramNotifier::new(
            &config.telegram,
            credentials,
            client,
        )),
        None => Box::new(ConsoleNotifier::new(config.telegram.max_chunk_chars)),
    };

    run_digest(&source, notifier.as_ref(), query, config.pubmed.max_results).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{chunk_message, MockNotifier};
    use crate::sources::mock::make_article;
    use crate::sources::MockSource;

    #[test]
    fn test_format_digest() {
        let records = vec![Record::new("111", "Alpha Trial"), Record::new("222", "Beta\nReview")];
        let message = format_digest(&records);

        assert_eq!(
            message,
            "🧠 Новые статьи за неделю (ВНЧС / сплинты)\n\n\
             1) Alpha Trial\nhttps://pubmed.ncbi.nlm.nih.gov/111/\n\n\
             2) Beta Review\nhttps://pubmed.ncbi.nlm.nih.gov/222/\n\n"
        );
    }

    #[test]
    fn test_format_digest_without_records_is_header_only() {
        assert_eq!(format_digest(&[]), DIGEST_HEADER);
    }

    #[tokio::test]
    async fn test_empty_search_sends_fallback_without_fetch() {
        let source = MockSource::new();
        let notifier = MockNotifier::default();

        let outcome = run_digest(&source, &notifier, &SearchQuery::tmd_splint_weekly(), 10)
            .await
            .unwrap();

        assert!(outcome.fallback);
        assert_eq!(outcome.chunks_sent, 1);
        assert_eq!(source.search_calls(), 1);
        assert_eq!(source.fetch_calls(), 0);
        assert_eq!(notifier.sent(), vec![FALLBACK_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_digest_end_to_end_with_mocks() {
        let source = MockSource::new();
        source.set_ids(["111", "222"]);
        source.set_fetch_body(format!(
            "{}{}",
            make_article("111", "Alpha Trial"),
            make_article("222", "Beta\nReview")
        ));
        let notifier = MockNotifier::default();

        let outcome = run_digest(&source, &notifier, &SearchQuery::tmd_splint_weekly(), 10)
            .await
            .unwrap();

        assert_eq!(
            outcome,
            DigestOutcome {
                ids_found: 2,
                records: 2,
                chunks_sent: 1,
                fallback: false,
            }
        );
        assert_eq!(source.fetch_calls(), 1);

        let sent = notifier.sent().join("\n");
        let first = sent
            .find("1) Alpha Trial\nhttps://pubmed.ncbi.nlm.nih.gov/111/")
            .unwrap();
        let second = sent
            .find("2) Beta Review\nhttps://pubmed.ncbi.nlm.nih.gov/222/")
            .unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_chunk_count_matches_wrapped_message() {
        let ids: Vec<String> = (1..=60).map(|i| (40_000_000 + i).to_string()).collect();
        let body: String = ids
            .iter()
            .map(|id| make_article(id, &format!("Occlusal splint trial {} ", id).repeat(4)))
            .collect();

        let source = MockSource::new();
        source.set_ids(ids.iter().map(String::as_str));
        source.set_fetch_body(body.clone());
        let notifier = MockNotifier::new(500);

        let outcome = run_digest(&source, &notifier, &SearchQuery::tmd_splint_weekly(), 100)
            .await
            .unwrap();

        let records = crate::sources::extract_records(&body).unwrap();
        let expected = chunk_message(&format_digest(&records), 500);
        assert!(expected.len() > 1);
        assert_eq!(outcome.chunks_sent, expected.len());
        assert_eq!(notifier.sent(), expected);
    }

    #[tokio::test]
    async fn test_max_results_caps_ids() {
        let source = MockSource::new();
        source.set_ids(["1", "2", "3"]);
        source.set_fetch_body(make_article("1", "Only"));
        let notifier = MockNotifier::default();

        let outcome = run_digest(&source, &notifier, &SearchQuery::tmd_splint_weekly(), 1)
            .await
            .unwrap();

        assert_eq!(outcome.ids_found, 1);
    }

    #[tokio::test]
    async fn test_missing_credentials_abort_before_network() {
        let mut config = Config::default();
        // Unroutable endpoints: any request would fail with a network error
        config.pubmed.esearch_url = "http://127.0.0.1:9/esearch.fcgi".to_string();
        config.pubmed.efetch_url = "http://127.0.0.1:9/efetch.fcgi".to_string();

        let err = run_with_lookup(&config, &SearchQuery::tmd_splint_weekly(), false, |_| None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DigestError::Config(ConfigError::MissingCredential(_))
        ));
    }

    #[test]
    fn test_source_error_names_pubmed() {
        let fetch = DigestError::from(SourceError::Api(
            "PubMed API returned status: 502 Bad Gateway".to_string(),
        ));
        assert_eq!(
            fetch.to_string(),
            "PubMed request failed: API error: PubMed API returned status: 502 Bad Gateway"
        );

        let parse = DigestError::from(SourceError::Parse("XML: unexpected end".to_string()));
        assert!(parse.to_string().starts_with("PubMed request failed: Parse error"));
    }
}
