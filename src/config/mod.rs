//! Configuration management.
//!
//! Settings come from an optional TOML file and `PUBMED_DIGEST_*` environment
//! overrides, e.g. `PUBMED_DIGEST_PUBMED__MAX_RESULTS=20`. Telegram credentials
//! are read separately, see [`TelegramCredentials`].
//!
//! ```toml
//! [pubmed]
//! max_results = 10
//!
//! [telegram]
//! max_chunk_chars = 3500
//!
//! [http]
//! timeout_secs = 30
//! ```

mod credentials;

pub use credentials::{TelegramCredentials, BOT_TOKEN_ENV, CHAT_ID_ENV};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::SortBy;

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "PUBMED_DIGEST";

/// Name of the config file looked up in the working and config directories
const CONFIG_FILE_NAME: &str = "pubmed-digest.toml";

/// Telegram rejects messages longer than this
const TELEGRAM_MAX_MESSAGE_CHARS: usize = 4096;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// PubMed E-utilities settings
    #[serde(default)]
    pub pubmed: PubMedConfig,

    /// Telegram delivery settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// PubMed E-utilities settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PubMedConfig {
    #[serde(default = "default_esearch_url")]
    pub esearch_url: String,

    #[serde(default = "default_efetch_url")]
    pub efetch_url: String,

    /// Cap on identifiers requested from the search endpoint
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Result order requested from the search endpoint
    #[serde(default)]
    pub sort: SortBy,

    /// NCBI API key (optional, for higher rate limits)
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            esearch_url: default_esearch_url(),
            efetch_url: default_efetch_url(),
            max_results: default_max_results(),
            sort: SortBy::default(),
            api_key: None,
        }
    }
}

fn default_esearch_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi".to_string()
}

fn default_efetch_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi".to_string()
}

fn default_max_results() -> usize {
    10
}

/// Telegram delivery settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,

    /// Upper bound on characters per sent message
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    #[serde(default = "default_true")]
    pub disable_web_page_preview: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: default_telegram_api_base(),
            max_chunk_chars: default_max_chunk_chars(),
            disable_web_page_preview: true,
        }
    }
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_max_chunk_chars() -> usize {
    3500
}

fn default_true() -> bool {
    true
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Config {
    /// Check that every setting is usable before any request is made
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("pubmed.esearch_url", &self.pubmed.esearch_url)?;
        check_url("pubmed.efetch_url", &self.pubmed.efetch_url)?;
        check_url("telegram.api_base", &self.telegram.api_base)?;

        if !(1..=10_000).contains(&self.pubmed.max_results) {
            return Err(ConfigError::Invalid {
                key: "pubmed.max_results",
                reason: format!("{} is outside 1..=10000", self.pubmed.max_results),
            });
        }

        if !(1..=TELEGRAM_MAX_MESSAGE_CHARS).contains(&self.telegram.max_chunk_chars) {
            return Err(ConfigError::Invalid {
                key: "telegram.max_chunk_chars",
                reason: format!(
                    "{} is outside 1..={}",
                    self.telegram.max_chunk_chars, TELEGRAM_MAX_MESSAGE_CHARS
                ),
            });
        }

        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "http.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        Ok(())
    }
}

fn check_url(key: &'static str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid {
            key,
            reason: format!("{:?} is not a valid URL: {}", value, e),
        })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required credential absent from the environment
    #[error("Missing required environment variable {0}")]
    MissingCredential(&'static str),

    /// A setting has an unusable value
    #[error("Invalid setting {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    /// File or environment source could not be read
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: Config = settings.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Find a config file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("pubmed-digest").join("config.toml"))
        .filter(|path| path.is_file())
}
