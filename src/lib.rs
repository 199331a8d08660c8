//! # PubMed Digest
//!
//! Weekly digest of new temporomandibular disorder / occlusal splint trials
//! and reviews from PubMed, delivered to a Telegram chat.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`]: Core data structures (SearchQuery, Record, RecordId)
//! - [`sources`]: Literature sources (PubMed E-utilities search, fetch and extraction)
//! - [`notify`]: Message chunking and delivery (Telegram, console)
//! - [`digest`]: The search -> fetch -> extract -> format -> notify pipeline
//! - [`utils`]: HTTP client
//! - [`config`]: Configuration and credentials

pub mod config;
pub mod digest;
pub mod models;
pub mod notify;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use digest::{format_digest, run_digest, DigestOutcome};
pub use models::{Record, SearchQuery};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
