//! Utility modules shared by the source and notifier clients.
//!
//! - [`HttpClient`]: reqwest client carrying the configured request timeouts

mod http;

pub use http::HttpClient;
