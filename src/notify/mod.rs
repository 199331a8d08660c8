//! Message delivery.
//!
//! A [`Notifier`] receives the finished digest text, splits it with
//! [`chunk_message`] and delivers the chunks one at a time, in order. A
//! failed chunk aborts the delivery; chunks already sent stay sent.

mod chunk;
mod console;
pub mod mock;
mod telegram;

pub use chunk::chunk_message;
pub use console::ConsoleNotifier;
pub use mock::MockNotifier;
pub use telegram::TelegramNotifier;

use async_trait::async_trait;

/// Destination for digest messages
#[async_trait]
pub trait Notifier: Send + Sync + std::fmt::Debug {
    /// Human-readable name of this destination
    fn name(&self) -> &str;

    /// Largest chunk, in characters, accepted by `send_chunk`
    fn max_chunk_chars(&self) -> usize;

    /// Deliver a single chunk
    async fn send_chunk(&self, chunk: &str) -> Result<(), NotifyError>;

    /// Split `text` into chunks and deliver them sequentially.
    ///
    /// Returns the number of chunks delivered.
    async fn send(&self, text: &str) -> Result<usize, NotifyError> {
        let chunks = chunk_message(text, self.max_chunk_chars());
        tracing::debug!(notifier = self.name(), chunks = chunks.len(), "Sending message");

        for (index, chunk) in chunks.iter().enumerate() {
            self.send_chunk(chunk).await?;
            tracing::debug!(
                notifier = self.name(),
                chunk = index + 1,
                chars = chunk.chars().count(),
                "Chunk delivered"
            );
        }

        Ok(chunks.len())
    }
}

/// Errors that can occur while delivering a message
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Network, connection or timeout error
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from the messaging API
    #[error("Telegram API returned status {status}: {description}")]
    Api { status: u16, description: String },

    /// The messaging API answered with `ok: false`
    #[error("Telegram rejected the message: {0}")]
    Rejected(String),

    /// Writing to a local stream failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the bot token
        NotifyError::Network(err.without_url().to_string())
    }
}
