//! Standard output delivery, used for dry runs.

use async_trait::async_trait;
use std::io::Write;

use crate::notify::{Notifier, NotifyError};

/// Prints each chunk to stdout, separated by a rule line
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    max_chunk_chars: usize,
}

impl ConsoleNotifier {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self { max_chunk_chars }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    fn name(&self) -> &str {
        "Console"
    }

    fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    async fn send_chunk(&self, chunk: &str) -> Result<(), NotifyError> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", chunk)?;
        writeln!(out, "{}", "-".repeat(40))?;
        out.flush()?;
        Ok(())
    }
}
