//! Mock notifier for testing purposes.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::notify::{Notifier, NotifyError};

/// Records every chunk it is asked to send.
///
/// Optionally fails on the n-th chunk (1-based) to exercise partial delivery.
#[derive(Debug)]
pub struct MockNotifier {
    max_chunk_chars: usize,
    sent: Mutex<Vec<String>>,
    fail_on: Mutex<Option<usize>>,
}

impl MockNotifier {
    pub fn new(max_chunk_chars: usize) -> Self {
        Self {
            max_chunk_chars,
            sent: Mutex::new(Vec::new()),
            fail_on: Mutex::new(None),
        }
    }

    /// Fail when the `n`-th chunk is sent
    pub fn fail_on_chunk(&self, n: usize) {
        *self.fail_on.lock().unwrap() = Some(n);
    }

    /// Chunks delivered so far, in order
    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new(3500)
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "Mock Notifier"
    }

    fn max_chunk_chars(&self) -> usize {
        self.max_chunk_chars
    }

    async fn send_chunk(&self, chunk: &str) -> Result<(), NotifyError> {
        let mut sent = self.sent.lock().unwrap();
        if *self.fail_on.lock().unwrap() == Some(sent.len() + 1) {
            return Err(NotifyError::Api {
                status: 500,
                description: "mock failure".to_string(),
            });
        }
        sent.push(chunk.to_string());
        Ok(())
    }
}
