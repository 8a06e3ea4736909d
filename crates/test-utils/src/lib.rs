//! # Shared Test Utilities
//!
//! Mock providers and HTML fixtures used by the integration tests of every
//! crate in the workspace.

pub mod fixtures;

use async_trait::async_trait;
use reviewlens::errors::{ExtractionError, PromptError};
use reviewlens::providers::{ai::AiProvider, extract::Extractor};
use reviewlens::ProductSnapshot;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::Duration;

// --- Mock AI Provider ---

/// What the mock answers when a user prompt contains a programmed key.
#[derive(Clone, Debug)]
pub enum MockReply {
    Text(String),
    /// Fails with `PromptError::AiApi` carrying this status.
    Error(u16),
    /// Waits, then answers. Used to make calls complete out of order.
    Delayed(Duration, String),
    /// Fails with the status for the first `failures` calls, then answers.
    FailThen {
        failures: u32,
        status: u16,
        text: String,
    },
}

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    replies: Arc<Mutex<Vec<(String, MockReply)>>>,
    attempts: Arc<Mutex<HashMap<String, u32>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
    default_reply: String,
}

impl MockAiProvider {
    /// A mock that answers `default_reply` to anything without a programmed reply.
    pub fn new(default_reply: &str) -> Self {
        Self {
            replies: Arc::new(Mutex::new(Vec::new())),
            attempts: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            default_reply: default_reply.to_string(),
        }
    }

    /// Programs a reply for any user prompt containing `key`.
    pub fn add_reply(&self, key: &str, reply: MockReply) {
        self.replies.lock().unwrap().push((key.to_string(), reply));
    }

    /// Shorthand for a plain text reply.
    pub fn add_response(&self, key: &str, response: &str) {
        self.add_reply(key, MockReply::Text(response.to_string()));
    }

    /// Retrieves the recorded `(system_prompt, user_prompt)` calls.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose user prompt contained `key`.
    pub fn calls_containing(&self, key: &str) -> usize {
        self.get_calls()
            .iter()
            .filter(|(_, user)| user.contains(key))
            .count()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new("real")
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PromptError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        let programmed = self
            .replies
            .lock()
            .unwrap()
            .iter()
            .find(|(key, _)| user_prompt.contains(key.as_str()))
            .cloned();

        let Some((key, reply)) = programmed else {
            return Ok(self.default_reply.clone());
        };

        match reply {
            MockReply::Text(text) => Ok(text),
            MockReply::Error(status) => Err(PromptError::AiApi {
                status,
                body: format!("MockAiProvider: programmed failure for '{key}'"),
            }),
            MockReply::Delayed(delay, text) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            MockReply::FailThen {
                failures,
                status,
                text,
            } => {
                let attempt = {
                    let mut attempts = self.attempts.lock().unwrap();
                    let counter = attempts.entry(key.clone()).or_insert(0);
                    *counter += 1;
                    *counter
                };
                if attempt <= failures {
                    Err(PromptError::AiApi {
                        status,
                        body: format!("MockAiProvider: failure {attempt} for '{key}'"),
                    })
                } else {
                    Ok(text)
                }
            }
        }
    }
}

// --- Mock Extractor ---

#[derive(Clone, Debug)]
enum MockExtraction {
    Snapshot(ProductSnapshot),
    Status(u16),
}

#[derive(Clone, Debug)]
pub struct MockExtractor {
    outcome: MockExtraction,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockExtractor {
    /// An extractor that always returns `snapshot`.
    pub fn with_snapshot(snapshot: ProductSnapshot) -> Self {
        Self {
            outcome: MockExtraction::Snapshot(snapshot),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// An extractor whose service always answers with an error status.
    pub fn failing(status: u16) -> Self {
        Self {
            outcome: MockExtraction::Status(status),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// URLs this extractor was asked for.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, url: &str) -> Result<ProductSnapshot, ExtractionError> {
        self.calls.lock().unwrap().push(url.to_string());
        match &self.outcome {
            MockExtraction::Snapshot(snapshot) => Ok(snapshot.clone()),
            MockExtraction::Status(status) => Err(ExtractionError::Status {
                url: url.to_string(),
                status: *status,
                body: "MockExtractor: programmed failure".to_string(),
            }),
        }
    }
}
