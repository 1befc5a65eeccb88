//! Mock implementations for testing.
//!
//! Scripted backend and search clients shared across integration tests so
//! no test touches the network.

use async_trait::async_trait;
use bocchi::llm::LLMClient;
use bocchi::tools::SearchClient;
use bocchi::types::{BotError, Result, SearchHit};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Mock LLM client returning queued responses and recording every prompt.
///
/// When the queue is empty the fallback response is returned. A failing
/// client returns [`BotError::Backend`] for every call.
#[derive(Clone, Default)]
pub struct MockLLMClient {
    responses: Arc<Mutex<VecDeque<Result<String>>>>,
    fallback: String,
    should_fail: bool,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockLLMClient {
    /// Create a mock client that always returns the given response.
    pub fn new(response: &str) -> Self {
        Self {
            fallback: response.to_string(),
            ..Default::default()
        }
    }

    /// Create a mock client that always returns an error.
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// Queue responses returned in order before falling back.
    pub fn with_sequence(responses: Vec<Result<String>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            ..Default::default()
        }
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LLMClient for MockLLMClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.should_fail {
            return Err(BotError::Backend("Mock LLM failure".to_string()));
        }
        if let Some(next) = self.responses.lock().pop_front() {
            return next;
        }
        Ok(self.fallback.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

/// Mock search client with fixed results.
#[derive(Clone, Default)]
pub struct MockSearchClient {
    hits: Vec<SearchHit>,
    should_fail: bool,
    queries: Arc<Mutex<Vec<(String, usize)>>>,
}

impl MockSearchClient {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    /// `(query, limit)` pairs received so far.
    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.lock().clone()
    }
}

#[async_trait]
impl SearchClient for MockSearchClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().push((query.to_string(), limit));
        if self.should_fail {
            return Err(BotError::Search("Mock search failure".to_string()));
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}

/// Builds `count` distinct search hits.
pub fn sample_hits(count: usize) -> Vec<SearchHit> {
    (1..=count)
        .map(|i| SearchHit {
            title: format!("Result {}", i),
            snippet: format!("Snippet number {}", i),
            url: format!("https://example.com/{}", i),
        })
        .collect()
}
