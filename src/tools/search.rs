//! Web search backed by daedra
//!
//! daedra queries DuckDuckGo, so no API key is required.

use crate::types::{BotError, Result, SearchHit};
use async_trait::async_trait;
use tracing::debug;

/// Web search provider returning the top results for a query.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Returns at most `limit` results, best first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

/// DuckDuckGo search powered by daedra
pub struct DuckDuckGoSearch;

impl DuckDuckGoSearch {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchClient for DuckDuckGoSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(BotError::Search("Empty search query".to_string()));
        }

        let search_args = daedra::SearchArgs {
            query: query.to_string(),
            options: Some(daedra::SearchOptions {
                num_results: limit,
                ..Default::default()
            }),
        };

        let response = daedra::tools::search::perform_search(&search_args)
            .await
            .map_err(|e| BotError::Search(format!("Search failed: {}", e)))?;

        let hits: Vec<SearchHit> = response
            .data
            .iter()
            .take(limit)
            .map(|r| SearchHit {
                title: r.title.to_string(),
                snippet: r.description.to_string(),
                url: r.url.to_string(),
            })
            .collect();

        debug!(query, results = hits.len(), "Web search completed");
        Ok(hits)
    }
}
