//! External tools the bot can call on behalf of a user
//!
//! - [`search`](crate::tools::search) - Web search (DuckDuckGo via daedra)
//! - [`summarizer`](crate::tools::summarizer) - Condenses search results with the backend
//!
//! # Example
//!
//! ```ignore
//! let summarizer = SearchSummarizer::new(search, llm, 3, 200, 2000);
//! let summary = summarizer.summarize("rust async").await?;
//! for reply in summarizer.render_fragments(&summary) {
//!     println!("{}", reply);
//! }
//! ```

/// Web search client.
pub mod search;
/// Search result summarization.
pub mod summarizer;

pub use search::{DuckDuckGoSearch, SearchClient};
pub use summarizer::{SearchSummarizer, SearchSummary, SummaryEntry};
