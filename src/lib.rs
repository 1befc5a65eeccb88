//! # Bocchi - a Discord chat bot backed by Gemini
//!
//! Bocchi answers Discord DMs, mentions and thread messages with a generative
//! model, remembering the last few turns of each channel for a short while.
//!
//! ## Overview
//!
//! - Per-channel history is bounded in size, rendered through a trailing
//!   context window, and forgotten after a period of silence
//!   ([`memory`])
//! - Long answers are split on line boundaries to fit Discord's message
//!   limit ([`chunker`])
//! - `!search <query>` grounds the answer in summarized web results
//!   ([`tools`])
//!
//! ## Quick Start (Library Usage)
//!
//! ```rust,ignore
//! use bocchi::{HistoryStore, MessageChunker, types::Role};
//!
//! let store = HistoryStore::default();
//! store.add_message("channel", Role::User, "hello");
//! let transcript = store.get_formatted_history("channel");
//!
//! for part in MessageChunker::default().chunk(&long_answer) {
//!     send(part).await?;
//! }
//! ```
//!
//! ## Modules
//!
//! - [`bot`] - Chat service and Discord adapter
//! - [`chunker`] - Reply splitting
//! - [`commands`] - Prefix commands (`clear`, `help`, `status`, `search`)
//! - [`llm`] - Generative backend client
//! - [`memory`] - Conversation history
//! - [`prompt`] - Prompt composition
//! - [`tools`] - Web search and summarization
//! - [`types`] - Common types and error handling

#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP health endpoints.
pub mod api;
/// Chat service and Discord gateway adapter.
pub mod bot;
/// Reply chunking for Discord's message limit.
pub mod chunker;
/// Command-line interface.
pub mod cli;
/// Prefix command parsing and handlers.
pub mod commands;
/// Generative backend clients.
pub mod llm;
/// Per-conversation history.
pub mod memory;
/// Prompt composition.
pub mod prompt;
/// Web search and result summarization.
pub mod tools;
/// Core types and errors.
pub mod types;
/// Configuration and logging utilities.
pub mod utils;

// Re-export commonly used types
pub use bot::{BotStats, ChatService};
pub use chunker::MessageChunker;
pub use llm::{GeminiClient, LLMClient};
pub use memory::{HistoryLimits, HistoryStore};
pub use types::{BotError, Result};
pub use utils::config::BotConfig;

use std::sync::Arc;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// State shared with the health endpoints
#[derive(Clone)]
pub struct AppState {
    /// Conversation history, for reporting conversation counts
    pub history: Arc<HistoryStore>,
    /// Uptime and guild counters
    pub stats: Arc<BotStats>,
}
