//! Generative backend client
//!
//! - [`LLMClient`] - the trait the rest of the bot depends on
//! - [`GeminiClient`] - Google Gemini over its REST API
//!
//! # Example
//!
//! ```ignore
//! use bocchi::llm::{GeminiClient, LLMClient};
//!
//! let client = GeminiClient::new(&config.gemini, api_key)?;
//! let answer = client.generate("2+2は？").await?;
//! ```

/// Core LLM client trait.
pub mod client;
/// Gemini REST client.
pub mod gemini;

pub use client::LLMClient;
pub use gemini::GeminiClient;
