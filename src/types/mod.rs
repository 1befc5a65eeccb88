use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============= Conversation Types =============

/// Who produced a recorded turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used when a turn is rendered into a prompt transcript.
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "ユーザー",
            Role::Assistant => "アシスタント",
        }
    }
}

/// One recorded utterance in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

// ============= Search Types =============

/// A single web search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

// ============= Inbound Event Types =============

/// Platform-neutral view of a message delivered to the bot.
#[derive(Debug, Clone, Default)]
pub struct InboundMessage {
    /// Channel or thread the message arrived in; scopes conversation history.
    pub conversation_id: String,
    pub content: String,
    pub author_is_bot: bool,
    /// Direct message (no guild).
    pub is_direct: bool,
    pub in_thread: bool,
    pub mentions_bot: bool,
}

// ============= Error Types =============

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Search error: {0}")]
    Search(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Discord error: {0}")]
    Discord(String),

    #[error("HTTP server error: {0}")]
    Http(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl BotError {
    /// Whether the gateway may recover from this error and keep serving.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BotError::Backend(_) | BotError::Search(_))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
