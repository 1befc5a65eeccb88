//! Conversation memory for the bot.
//!
//! Each Discord channel (or thread) gets its own short-lived transcript held
//! in a [`HistoryStore`]. Two independent knobs bound it:
//!
//! - `max_history_length` caps how many turns are retained per conversation
//!   (oldest evicted first)
//! - `context_window` caps how many trailing turns are rendered into a prompt
//!
//! A conversation idle for longer than `interaction_timeout` is purged the
//! next time its transcript is read. There is no background sweeper and
//! nothing is persisted across restarts.
//!
//! # Example
//!
//! ```ignore
//! use bocchi::memory::{HistoryLimits, HistoryStore};
//! use bocchi::types::Role;
//!
//! let store = HistoryStore::new(HistoryLimits::default());
//! store.add_message("channel-1", Role::User, "こんにちは");
//! store.add_message("channel-1", Role::Assistant, "やあ！");
//! let transcript = store.get_formatted_history("channel-1");
//! ```

pub mod history;

pub use history::{Clock, ConversationRecord, HistoryStore, RecordState, SystemClock};

/// Default number of turns retained per conversation.
pub const DEFAULT_MAX_HISTORY_LENGTH: usize = 15;

/// Default number of trailing turns rendered into a prompt.
pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

/// Default idle time after which a conversation is forgotten (15 minutes).
pub const DEFAULT_INTERACTION_TIMEOUT_MS: u64 = 15 * 60 * 1000;

/// Bounds applied by a [`HistoryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryLimits {
    pub max_history_length: usize,
    pub context_window: usize,
    pub interaction_timeout_ms: u64,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_history_length: DEFAULT_MAX_HISTORY_LENGTH,
            context_window: DEFAULT_CONTEXT_WINDOW,
            interaction_timeout_ms: DEFAULT_INTERACTION_TIMEOUT_MS,
        }
    }
}

impl HistoryLimits {
    /// Idle timeout as a chrono duration, saturating for absurdly large values.
    pub fn interaction_timeout(&self) -> chrono::Duration {
        let millis = i64::try_from(self.interaction_timeout_ms).unwrap_or(i64::MAX);
        chrono::Duration::try_milliseconds(millis).unwrap_or(chrono::Duration::MAX)
    }
}
