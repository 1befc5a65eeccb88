use super::HistoryLimits;
use crate::types::{Role, Turn};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tracing::debug;

/// Source of "now" for expiry decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Whether a record may still be read or must be purged first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    Active,
    Expired,
}

/// Bounded turn log for one conversation.
#[derive(Debug, Clone)]
pub struct ConversationRecord {
    entries: VecDeque<Turn>,
    last_activity: DateTime<Utc>,
}

impl ConversationRecord {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            entries: VecDeque::new(),
            last_activity: now,
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &Turn> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    pub fn state(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> RecordState {
        if now.signed_duration_since(self.last_activity) > timeout {
            RecordState::Expired
        } else {
            RecordState::Active
        }
    }

    fn push(&mut self, turn: Turn, max_len: usize) {
        self.last_activity = turn.created_at;
        self.entries.push_back(turn);
        while self.entries.len() > max_len {
            self.entries.pop_front();
        }
        debug_assert!(
            self.entries.len() <= max_len,
            "conversation exceeded its capacity after eviction"
        );
    }

    /// Renders the trailing `window` turns as `"<label>: <content>"` lines.
    fn render_window(&self, window: usize) -> String {
        let skip = self.entries.len().saturating_sub(window);
        self.entries
            .iter()
            .skip(skip)
            .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// In-memory, per-conversation history shared by the gateway and commands.
///
/// All mutations of a conversation happen under a single lock acquisition, so
/// concurrent events for the same channel never observe a half-applied
/// append, eviction or purge.
pub struct HistoryStore {
    limits: HistoryLimits,
    records: Mutex<HashMap<String, ConversationRecord>>,
    clock: Arc<dyn Clock>,
}

impl HistoryStore {
    pub fn new(limits: HistoryLimits) -> Self {
        Self::with_clock(limits, Arc::new(SystemClock))
    }

    pub fn with_clock(limits: HistoryLimits, clock: Arc<dyn Clock>) -> Self {
        Self {
            limits,
            records: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Appends a turn, creating the conversation on first use and evicting
    /// the oldest turns beyond `max_history_length`.
    pub fn add_message(&self, conversation_id: &str, role: Role, content: impl Into<String>) {
        let now = self.clock.now();
        let turn = Turn {
            role,
            content: content.into(),
            created_at: now,
        };

        let mut records = self.records.lock();
        records
            .entry(conversation_id.to_string())
            .or_insert_with(|| ConversationRecord::new(now))
            .push(turn, self.limits.max_history_length);
    }

    /// Returns the trailing context window as a transcript, purging the
    /// conversation first if it has been idle past the interaction timeout.
    pub fn get_formatted_history(&self, conversation_id: &str) -> String {
        let now = self.clock.now();
        let timeout = self.limits.interaction_timeout();

        let mut records = self.records.lock();
        let state = records
            .get(conversation_id)
            .map(|record| record.state(now, timeout));

        match state {
            Some(RecordState::Active) => records
                .get(conversation_id)
                .map(|record| record.render_window(self.limits.context_window))
                .unwrap_or_default(),
            Some(RecordState::Expired) => {
                records.remove(conversation_id);
                debug!(conversation_id, "Purged expired conversation history");
                String::new()
            }
            None => String::new(),
        }
    }

    /// Forgets a conversation. Clearing an unknown conversation is a no-op.
    pub fn clear_history(&self, conversation_id: &str) {
        if self.records.lock().remove(conversation_id).is_some() {
            debug!(conversation_id, "Cleared conversation history");
        }
    }

    /// Number of retained turns. Does not apply expiry.
    pub fn get_history_length(&self, conversation_id: &str) -> usize {
        self.records
            .lock()
            .get(conversation_id)
            .map(ConversationRecord::len)
            .unwrap_or(0)
    }

    /// Snapshot of every retained turn, oldest first. Does not apply expiry.
    pub fn turns(&self, conversation_id: &str) -> Vec<Turn> {
        self.records
            .lock()
            .get(conversation_id)
            .map(|record| record.entries().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of conversations currently held in memory.
    pub fn conversation_count(&self) -> usize {
        self.records.lock().len()
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(HistoryLimits::default())
    }
}
