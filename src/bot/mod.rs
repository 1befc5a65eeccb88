//! Event handling
//!
//! [`ChatService`] holds the platform-neutral reply logic: deciding whether a
//! message deserves an answer, dispatching commands, composing the prompt,
//! recording history and chunking the reply. [`discord`] adapts serenity
//! events onto it.

pub mod discord;

use crate::chunker::MessageChunker;
use crate::commands::{self, CommandOutcome, CommandRouter};
use crate::llm::LLMClient;
use crate::memory::HistoryStore;
use crate::prompt::PromptComposer;
use crate::tools::{SearchSummarizer, SearchSummary};
use crate::types::{InboundMessage, Role};
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// Reply sent when the backend fails.
pub const APOLOGY_MESSAGE: &str = "申し訳ありません。エラーが発生しました。";

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@!?\d+>").expect("mention pattern is valid"));

/// Process-wide counters shown by `status` and the health endpoint.
#[derive(Debug)]
pub struct BotStats {
    started_at: Instant,
    guilds: AtomicUsize,
}

impl BotStats {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
            guilds: AtomicUsize::new(0),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn guild_count(&self) -> usize {
        self.guilds.load(Ordering::Relaxed)
    }

    pub fn set_guild_count(&self, count: usize) {
        self.guilds.store(count, Ordering::Relaxed);
    }
}

impl Default for BotStats {
    fn default() -> Self {
        Self::new()
    }
}

/// What to do about an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a ready-made reply (command output).
    Reply(String),
    /// Ask the backend, optionally grounding the answer in a web search.
    Generate {
        conversation_id: String,
        prompt: String,
        search: bool,
    },
}

impl Action {
    /// Whether the action calls the backend (and so warrants a typing indicator).
    pub fn needs_generation(&self) -> bool {
        matches!(self, Action::Generate { .. })
    }
}

pub struct ChatService {
    history: Arc<HistoryStore>,
    llm: Arc<dyn LLMClient>,
    summarizer: Option<SearchSummarizer>,
    composer: PromptComposer,
    router: CommandRouter,
    chunker: MessageChunker,
}

impl ChatService {
    pub fn new(
        history: Arc<HistoryStore>,
        llm: Arc<dyn LLMClient>,
        composer: PromptComposer,
        router: CommandRouter,
        chunker: MessageChunker,
    ) -> Self {
        Self {
            history,
            llm,
            summarizer: None,
            composer,
            router,
            chunker,
        }
    }

    /// Enables web-search grounding.
    pub fn with_summarizer(mut self, summarizer: SearchSummarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn prefix(&self) -> &str {
        self.router.prefix()
    }

    /// Decides how to respond. `None` means stay silent.
    pub fn plan(&self, message: &InboundMessage) -> Option<Action> {
        if message.author_is_bot {
            return None;
        }

        if let Some(parsed) = commands::parse(&message.content, self.router.prefix()) {
            return Some(match self.router.route(&parsed, &message.conversation_id) {
                CommandOutcome::Reply(text) => Action::Reply(text),
                CommandOutcome::Search { query } => Action::Generate {
                    conversation_id: message.conversation_id.clone(),
                    prompt: query,
                    search: true,
                },
            });
        }

        let prompt = if message.is_direct {
            message.content.trim().to_string()
        } else if message.in_thread || message.mentions_bot {
            strip_mentions(&message.content)
        } else {
            return None;
        };

        if prompt.is_empty() {
            return None;
        }

        Some(Action::Generate {
            conversation_id: message.conversation_id.clone(),
            prompt,
            search: false,
        })
    }

    /// Carries out an action and returns the replies to send, in order.
    /// Every reply fits in one transport message.
    pub async fn execute(&self, action: Action) -> Vec<String> {
        match action {
            Action::Reply(text) => self.chunk(&text),
            Action::Generate {
                conversation_id,
                prompt,
                search,
            } => self.answer(&conversation_id, &prompt, search).await,
        }
    }

    /// `plan` followed by `execute`.
    pub async fn handle(&self, message: &InboundMessage) -> Vec<String> {
        match self.plan(message) {
            Some(action) => self.execute(action).await,
            None => Vec::new(),
        }
    }

    async fn answer(&self, conversation_id: &str, question: &str, search: bool) -> Vec<String> {
        let history = self.history.get_formatted_history(conversation_id);

        let summary = if search {
            self.search(question).await
        } else {
            None
        };
        let search_context = summary.as_ref().map(SearchSummary::prompt_context);

        let prompt = self
            .composer
            .compose(&history, search_context.as_deref(), question);

        let response = match self.llm.generate(&prompt).await {
            Ok(response) => response,
            Err(e) => {
                error!(conversation_id, error = %e, "Generation failed");
                return vec![APOLOGY_MESSAGE.to_string()];
            }
        };

        self.history.add_message(conversation_id, Role::User, question);
        self.history
            .add_message(conversation_id, Role::Assistant, response.as_str());

        let mut replies = self.chunk(&response);
        if let (Some(summary), Some(summarizer)) = (&summary, &self.summarizer) {
            replies.extend(summarizer.render_fragments(summary));
        }

        info!(
            conversation_id,
            fragments = replies.len(),
            model = self.llm.model_name(),
            "Reply generated"
        );
        replies
    }

    /// Runs the summarizer, degrading to no results on any failure.
    async fn search(&self, query: &str) -> Option<SearchSummary> {
        let summarizer = self.summarizer.as_ref()?;
        match summarizer.summarize(query).await {
            Ok(summary) if summary.is_empty() => None,
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(query, error = %e, "Search failed, answering without results");
                None
            }
        }
    }

    fn chunk(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.chunker.chunk(text)
    }
}

/// Removes `<@id>` / `<@!id>` mention tokens and trims the result.
pub fn strip_mentions(content: &str) -> String {
    MENTION_PATTERN.replace_all(content, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_mentions() {
        assert_eq!(strip_mentions("<@123> hello"), "hello");
        assert_eq!(strip_mentions("hey <@!456> there"), "hey  there");
        assert_eq!(strip_mentions("<@1><@2>"), "");
        assert_eq!(strip_mentions("<@abc> keep"), "<@abc> keep");
    }

    #[test]
    fn test_stats_guild_count() {
        let stats = BotStats::new();
        assert_eq!(stats.guild_count(), 0);
        stats.set_guild_count(4);
        assert_eq!(stats.guild_count(), 4);
    }

    #[test]
    fn test_action_needs_generation() {
        assert!(!Action::Reply("x".to_string()).needs_generation());
        assert!(Action::Generate {
            conversation_id: "c".to_string(),
            prompt: "p".to_string(),
            search: false,
        }
        .needs_generation());
    }
}
