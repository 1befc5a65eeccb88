//! Prefix commands
//!
//! Commands form a fixed table ([`Command::ALL`]); there is no runtime
//! discovery. `clear`, `help` and `status` are answered directly by the
//! [`CommandRouter`]; `search` is handed back to the chat service because it
//! needs the generative backend.

use crate::bot::BotStats;
use crate::memory::HistoryStore;
use crate::utils::config::PersonaConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Clear,
    Help,
    Status,
    Search,
}

impl Command {
    pub const ALL: [Command; 4] = [
        Command::Clear,
        Command::Help,
        Command::Status,
        Command::Search,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Command::Clear => "clear",
            Command::Help => "help",
            Command::Status => "status",
            Command::Search => "search",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Clear => "会話履歴をクリアします",
            Command::Help => "コマンド一覧と使い方を表示します",
            Command::Status => "ボットの状態を表示します",
            Command::Search => "Web検索の結果を踏まえて回答します",
        }
    }

    pub fn from_name(name: &str) -> Option<Command> {
        Command::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
    }
}

/// A recognised command and the rest of the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub command: Command,
    pub args: String,
}

/// Parses `content` as `<prefix><name> [args...]`.
///
/// Returns `None` when the prefix is missing or the name is unknown, so the
/// message can still be treated as ordinary chat.
pub fn parse(content: &str, prefix: &str) -> Option<ParsedCommand> {
    let rest = content.strip_prefix(prefix)?.trim();
    let (name, args) = match rest.split_once(char::is_whitespace) {
        Some((name, args)) => (name, args.trim()),
        None => (rest, ""),
    };
    let command = Command::from_name(name)?;
    Some(ParsedCommand {
        command,
        args: args.to_string(),
    })
}

/// What the caller should do with a routed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Reply(String),
    Search { query: String },
}

pub struct CommandRouter {
    history: Arc<HistoryStore>,
    stats: Arc<BotStats>,
    persona: PersonaConfig,
    prefix: String,
}

impl CommandRouter {
    pub fn new(
        history: Arc<HistoryStore>,
        stats: Arc<BotStats>,
        persona: PersonaConfig,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            history,
            stats,
            persona,
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn route(&self, parsed: &ParsedCommand, conversation_id: &str) -> CommandOutcome {
        info!(command = parsed.command.name(), conversation_id, "Executing command");
        match parsed.command {
            Command::Clear => {
                self.history.clear_history(conversation_id);
                CommandOutcome::Reply("会話履歴をクリアしました！新しい会話を始めましょう。".to_string())
            }
            Command::Help => CommandOutcome::Reply(self.help_text()),
            Command::Status => CommandOutcome::Reply(self.status_text(conversation_id)),
            Command::Search if parsed.args.is_empty() => CommandOutcome::Reply(format!(
                "検索したい内容を指定してください。例: {}search Rust 非同期",
                self.prefix
            )),
            Command::Search => CommandOutcome::Search {
                query: parsed.args.clone(),
            },
        }
    }

    fn help_text(&self) -> String {
        let mut text = format!("# {}のヘルプ\n\n", self.persona.name);
        text.push_str("## 基本的な使い方\n");
        text.push_str("- DMでメッセージを送るか、サーバー内でメンションするとAIが応答します\n");
        text.push_str("- スレッド内ではメンション不要です\n\n");

        text.push_str("## コマンド一覧\n");
        for command in Command::ALL {
            text.push_str(&format!(
                "- **{}{}**: {}\n",
                self.prefix,
                command.name(),
                command.description()
            ));
        }

        if !self.persona.traits.is_empty() {
            text.push_str("\n## 特徴\n");
            for item in &self.persona.traits {
                text.push_str(&format!("- {}\n", item));
            }
        }
        text
    }

    fn status_text(&self, conversation_id: &str) -> String {
        let mut text = String::from("# ボットのステータス\n\n");
        text.push_str("## システム情報\n");
        text.push_str(&format!(
            "- **稼働時間**: {}\n",
            format_uptime(self.stats.uptime())
        ));
        text.push_str(&format!("- **ボットバージョン**: {}\n", crate::VERSION));
        text.push_str(&format!(
            "- **メモリ使用量**: {}\n",
            process_memory_kb()
                .map(format_megabytes)
                .unwrap_or_else(|| "不明".to_string())
        ));
        text.push_str(&format!(
            "- **システムメモリ**: {}\n\n",
            system_memory_kb()
                .map(|(used, total)| format!(
                    "{} / {}",
                    format_megabytes(used),
                    format_megabytes(total)
                ))
                .unwrap_or_else(|| "不明".to_string())
        ));

        text.push_str("## 会話情報\n");
        text.push_str(&format!(
            "- **このチャンネルでの会話数**: {}\n",
            self.history.get_history_length(conversation_id)
        ));
        text.push_str(&format!(
            "- **接続サーバー数**: {}\n",
            self.stats.guild_count()
        ));
        text
    }
}

/// Formats a duration as `N日 N時間 N分 N秒`.
pub fn format_uptime(uptime: Duration) -> String {
    let seconds = uptime.as_secs();
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    format!(
        "{}日 {}時間 {}分 {}秒",
        days,
        hours % 24,
        minutes % 60,
        seconds % 60
    )
}

/// Resident set size of this process in kB, where `/proc` is available.
fn process_memory_kb() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    proc_field_kb(&status, "VmRSS")
}

/// `(used, total)` system memory in kB, where `/proc` is available.
fn system_memory_kb() -> Option<(u64, u64)> {
    let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
    let total = proc_field_kb(&meminfo, "MemTotal")?;
    let available = proc_field_kb(&meminfo, "MemAvailable")?;
    Some((total.saturating_sub(available), total))
}

/// Reads a `Key:   1234 kB` line from a `/proc` file.
fn proc_field_kb(content: &str, key: &str) -> Option<u64> {
    content.lines().find_map(|line| {
        let value = line.strip_prefix(key)?.strip_prefix(':')?;
        value.split_whitespace().next()?.parse().ok()
    })
}

fn format_megabytes(kb: u64) -> String {
    format!("{:.1} MB", kb as f64 / 1024.0)
}
