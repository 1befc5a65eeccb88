//! TOML-based configuration for the bot
//!
//! Settings are read from `bocchi.toml` (or the path given on the command
//! line). Every field has a default, so a missing file or a partial file is
//! fine. Secrets never live in the file: the config names the environment
//! variables that hold them, and `.env` files are honoured via `dotenvy`.

use crate::chunker::DEFAULT_MAX_CHUNK_LENGTH;
use crate::memory::{
    HistoryLimits, DEFAULT_CONTEXT_WINDOW, DEFAULT_INTERACTION_TIMEOUT_MS,
    DEFAULT_MAX_HISTORY_LENGTH,
};
use crate::types::{BotError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "bocchi.toml";

/// Root configuration structure loaded from bocchi.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub bot: BotSection,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub chunker: ChunkerConfig,

    #[serde(default)]
    pub gemini: GeminiConfig,

    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

// ============= Bot Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSection {
    /// Prefix that marks a message as a command
    #[serde(default = "default_prefix")]
    pub prefix: String,

    /// Environment variable containing the Discord bot token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default)]
    pub persona: PersonaConfig,
}

fn default_prefix() -> String {
    "!".to_string()
}

fn default_token_env() -> String {
    "DISCORD_TOKEN".to_string()
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
            token_env: default_token_env(),
            persona: PersonaConfig::default(),
        }
    }
}

/// Character the bot plays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_name")]
    pub name: String,

    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    #[serde(default = "default_traits")]
    pub traits: Vec<String>,
}

fn default_persona_name() -> String {
    "ボッチー".to_string()
}

fn default_system_prompt() -> String {
    "あなたは「ボッチー」という名前の、少し人見知りだけど親切なアシスタントです。\
     質問には簡潔かつ丁寧な日本語で答えてください。"
        .to_string()
}

fn default_traits() -> Vec<String> {
    vec![
        "会話の文脈を15分間記憶します".to_string(),
        "長い回答は自動的に分割して送信します".to_string(),
        "!search でWeb検索の結果を踏まえて回答します".to_string(),
    ]
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            name: default_persona_name(),
            system_prompt: default_system_prompt(),
            traits: default_traits(),
        }
    }
}

// ============= History Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Turns retained per conversation
    #[serde(default = "default_max_history_length")]
    pub max_history_length: usize,

    /// Trailing turns included in each prompt
    #[serde(default = "default_context_window")]
    pub context_window: usize,

    /// Idle time before a conversation is forgotten
    #[serde(default = "default_interaction_timeout_ms")]
    pub interaction_timeout_ms: u64,
}

fn default_max_history_length() -> usize {
    DEFAULT_MAX_HISTORY_LENGTH
}

fn default_context_window() -> usize {
    DEFAULT_CONTEXT_WINDOW
}

fn default_interaction_timeout_ms() -> u64 {
    DEFAULT_INTERACTION_TIMEOUT_MS
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_history_length: default_max_history_length(),
            context_window: default_context_window(),
            interaction_timeout_ms: default_interaction_timeout_ms(),
        }
    }
}

impl HistoryConfig {
    pub fn limits(&self) -> HistoryLimits {
        HistoryLimits {
            max_history_length: self.max_history_length,
            context_window: self.context_window,
            interaction_timeout_ms: self.interaction_timeout_ms,
        }
    }
}

// ============= Chunker Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkerConfig {
    #[serde(default = "default_max_chunk_length")]
    pub max_length: usize,
}

fn default_max_chunk_length() -> usize {
    DEFAULT_MAX_CHUNK_LENGTH
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_length: default_max_chunk_length(),
        }
    }
}

// ============= Gemini Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Environment variable containing the API key
    #[serde(default = "default_gemini_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_gemini_base")]
    pub base_url: String,

    #[serde(default = "default_gemini_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_k")]
    pub top_k: u32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_gemini_key_env(),
            base_url: default_gemini_base(),
            model: default_gemini_model(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// ============= Search Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_enabled")]
    pub enabled: bool,

    /// Results fetched per query
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Target length of each generated summary, in characters
    #[serde(default = "default_summary_length")]
    pub summary_length: usize,
}

fn default_search_enabled() -> bool {
    true
}

fn default_max_results() -> usize {
    3
}

fn default_summary_length() -> usize {
    200
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: default_search_enabled(),
            max_results: default_max_results(),
            summary_length: default_summary_length(),
        }
    }
}

// ============= Server Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

// ============= Loading =============

impl BotConfig {
    /// Loads configuration from `path`, or from `bocchi.toml` when present.
    ///
    /// An explicit path that cannot be read is an error; a missing default
    /// file falls back to built-in defaults. `PREFIX` and `PORT` environment
    /// variables override the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config_path: Option<PathBuf> = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        let mut config = match config_path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration");
                Self::from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BotError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            BotError::Config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| BotError::Config(format!("Failed to parse: {}", e)))
    }

    /// Applies environment overrides through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(prefix) = lookup("PREFIX").filter(|p| !p.trim().is_empty()) {
            self.bot.prefix = prefix;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| BotError::Config(format!("PORT is not a valid port: {}", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.bot.prefix.trim().is_empty() {
            return Err(BotError::Config("bot.prefix must not be empty".to_string()));
        }
        if self.history.max_history_length == 0 {
            return Err(BotError::Config(
                "history.max_history_length must be at least 1".to_string(),
            ));
        }
        if self.history.context_window == 0 {
            return Err(BotError::Config(
                "history.context_window must be at least 1".to_string(),
            ));
        }
        if self.chunker.max_length == 0 {
            return Err(BotError::Config(
                "chunker.max_length must be at least 1".to_string(),
            ));
        }
        if self.search.max_results == 0 {
            return Err(BotError::Config(
                "search.max_results must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Renders the resolved configuration. Secrets are only referenced by
    /// environment variable name, so nothing sensitive is printed.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| BotError::Config(format!("Failed to serialize: {}", e)))
    }
}

/// Reads a secret from the environment variable named `env_name`.
pub fn resolve_secret(env_name: &str) -> Result<String> {
    match std::env::var(env_name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(BotError::Config(format!(
            "Environment variable {} is not set",
            env_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = BotConfig::default();
        assert_eq!(config.bot.prefix, "!");
        assert_eq!(config.history.max_history_length, 15);
        assert_eq!(config.history.context_window, 5);
        assert_eq!(config.history.interaction_timeout_ms, 900_000);
        assert_eq!(config.chunker.max_length, 2000);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.search.max_results, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = BotConfig::from_toml_str(
            r#"
            [history]
            context_window = 8

            [bot.persona]
            name = "テスト"
            "#,
        )
        .unwrap();
        assert_eq!(config.history.context_window, 8);
        assert_eq!(config.history.max_history_length, 15);
        assert_eq!(config.bot.persona.name, "テスト");
        assert!(!config.bot.persona.system_prompt.is_empty());
    }

    #[test]
    fn test_invalid_toml() {
        let result = BotConfig::from_toml_str("[history\nmax = ");
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [("PREFIX", "?"), ("PORT", "8080")].into();
        let mut config = BotConfig::default();
        config
            .apply_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.bot.prefix, "?");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_bad_port_override() {
        let mut config = BotConfig::default();
        let result = config.apply_overrides(|k| (k == "PORT").then(|| "abc".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = BotConfig::default();
        config.chunker.max_length = 0;
        assert!(config.validate().is_err());

        let mut config = BotConfig::default();
        config.history.context_window = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_history_limits_conversion() {
        let config = BotConfig::default();
        assert_eq!(config.history.limits(), HistoryLimits::default());
    }

    #[test]
    fn test_serialize_roundtrip_is_parseable() {
        let rendered = BotConfig::default().to_toml_string().unwrap();
        assert!(rendered.contains("[history]"));
        assert!(BotConfig::from_toml_str(&rendered).is_ok());
    }

    #[test]
    fn test_resolve_missing_secret() {
        assert!(resolve_secret("BOCCHI_TEST_SECRET_THAT_DOES_NOT_EXIST").is_err());
    }
}
