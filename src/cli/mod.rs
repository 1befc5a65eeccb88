//! CLI module for the bot binary
//!
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bocchi - a Discord chat bot backed by Gemini
#[derive(Parser, Debug)]
#[command(
    name = "bocchi-bot",
    version,
    about = "Bocchi - a Discord chat bot backed by Gemini",
    long_about = "A Discord chat bot that answers mentions, DMs and thread messages with Gemini,\n\
                  remembering the last few turns of each channel for a short while.\n\n\
                  Run without arguments to connect to Discord.",
    after_help = "EXAMPLES:\n    \
                  bocchi-bot                          # Connect using ./bocchi.toml (or defaults)\n    \
                  bocchi-bot --config prod.toml       # Use a custom config file\n    \
                  bocchi-bot check-config             # Print the resolved configuration"
)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./bocchi.toml when present)
    #[arg(short, long, global = true, env = "BOCCHI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Connect to Discord and serve the health endpoint (default)
    Run,

    /// Validate and print the resolved configuration
    ///
    /// Secrets are referenced by environment variable name only; the
    /// output also reports whether each variable is set.
    CheckConfig,
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
