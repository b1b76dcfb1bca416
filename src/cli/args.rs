//! CLI argument parsing and configuration

use clap::{Parser, Subcommand};
use companion_core::ChatMode;
use std::path::PathBuf;

/// Main CLI structure for companion
#[derive(Parser, Debug)]
#[command(
    name = "companion",
    version,
    about = "Chat with an LLM that can run approved shell commands and web searches"
)]
pub struct Cli {
    /// Configuration file path; defaults to companion.toml lookup
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding settings.json and chat history
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Disable color output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat (default)
    Chat {
        /// Chat mode: action or walkthrough
        #[arg(long)]
        mode: Option<ChatMode>,

        /// Resume a saved session by id
        #[arg(long)]
        session: Option<String>,
    },

    /// List saved chat sessions, newest first
    Sessions,

    /// Delete a saved chat session
    Delete {
        /// Session id as shown by `sessions`
        session_id: String,
    },

    /// Show where settings live and their effective values (keys masked)
    Settings,

    /// Write a default companion.toml in the current directory
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Chat {
            mode: None,
            session: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_accepts_mode_and_session() {
        let cli = Cli::parse_from(["companion", "chat", "--mode", "walkthrough", "--session", "abc"]);
        match cli.command {
            Some(Commands::Chat { mode, session }) => {
                assert_eq!(mode, Some(ChatMode::Walkthrough));
                assert_eq!(session.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn bare_invocation_defaults_to_chat() {
        let cli = Cli::parse_from(["companion", "--no-color"]);
        assert!(cli.no_color);
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Commands::Chat { mode: None, session: None }
        ));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["companion", "chat", "--mode", "auto"]).is_err());
    }
}
