//! # companion-core
//!
//! Runtime for Companion, a chat client that lets a language model run
//! shell commands and web searches on the user's behalf, subject to an
//! approval policy.
//!
//! ## Architecture Overview
//!
//! - `config/`: `companion.toml` loader, `settings.json` schema, constants.
//! - `llm/`: one `send` call over the OpenAI, Claude, OpenRouter, Gemini and
//!   xAI wire protocols.
//! - `tools/`: tag-grammar parser, registry, executor and the built-in
//!   `command` and `web_search` tools.
//! - `tool_policy`: enable / blacklist / whitelist / auto-approve decisions.
//! - `core/`: sessions and the turn state machine.
//! - `storage/`: settings and chat history persistence.
//!
//! ## Quickstart
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use companion_core::{
//!     ChatMode, ConversationOrchestrator, ConversationSession, JsonSettingsStore,
//!     ProviderAdapter, TurnOutcome,
//! };
//! use companion_core::tools::{BraveSearchBackend, ProcessCommandRunner, build_builtin_registry};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let registry = build_builtin_registry(
//!         Arc::new(ProcessCommandRunner::new()),
//!         Arc::new(BraveSearchBackend::default()),
//!     )?;
//!     let orchestrator = ConversationOrchestrator::new(
//!         Arc::new(ProviderAdapter::default()),
//!         Arc::new(registry),
//!         Arc::new(JsonSettingsStore::new("/tmp/companion")),
//!     );
//!
//!     let mut session = ConversationSession::new(ChatMode::Action);
//!     if let TurnOutcome::AwaitingApproval(_) = orchestrator.submit(&mut session, "list my files").await {
//!         orchestrator.approve(&mut session).await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod llm;
pub mod prompts;
pub mod storage;
pub mod tool_policy;
pub mod tools;

// Re-exports for convenience
pub use config::{AppSettings, ChatMode, CompanionConfig, ConfigManager, PolicySettings, Provider};
pub use crate::core::{
    ConversationOrchestrator, ConversationSession, MessageKind, TurnError, TurnMessage,
    TurnOutcome, TurnState,
};
pub use llm::{ChatProvider, LLMError, ProviderAdapter};
pub use storage::{ChatStore, JsonChatStore, JsonSettingsStore, SettingsStore};
pub use tool_policy::{PolicyDecision, decide};
pub use tools::{ToolError, ToolInvocation, ToolRegistry};
