//! Command-line interface module
//!
//! Argument parsing plus one handler per subcommand.

pub mod args;
pub mod chat;
pub mod commands;
pub mod render;

pub use args::*;
pub use chat::handle_chat_command;
pub use commands::*;

use std::path::PathBuf;
use std::sync::Arc;

use companion_core::config::{CompanionConfig, ConfigManager};
use companion_core::storage::{JsonChatStore, JsonSettingsStore};

/// Resolved configuration and stores shared by every subcommand
pub struct AppContext {
    pub manager: ConfigManager,
    pub data_dir: PathBuf,
    pub settings: Arc<JsonSettingsStore>,
    pub chats: Arc<JsonChatStore>,
}

impl AppContext {
    pub fn new(manager: ConfigManager, data_dir_override: Option<PathBuf>) -> Self {
        let data_dir =
            data_dir_override.unwrap_or_else(|| manager.config().storage.resolve_data_dir());
        Self {
            settings: Arc::new(JsonSettingsStore::new(&data_dir)),
            chats: Arc::new(JsonChatStore::new(&data_dir)),
            data_dir,
            manager,
        }
    }

    pub fn config(&self) -> &CompanionConfig {
        self.manager.config()
    }
}
