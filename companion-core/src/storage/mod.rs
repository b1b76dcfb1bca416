//! Settings and chat-history persistence

pub mod chat_store;
pub mod settings_store;

pub use chat_store::{ChatStore, JsonChatStore, MemoryChatStore};
pub use settings_store::{JsonSettingsStore, MemorySettingsStore, SettingsStore};
