use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs;
use tracing::{debug, warn};

use crate::config::constants::defaults;
use crate::core::session::ConversationSession;

/// Persistence for finished turns; pending approvals are never written
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Every stored session, most recently updated first
    async fn list_all(&self) -> Result<Vec<ConversationSession>>;

    async fn save(&self, session: &ConversationSession) -> Result<()>;

    /// Remove a session; unknown ids are not an error
    async fn delete(&self, session_id: &str) -> Result<()>;
}

/// One `<session_id>.json` file per session under `chats/`
#[derive(Debug, Clone)]
pub struct JsonChatStore {
    dir: PathBuf,
}

impl JsonChatStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: data_dir.as_ref().join(defaults::CHATS_DIR_NAME),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self, session_id: &str) -> Result<PathBuf> {
        let valid = !session_id.is_empty()
            && session_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        anyhow::ensure!(valid, "Invalid session id: {}", session_id);
        Ok(self.dir.join(format!("{}.json", session_id)))
    }
}

#[async_trait]
impl ChatStore for JsonChatStore {
    async fn list_all(&self) -> Result<Vec<ConversationSession>> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Failed to read chats directory: {}", self.dir.display()));
            }
        };

        let mut sessions = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .context("Failed to read chats directory entry")?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read chat file: {}", path.display()))?;
            match serde_json::from_str::<ConversationSession>(&content) {
                Ok(session) => sessions.push(session),
                Err(err) => warn!(
                    target = "storage",
                    path = %path.display(),
                    error = %err,
                    "chat_parse_failed_skipping"
                ),
            }
        }

        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn save(&self, session: &ConversationSession) -> Result<()> {
        let path = self.session_path(&session.session_id)?;
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create directory: {}", self.dir.display()))?;
        let content =
            serde_json::to_string_pretty(session).context("Failed to serialize chat session")?;
        fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write chat file: {}", path.display()))?;
        debug!(target = "storage", session = %session.session_id, "chat_saved");
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        let path = self.session_path(session_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(target = "storage", session = %session_id, "chat_deleted");
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to delete chat file: {}", path.display()))
            }
        }
    }
}

/// Keeps sessions in memory; used by tests and hosts without a disk
#[derive(Debug, Default)]
pub struct MemoryChatStore {
    sessions: Mutex<HashMap<String, ConversationSession>>,
    saves: Mutex<usize>,
}

impl MemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `save` calls so far
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }

    pub fn get(&self, session_id: &str) -> Option<ConversationSession> {
        self.sessions.lock().get(session_id).cloned()
    }
}

#[async_trait]
impl ChatStore for MemoryChatStore {
    async fn list_all(&self) -> Result<Vec<ConversationSession>> {
        let mut sessions: Vec<_> = self.sessions.lock().values().cloned().collect();
        sessions.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(sessions)
    }

    async fn save(&self, session: &ConversationSession) -> Result<()> {
        self.sessions
            .lock()
            .insert(session.session_id.clone(), session.clone());
        *self.saves.lock() += 1;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<()> {
        self.sessions.lock().remove(session_id);
        Ok(())
    }
}
