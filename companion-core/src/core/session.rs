//! Conversation session and its append-only transcript

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::models::ChatMode;
use crate::config::settings::AppSettings;
use crate::llm::provider::{Message, MessageRole};
use crate::tools::types::ToolInvocation;

const DEFAULT_TITLE: &str = "New chat";
const TITLE_MAX_CHARS: usize = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKind {
    User,
    Ai,
    Error,
    ToolRequest,
    ToolResponse,
    Status,
}

/// One transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnMessage {
    pub id: String,
    pub sender: Sender,
    pub content: String,
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_invocation: Option<ToolInvocation>,
    pub timestamp: DateTime<Utc>,
}

impl TurnMessage {
    fn new(sender: Sender, kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            content: content.into(),
            kind,
            tool_invocation: None,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageKind::User, content)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, MessageKind::Ai, content)
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, MessageKind::Error, content)
    }

    pub fn status(content: impl Into<String>) -> Self {
        Self::new(Sender::Ai, MessageKind::Status, content)
    }

    pub fn tool_request(invocation: ToolInvocation) -> Self {
        let mut message = Self::new(Sender::Ai, MessageKind::ToolRequest, invocation.to_markup());
        message.tool_invocation = Some(invocation);
        message
    }

    pub fn tool_response(invocation: ToolInvocation, content: impl Into<String>) -> Self {
        let mut message = Self::new(Sender::Ai, MessageKind::ToolResponse, content);
        message.tool_invocation = Some(invocation);
        message
    }

    pub fn tool_error(invocation: ToolInvocation, content: impl Into<String>) -> Self {
        let mut message = Self::error(content);
        message.tool_invocation = Some(invocation);
        message
    }

    /// Provider-facing form; `None` for entries that are UI only
    pub fn to_provider_message(&self) -> Option<Message> {
        match (self.kind, &self.tool_invocation) {
            (MessageKind::User, _) => Some(Message::user(self.content.clone())),
            (MessageKind::Ai, _) => Some(Message::assistant(self.content.clone())),
            (MessageKind::ToolRequest, Some(invocation)) => {
                Some(Message::assistant(invocation.to_markup()))
            }
            (MessageKind::ToolRequest, None) => Some(Message::assistant(self.content.clone())),
            (MessageKind::ToolResponse, Some(invocation)) => Some(Message::user(format!(
                "[{} result]\n{}",
                invocation.name, self.content
            ))),
            (MessageKind::Error, Some(invocation)) => Some(Message::user(format!(
                "[{} error]\n{}",
                invocation.name, self.content
            ))),
            _ => None,
        }
    }
}

/// Orchestrator position within a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    #[default]
    Idle,
    AwaitingProviderResponse,
    AwaitingApproval,
    ExecutingTool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    pub session_id: String,
    pub title: String,
    pub mode: ChatMode,
    #[serde(default)]
    messages: Vec<TurnMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pending_approval: Option<ToolInvocation>,
    #[serde(skip)]
    state: TurnState,
    #[serde(skip)]
    settings_snapshot: Option<Arc<AppSettings>>,
    #[serde(skip)]
    tool_rounds: usize,
}

impl ConversationSession {
    pub fn new(mode: ChatMode) -> Self {
        let now = Utc::now();
        Self {
            session_id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            mode,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            pending_approval: None,
            state: TurnState::Idle,
            settings_snapshot: None,
            tool_rounds: 0,
        }
    }

    pub fn messages(&self) -> &[TurnMessage] {
        &self.messages
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state != TurnState::Idle
    }

    pub fn pending_approval(&self) -> Option<&ToolInvocation> {
        self.pending_approval.as_ref()
    }

    /// Transcript in provider form, consecutive same-role entries merged
    pub fn provider_messages(&self) -> Vec<Message> {
        let mut merged: Vec<Message> = Vec::new();
        for message in self.messages.iter().filter_map(TurnMessage::to_provider_message) {
            match merged.last_mut() {
                Some(last) if last.role == message.role => {
                    last.content.push_str("\n\n");
                    last.content.push_str(&message.content);
                }
                _ => merged.push(message),
            }
        }
        // Providers expect the conversation to open with a user turn
        while merged
            .first()
            .is_some_and(|first| first.role != MessageRole::User)
        {
            merged.remove(0);
        }
        merged
    }

    pub(crate) fn append(&mut self, message: TurnMessage) {
        if message.kind == MessageKind::User && self.title == DEFAULT_TITLE {
            self.title = derive_title(&message.content);
        }
        self.updated_at = message.timestamp;
        self.messages.push(message);
    }

    pub(crate) fn set_state(&mut self, state: TurnState) {
        self.state = state;
    }

    pub(crate) fn suspend_for_approval(&mut self, invocation: ToolInvocation) {
        self.pending_approval = Some(invocation);
        self.state = TurnState::AwaitingApproval;
    }

    pub(crate) fn take_pending_approval(&mut self) -> Option<ToolInvocation> {
        self.pending_approval.take()
    }

    pub(crate) fn begin_turn(&mut self, snapshot: Arc<AppSettings>) {
        self.settings_snapshot = Some(snapshot);
        self.tool_rounds = 0;
    }

    pub(crate) fn settings_snapshot(&self) -> Option<Arc<AppSettings>> {
        self.settings_snapshot.clone()
    }

    pub(crate) fn tool_rounds(&self) -> usize {
        self.tool_rounds
    }

    pub(crate) fn record_tool_round(&mut self) {
        self.tool_rounds += 1;
    }

    /// Back to `Idle`, dropping per-turn data
    pub(crate) fn end_turn(&mut self) {
        self.state = TurnState::Idle;
        self.pending_approval = None;
        self.settings_snapshot = None;
        self.tool_rounds = 0;
    }
}

fn derive_title(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default().trim();
    if line.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    if line.chars().count() <= TITLE_MAX_CHARS {
        return line.to_string();
    }
    let truncated: String = line.chars().take(TITLE_MAX_CHARS).collect();
    format!("{}…", truncated.trim_end())
}
