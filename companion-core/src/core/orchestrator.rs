//! Per-session turn state machine.
//!
//! ```text
//! Idle --submit--> AwaitingProviderResponse
//! AwaitingProviderResponse --plain text--> Idle
//! AwaitingProviderResponse --tool call--> ExecutingTool | AwaitingApproval | Idle (refused)
//! AwaitingApproval --approve--> ExecutingTool
//! AwaitingApproval --reject--> Idle
//! ExecutingTool --result--> AwaitingProviderResponse
//! ```
//!
//! `AwaitingApproval` is the only point where a turn suspends; the host
//! resumes it with [`ConversationOrchestrator::approve`] or
//! [`ConversationOrchestrator::reject`]. Sessions are saved whenever a turn
//! returns to `Idle`.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::error::TurnError;
use super::session::{ConversationSession, TurnMessage, TurnState};
use crate::config::constants::messages;
use crate::config::settings::AppSettings;
use crate::llm::provider::{ChatProvider, LLMError};
use crate::prompts::{EnvironmentContext, build_system_prompt};
use crate::storage::{ChatStore, SettingsStore};
use crate::tool_policy::{self, PolicyDecision, RefusalReason};
use crate::tools::executor::ToolExecutor;
use crate::tools::parser::ToolUseParser;
use crate::tools::registry::ToolRegistry;
use crate::tools::types::{ProgressSink, ToolContext, ToolInvocation};

/// What the host should do after an orchestrator call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model answered in plain text
    Completed,
    /// Waiting on the user for this invocation
    AwaitingApproval(ToolInvocation),
    Refused(RefusalReason),
    Rejected,
    /// The turn was aborted; the message is also in the transcript
    Failed(String),
    /// Nothing happened (busy session, blank input, nothing pending)
    Ignored,
}

pub struct ConversationOrchestrator {
    provider: Arc<dyn ChatProvider>,
    executor: ToolExecutor,
    parser: ToolUseParser,
    settings: Arc<dyn SettingsStore>,
    chats: Option<Arc<dyn ChatStore>>,
    environment: EnvironmentContext,
    max_tool_rounds: Option<usize>,
    progress: Option<ProgressSink>,
}

impl ConversationOrchestrator {
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        registry: Arc<ToolRegistry>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        Self {
            provider,
            parser: ToolUseParser::from_registry(&registry),
            executor: ToolExecutor::new(registry),
            settings,
            chats: None,
            environment: EnvironmentContext::detect(),
            max_tool_rounds: None,
            progress: None,
        }
    }

    pub fn with_chat_store(mut self, chats: Arc<dyn ChatStore>) -> Self {
        self.chats = Some(chats);
        self
    }

    /// Abort a turn once this many tools have run in it
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: Option<usize>) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    pub fn with_progress_sink(mut self, progress: ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_environment(mut self, environment: EnvironmentContext) -> Self {
        self.environment = environment;
        self
    }

    pub fn state(&self, session: &ConversationSession) -> TurnState {
        session.state()
    }

    /// Start a turn with the user's text
    pub async fn submit(&self, session: &mut ConversationSession, text: &str) -> TurnOutcome {
        if session.is_busy() {
            debug!(target = "orchestrator", session = %session.session_id, state = ?session.state(), "submit_ignored_busy");
            return TurnOutcome::Ignored;
        }
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }

        session.append(TurnMessage::user(text));
        session.set_state(TurnState::AwaitingProviderResponse);

        let snapshot = match self.settings.snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                return self
                    .fail(session, TurnError::SettingsUnavailable(err.to_string()))
                    .await;
            }
        };
        info!(target = "orchestrator", session = %session.session_id, mode = %session.mode, "turn_started");

        session.begin_turn(snapshot.clone());
        self.drive(session, snapshot).await
    }

    /// Run the pending invocation and continue the turn
    pub async fn approve(&self, session: &mut ConversationSession) -> TurnOutcome {
        if session.state() != TurnState::AwaitingApproval {
            return TurnOutcome::Ignored;
        }
        let Some(invocation) = session.take_pending_approval() else {
            return TurnOutcome::Ignored;
        };
        let Some(snapshot) = session.settings_snapshot() else {
            return self
                .fail(
                    session,
                    TurnError::SettingsUnavailable("no settings snapshot for this turn".to_string()),
                )
                .await;
        };

        info!(target = "policy", session = %session.session_id, tool = %invocation.name, "tool_approved");
        self.run_tool(session, &snapshot, invocation).await;
        self.drive(session, snapshot).await
    }

    /// Drop the pending invocation and end the turn
    pub async fn reject(&self, session: &mut ConversationSession) -> TurnOutcome {
        if session.state() != TurnState::AwaitingApproval {
            return TurnOutcome::Ignored;
        }
        let Some(invocation) = session.take_pending_approval() else {
            return TurnOutcome::Ignored;
        };

        info!(target = "policy", session = %session.session_id, tool = %invocation.name, "tool_rejected");
        session.append(TurnMessage::tool_error(invocation, messages::APPROVAL_REJECTED));
        self.finish(session, TurnOutcome::Rejected).await
    }

    async fn drive(
        &self,
        session: &mut ConversationSession,
        snapshot: Arc<AppSettings>,
    ) -> TurnOutcome {
        loop {
            session.set_state(TurnState::AwaitingProviderResponse);
            let reply = match self.request_reply(session, &snapshot).await {
                Ok(reply) => reply,
                Err(err) => return self.fail(session, err).await,
            };

            let Some(invocation) = self.parser.parse(&reply) else {
                session.append(TurnMessage::ai(reply.trim()));
                return self.finish(session, TurnOutcome::Completed).await;
            };

            let split = self.parser.split_around_invocation(&reply);
            if !split.before.is_empty() {
                session.append(TurnMessage::ai(split.before));
            }
            session.append(TurnMessage::tool_request(invocation.clone()));

            if let Some(limit) = self.max_tool_rounds {
                if session.tool_rounds() >= limit {
                    return self.fail(session, TurnError::ToolRoundLimit(limit)).await;
                }
            }

            let decision = tool_policy::decide(&invocation, session.mode, Some(&snapshot.policy));
            info!(
                target = "policy",
                session = %session.session_id,
                mode = %session.mode,
                tool = %invocation.name,
                decision = decision.label(),
                "tool_policy_checked"
            );

            match decision {
                PolicyDecision::Refuse(reason) => {
                    let message = TurnError::Tool(reason.to_tool_error()).to_string();
                    session.append(TurnMessage::tool_error(invocation, message));
                    return self.finish(session, TurnOutcome::Refused(reason)).await;
                }
                PolicyDecision::RequireApproval => {
                    session.suspend_for_approval(invocation.clone());
                    return TurnOutcome::AwaitingApproval(invocation);
                }
                PolicyDecision::Execute(_) => {
                    self.run_tool(session, &snapshot, invocation).await;
                }
            }
        }
    }

    async fn request_reply(
        &self,
        session: &ConversationSession,
        snapshot: &AppSettings,
    ) -> Result<String, TurnError> {
        let selection = snapshot
            .model_selection(session.mode)
            .map_err(|err| LLMError::InvalidRequest(err.to_string()))?;
        let api_key = snapshot.api_key(selection.provider);

        let registry = self.executor.registry();
        let enabled: Vec<&str> = registry
            .tool_names()
            .into_iter()
            .filter(|name| tool_policy::is_enabled(name, session.mode, Some(&snapshot.policy)))
            .collect();
        let system_prompt = build_system_prompt(
            session.mode,
            &registry.describe_all(&enabled),
            &self.environment,
        );

        let messages = session.provider_messages();
        debug!(
            target = "orchestrator",
            session = %session.session_id,
            provider = %selection.provider,
            model = %selection.model,
            messages = messages.len(),
            tools = ?enabled,
            "provider_turn"
        );

        let reply = self
            .provider
            .send(
                &messages,
                &system_prompt,
                selection.provider,
                &api_key,
                &selection.model,
            )
            .await?;
        Ok(reply)
    }

    async fn run_tool(
        &self,
        session: &mut ConversationSession,
        snapshot: &AppSettings,
        invocation: ToolInvocation,
    ) {
        session.set_state(TurnState::ExecutingTool);
        let context = ToolContext {
            search_api_key: snapshot.search_api_key(),
        };
        let result = self
            .executor
            .execute(&invocation, &context, self.progress.as_ref())
            .await;

        let message = if result.success {
            TurnMessage::tool_response(invocation, result.result.unwrap_or_default())
        } else {
            TurnMessage::tool_error(invocation, result.error.unwrap_or_default())
        };
        session.append(message);
        session.record_tool_round();
    }

    async fn fail(&self, session: &mut ConversationSession, error: TurnError) -> TurnOutcome {
        let message = error.to_string();
        warn!(target = "orchestrator", session = %session.session_id, error = %message, "turn_failed");
        session.append(TurnMessage::error(message.clone()));
        self.finish(session, TurnOutcome::Failed(message)).await
    }

    async fn finish(&self, session: &mut ConversationSession, outcome: TurnOutcome) -> TurnOutcome {
        session.end_turn();
        if let Some(chats) = &self.chats {
            if let Err(err) = chats.save(session).await {
                warn!(target = "storage", session = %session.session_id, error = %err, "chat_save_failed");
            }
        }
        debug!(target = "orchestrator", session = %session.session_id, outcome = ?outcome, "turn_finished");
        outcome
    }
}
