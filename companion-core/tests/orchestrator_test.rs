//! Turn state machine driven by a scripted provider and a fake command runner

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use companion_core::config::ProvidersConfig;
use companion_core::core::{MessageKind, TurnState};
use companion_core::llm::{ChatProvider, LLMError, Message, MessageRole, ProviderAdapter};
use companion_core::prompts::EnvironmentContext;
use companion_core::storage::{MemoryChatStore, MemorySettingsStore, SettingsStore};
use companion_core::tool_policy::RefusalReason;
use companion_core::tools::{
    BraveSearchBackend, CommandRunner, ProgressPhase, ProgressSink, SearchBackend, SearchResult,
    ToolError, ToolProgress, build_builtin_registry,
};
use companion_core::{
    AppSettings, ChatMode, ConversationOrchestrator, ConversationSession, Provider, TurnOutcome,
};
use parking_lot::Mutex;

const LS_CALL: &str = "<command>\n<command>ls -la</command>\n</command>";
const SUDO_CALL: &str = "<command>\n<command>sudo apt-get install x</command>\n</command>";
const SEARCH_CALL: &str =
    "<web_search>\n<query>tokio release</query>\n<limit>3</limit>\n</web_search>";

#[derive(Default)]
struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, LLMError>>>,
    requests: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    fn new(replies: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing(error: LLMError) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(VecDeque::from([Err(error)])),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_request(&self) -> Vec<Message> {
        self.requests.lock().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn send(
        &self,
        messages: &[Message],
        _system_prompt: &str,
        _provider: Provider,
        _api_key: &str,
        _model: &str,
    ) -> Result<String, LLMError> {
        self.requests.lock().push(messages.to_vec());
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(LS_CALL.to_string()))
    }
}

#[derive(Default)]
struct FakeRunner {
    commands: Mutex<Vec<String>>,
}

#[async_trait]
impl CommandRunner for FakeRunner {
    async fn run_command(&self, command: &str, _cwd: Option<&str>) -> Result<String, ToolError> {
        self.commands.lock().push(command.to_string());
        Ok("file-a\nfile-b".to_string())
    }
}

/// Records the key and query each search was made with
#[derive(Default)]
struct RecordingSearch {
    calls: Mutex<Vec<(String, u32, String)>>,
}

#[async_trait]
impl SearchBackend for RecordingSearch {
    async fn search(
        &self,
        query: &str,
        limit: u32,
        api_key: &str,
    ) -> Result<Vec<SearchResult>, ToolError> {
        self.calls
            .lock()
            .push((query.to_string(), limit, api_key.to_string()));
        Ok(vec![SearchResult {
            title: "Tokio 1.40".to_string(),
            url: "https://tokio.rs/blog".to_string(),
            description: String::new(),
        }])
    }
}

struct Harness {
    orchestrator: ConversationOrchestrator,
    runner: Arc<FakeRunner>,
    chats: Arc<MemoryChatStore>,
    progress: Arc<Mutex<Vec<ToolProgress>>>,
}

fn settings() -> AppSettings {
    let mut settings = AppSettings::default();
    settings.openai_api_key = "sk-test".to_string();
    settings
}

fn harness(provider: Arc<dyn ChatProvider>, settings: MemorySettingsStore) -> Harness {
    harness_with(
        provider,
        Arc::new(settings),
        Arc::new(BraveSearchBackend::new("http://127.0.0.1:9")),
    )
}

fn harness_with(
    provider: Arc<dyn ChatProvider>,
    settings: Arc<MemorySettingsStore>,
    search: Arc<dyn SearchBackend>,
) -> Harness {
    let runner = Arc::new(FakeRunner::default());
    let chats = Arc::new(MemoryChatStore::new());
    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink_progress = progress.clone();
    let sink: ProgressSink = Arc::new(move |update| sink_progress.lock().push(update));

    let registry = build_builtin_registry(runner.clone(), search).unwrap();
    let orchestrator = ConversationOrchestrator::new(provider, Arc::new(registry), settings)
        .with_chat_store(chats.clone())
        .with_progress_sink(sink)
        .with_environment(EnvironmentContext {
            os: "linux".to_string(),
            os_release: None,
            cwd: Some(PathBuf::from("/home/user")),
        });

    Harness {
        orchestrator,
        runner,
        chats,
        progress,
    }
}

fn kinds(session: &ConversationSession) -> Vec<MessageKind> {
    session.messages().iter().map(|m| m.kind).collect()
}

#[tokio::test]
async fn test_blacklisted_command_is_refused_without_execution() {
    let mut settings = settings();
    settings.policy.blacklisted_commands = vec!["rm -rf".to_string(), "sudo".to_string()];
    settings.policy.auto_approve_tools = true;
    let provider = ScriptedProvider::new(&[SUDO_CALL]);
    let h = harness(provider.clone(), MemorySettingsStore::new(settings));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "install x").await;

    assert_eq!(
        outcome,
        TurnOutcome::Refused(RefusalReason::CommandBlacklisted {
            command: "sudo apt-get install x".to_string()
        })
    );
    assert_eq!(
        kinds(&session),
        vec![MessageKind::User, MessageKind::ToolRequest, MessageKind::Error]
    );
    assert!(session.messages()[2].content.contains("blacklist"));
    assert_eq!(session.state(), TurnState::Idle);
    assert!(h.runner.commands.lock().is_empty());
    assert!(h.progress.lock().is_empty());
    assert_eq!(provider.request_count(), 1);
    assert_eq!(h.chats.save_count(), 1);
}

#[tokio::test]
async fn test_quoted_blacklisted_program_is_still_refused() {
    for command in [
        "\"echo\" pwned",
        "'echo' pwned",
        "ec\"\"ho pwned",
        "\\echo pwned",
        "echo   pwned",
    ] {
        let mut settings = settings();
        settings.policy.blacklisted_commands = vec!["echo".to_string()];
        settings.policy.auto_approve_tools = true;
        let reply = format!("<command>\n<command>{command}</command>\n</command>");
        let provider = ScriptedProvider::new(&[reply.as_str()]);
        let h = harness(provider, MemorySettingsStore::new(settings));
        let mut session = ConversationSession::new(ChatMode::Action);

        let outcome = h.orchestrator.submit(&mut session, "say hi").await;

        assert!(
            matches!(
                outcome,
                TurnOutcome::Refused(RefusalReason::CommandBlacklisted { .. })
            ),
            "{command}: {outcome:?}"
        );
        assert!(h.runner.commands.lock().is_empty(), "{command} ran");
        assert_eq!(session.messages().last().unwrap().kind, MessageKind::Error);
    }
}

#[tokio::test]
async fn test_whitelisted_command_runs_without_approval() {
    let mut settings = settings();
    settings.policy.whitelisted_commands = vec!["ls".to_string()];
    let provider = ScriptedProvider::new(&[LS_CALL, "You have two files."]);
    let h = harness(provider.clone(), MemorySettingsStore::new(settings));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "what is here?").await;

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(h.runner.commands.lock().clone(), vec!["ls -la".to_string()]);
    assert!(session.pending_approval().is_none());
    assert_eq!(
        kinds(&session),
        vec![
            MessageKind::User,
            MessageKind::ToolRequest,
            MessageKind::ToolResponse,
            MessageKind::Ai
        ]
    );
    assert_eq!(session.messages()[2].content, "file-a\nfile-b");
    assert_eq!(session.messages()[3].content, "You have two files.");

    let follow_up = provider.last_request();
    let last = follow_up.last().unwrap();
    assert_eq!(last.role, MessageRole::User);
    assert_eq!(last.content, "[command result]\nfile-a\nfile-b");

    let phases: Vec<_> = h.progress.lock().iter().map(|p| p.phase).collect();
    assert_eq!(phases, vec![ProgressPhase::Running, ProgressPhase::Completed]);
}

#[tokio::test]
async fn test_unmatched_command_waits_for_approval_then_reject() {
    let provider = ScriptedProvider::new(&[LS_CALL]);
    let h = harness(provider.clone(), MemorySettingsStore::new(settings()));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "list files").await;
    let TurnOutcome::AwaitingApproval(invocation) = outcome else {
        panic!("expected approval request, got {outcome:?}");
    };
    assert_eq!(invocation.param("command"), Some("ls -la"));
    assert_eq!(session.state(), TurnState::AwaitingApproval);
    assert_eq!(session.pending_approval(), Some(&invocation));
    assert_eq!(h.chats.save_count(), 0);

    let before = session.messages().len();
    let outcome = h.orchestrator.reject(&mut session).await;

    assert_eq!(outcome, TurnOutcome::Rejected);
    assert_eq!(session.state(), TurnState::Idle);
    assert!(session.pending_approval().is_none());
    assert_eq!(session.messages().len(), before + 1);
    let last = session.messages().last().unwrap();
    assert_eq!(last.kind, MessageKind::Error);
    assert_eq!(last.content, "Tool execution rejected by user");
    assert!(h.runner.commands.lock().is_empty());
    assert_eq!(provider.request_count(), 1);
    assert_eq!(h.chats.save_count(), 1);
}

#[tokio::test]
async fn test_approve_executes_and_continues_the_turn() {
    let first = format!("Let me look.\n{LS_CALL}");
    let provider = ScriptedProvider::new(&[first.as_str(), "Done."]);
    let h = harness(provider.clone(), MemorySettingsStore::new(settings()));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "list files").await;
    assert!(matches!(outcome, TurnOutcome::AwaitingApproval(_)));
    assert_eq!(session.messages()[1].kind, MessageKind::Ai);
    assert_eq!(session.messages()[1].content, "Let me look.");

    let outcome = h.orchestrator.approve(&mut session).await;

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(h.runner.commands.lock().len(), 1);
    assert_eq!(provider.request_count(), 2);
    assert_eq!(session.messages().last().unwrap().content, "Done.");
    assert_eq!(session.state(), TurnState::Idle);
    assert_eq!(h.chats.save_count(), 1);
    assert!(h.chats.get(&session.session_id).is_some());
}

#[tokio::test]
async fn test_submit_while_awaiting_approval_is_ignored() {
    let provider = ScriptedProvider::new(&[LS_CALL]);
    let h = harness(provider.clone(), MemorySettingsStore::new(settings()));
    let mut session = ConversationSession::new(ChatMode::Action);
    h.orchestrator.submit(&mut session, "list files").await;
    let before = session.messages().len();

    let outcome = h.orchestrator.submit(&mut session, "hello?").await;

    assert_eq!(outcome, TurnOutcome::Ignored);
    assert_eq!(session.messages().len(), before);
    assert_eq!(session.state(), TurnState::AwaitingApproval);
    assert_eq!(provider.request_count(), 1);
}

#[tokio::test]
async fn test_disabled_tool_in_walkthrough_mode_is_refused() {
    let mut settings = settings();
    settings.walkthrough_provider = "openai".to_string();
    settings
        .policy
        .walkthrough_tools
        .insert("command".to_string(), false);
    settings.policy.whitelisted_commands = vec!["ls".to_string()];
    let provider = ScriptedProvider::new(&[LS_CALL]);
    let h = harness(provider, MemorySettingsStore::new(settings));
    let mut session = ConversationSession::new(ChatMode::Walkthrough);

    let outcome = h.orchestrator.submit(&mut session, "show files").await;

    assert!(matches!(
        outcome,
        TurnOutcome::Refused(RefusalReason::ToolDisabled {
            mode: ChatMode::Walkthrough,
            ..
        })
    ));
    assert!(h.runner.commands.lock().is_empty());
    assert_eq!(
        session.messages().last().unwrap().content,
        "Tool 'command' is disabled in walkthrough mode"
    );
}

#[tokio::test]
async fn test_multiple_tool_rounds_in_one_turn() {
    let mut settings = settings();
    settings.policy.whitelisted_commands = vec!["ls".to_string()];
    let provider = ScriptedProvider::new(&[LS_CALL, LS_CALL, "Two listings later."]);
    let h = harness(provider.clone(), MemorySettingsStore::new(settings));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "look twice").await;

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(h.runner.commands.lock().len(), 2);
    assert_eq!(provider.request_count(), 3);
    // tool-request (assistant) and tool-response (user) alternate after the prompt
    let roles: Vec<_> = provider.last_request().iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User,
            MessageRole::Assistant,
            MessageRole::User
        ]
    );
}

#[tokio::test]
async fn test_tool_round_limit_aborts_the_turn() {
    let mut settings = settings();
    settings.policy.whitelisted_commands = vec!["ls".to_string()];
    let provider = ScriptedProvider::new(&[]);
    let runner_harness = harness(provider.clone(), MemorySettingsStore::new(settings));
    let orchestrator = runner_harness.orchestrator.with_max_tool_rounds(Some(2));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = orchestrator.submit(&mut session, "loop forever").await;

    assert_eq!(
        outcome,
        TurnOutcome::Failed("Stopped after 2 tool rounds in one turn".to_string())
    );
    assert_eq!(runner_harness.runner.commands.lock().len(), 2);
    assert_eq!(provider.request_count(), 3);
    assert_eq!(session.state(), TurnState::Idle);
    assert_eq!(session.messages().last().unwrap().kind, MessageKind::Error);
}

#[tokio::test]
async fn test_provider_failure_appends_error_and_returns_idle() {
    let provider = ScriptedProvider::failing(LLMError::ProviderHttpError {
        status: 500,
        body: "upstream down".to_string(),
    });
    let h = harness(provider, MemorySettingsStore::new(settings()));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "hello").await;

    assert_eq!(outcome, TurnOutcome::Failed("HTTP 500: upstream down".to_string()));
    assert_eq!(kinds(&session), vec![MessageKind::User, MessageKind::Error]);
    assert!(session.messages()[1].tool_invocation.is_none());
    assert_eq!(session.state(), TurnState::Idle);
    assert_eq!(h.chats.save_count(), 1);

    // UI-only error entries are not replayed to the provider
    assert_eq!(session.provider_messages(), vec![Message::user("hello")]);
}

#[tokio::test]
async fn test_unloaded_settings_fail_the_turn() {
    let provider = ScriptedProvider::new(&["never sent"]);
    let h = harness(provider.clone(), MemorySettingsStore::unloaded());
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "hello").await;

    let TurnOutcome::Failed(message) = outcome else {
        panic!("expected failure, got {outcome:?}");
    };
    assert!(message.starts_with("Settings not loaded"));
    assert_eq!(provider.request_count(), 0);
    assert_eq!(session.state(), TurnState::Idle);
    assert_eq!(session.messages().last().unwrap().kind, MessageKind::Error);
}

#[tokio::test]
async fn test_missing_api_key_is_reported_by_the_adapter() {
    let mut settings = AppSettings::default();
    settings.action_provider = "xai".to_string();
    settings.action_model = "grok-2-latest".to_string();
    let adapter = ProviderAdapter::new(ProvidersConfig {
        xai_base_url: Some("http://127.0.0.1:9".to_string()),
        ..ProvidersConfig::default()
    });
    let h = harness(Arc::new(adapter), MemorySettingsStore::new(settings));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "hello").await;

    // XAI_API_KEY in the environment would turn this into a network error instead
    if std::env::var("XAI_API_KEY").map(|v| v.trim().is_empty()).unwrap_or(true) {
        assert_eq!(
            outcome,
            TurnOutcome::Failed("No API key configured for xAI".to_string())
        );
    } else {
        assert!(matches!(outcome, TurnOutcome::Failed(_)));
    }
    assert_eq!(session.state(), TurnState::Idle);
}

#[tokio::test]
async fn test_unknown_provider_in_settings_fails_the_turn() {
    let mut settings = settings();
    settings.action_provider = "mystery".to_string();
    let provider = ScriptedProvider::new(&["unused"]);
    let h = harness(provider.clone(), MemorySettingsStore::new(settings));
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "hello").await;

    assert_eq!(
        outcome,
        TurnOutcome::Failed("Invalid request: Unknown provider: mystery".to_string())
    );
    assert_eq!(provider.request_count(), 0);
}

#[tokio::test]
async fn test_settings_change_during_approval_does_not_affect_the_turn() {
    let store = Arc::new(MemorySettingsStore::new(settings()));
    let provider = ScriptedProvider::new(&[LS_CALL, "Done.", LS_CALL]);
    let h = harness_with(
        provider.clone(),
        store.clone(),
        Arc::new(BraveSearchBackend::new("http://127.0.0.1:9")),
    );
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "list files").await;
    assert!(matches!(outcome, TurnOutcome::AwaitingApproval(_)));

    let mut stricter = settings();
    stricter.policy.blacklisted_commands = vec!["ls".to_string()];
    store.set(stricter).unwrap();

    // The turn keeps the settings it started with
    let outcome = h.orchestrator.approve(&mut session).await;
    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(h.runner.commands.lock().clone(), vec!["ls -la".to_string()]);

    // The next turn sees the new blacklist
    let outcome = h.orchestrator.submit(&mut session, "again").await;
    assert!(matches!(
        outcome,
        TurnOutcome::Refused(RefusalReason::CommandBlacklisted { .. })
    ));
    assert_eq!(h.runner.commands.lock().len(), 1);
}

#[tokio::test]
async fn test_web_search_uses_the_search_key_from_settings() {
    let mut settings = settings();
    settings.brave_search_api_key = "brave-from-settings".to_string();
    settings.policy.auto_approve_tools = true;
    let search = Arc::new(RecordingSearch::default());
    let provider = ScriptedProvider::new(&[SEARCH_CALL, "Tokio 1.40 is out."]);
    let h = harness_with(
        provider.clone(),
        Arc::new(MemorySettingsStore::new(settings)),
        search.clone(),
    );
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "any tokio news?").await;

    assert_eq!(outcome, TurnOutcome::Completed);
    assert_eq!(
        search.calls.lock().clone(),
        vec![(
            "tokio release".to_string(),
            3,
            "brave-from-settings".to_string()
        )]
    );
    let response = &session.messages()[2];
    assert_eq!(response.kind, MessageKind::ToolResponse);
    assert!(response.content.contains("1. [Tokio 1.40](https://tokio.rs/blog)"));
    let follow_up = provider.last_request();
    assert!(
        follow_up
            .last()
            .unwrap()
            .content
            .starts_with("[web_search result]\n")
    );
}

#[tokio::test]
async fn test_search_key_change_during_approval_keeps_turn_key() {
    let mut original = settings();
    original.brave_search_api_key = "key-at-turn-start".to_string();
    let store = Arc::new(MemorySettingsStore::new(original.clone()));
    let search = Arc::new(RecordingSearch::default());
    let provider = ScriptedProvider::new(&[SEARCH_CALL, "Done."]);
    let h = harness_with(provider, store.clone(), search.clone());
    let mut session = ConversationSession::new(ChatMode::Action);

    let outcome = h.orchestrator.submit(&mut session, "search please").await;
    assert!(matches!(outcome, TurnOutcome::AwaitingApproval(_)));

    let mut rotated = original;
    rotated.brave_search_api_key = "rotated-key".to_string();
    store.set(rotated).unwrap();

    let outcome = h.orchestrator.approve(&mut session).await;

    assert_eq!(outcome, TurnOutcome::Completed);
    let calls = search.calls.lock().clone();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].2, "key-at-turn-start");
}
