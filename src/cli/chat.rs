//! Interactive chat loop

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use console::style;
use dialoguer::Confirm;
use tracing::info;

use companion_core::config::ChatMode;
use companion_core::llm::ProviderAdapter;
use companion_core::storage::{ChatStore, SettingsStore};
use companion_core::tools::{
    BraveSearchBackend, CommandRunner, ProcessCommandRunner, ProgressSink,
    UnavailableCommandRunner, build_builtin_registry,
};
use companion_core::{ConversationOrchestrator, ConversationSession, ToolInvocation, TurnOutcome};

use super::AppContext;
use super::render::{describe_invocation, print_message, print_progress};

pub async fn handle_chat_command(
    context: &AppContext,
    mode: Option<ChatMode>,
    session_id: Option<String>,
) -> Result<()> {
    let config = context.config();
    let mut session = match session_id {
        Some(id) => {
            let mut session = load_session(context, &id).await?;
            if let Some(mode) = mode {
                session.mode = mode;
            }
            session
        }
        None => ConversationSession::new(mode.unwrap_or(config.agent.default_mode)),
    };

    let runner: Arc<dyn CommandRunner> = if config.tools.desktop_commands {
        Arc::new(ProcessCommandRunner::new())
    } else {
        Arc::new(UnavailableCommandRunner)
    };
    let search = Arc::new(BraveSearchBackend::new(
        config.providers.brave_search_base_url(),
    ));
    let registry = build_builtin_registry(runner, search).context("Failed to register tools")?;
    let progress: ProgressSink = Arc::new(|update| print_progress(&update));

    let orchestrator = ConversationOrchestrator::new(
        Arc::new(ProviderAdapter::new(config.providers.clone())),
        Arc::new(registry),
        context.settings.clone(),
    )
    .with_chat_store(context.chats.clone())
    .with_max_tool_rounds(config.agent.max_tool_rounds)
    .with_progress_sink(progress);

    info!(target = "orchestrator", session = %session.session_id, mode = %session.mode, "chat_started");
    println!(
        "{} {}",
        style("Companion").cyan().bold(),
        style(format!("({} mode)", session.mode)).dim()
    );
    println!("{}\n", style("Type 'exit' to quit").dim());

    let provider = provider_label(context, session.mode);
    for message in session.messages() {
        print_message(message, &provider, true);
    }

    let mut printed = session.messages().len();
    loop {
        print!("{} ", style(">").green().bold());
        io::stdout().flush().ok();

        let Some(input) = read_line().await? else {
            break;
        };
        let text = input.trim();
        if text.is_empty() {
            continue;
        }
        if matches!(text, "exit" | "quit") {
            break;
        }

        let provider = provider_label(context, session.mode);
        // The user's own line is already on screen
        printed += 1;
        let mut outcome = orchestrator.submit(&mut session, text).await;
        loop {
            for message in session.messages().iter().skip(printed) {
                print_message(message, &provider, false);
            }
            printed = session.messages().len();

            let TurnOutcome::AwaitingApproval(invocation) = outcome else {
                break;
            };
            outcome = if confirm_invocation(&invocation).await? {
                orchestrator.approve(&mut session).await
            } else {
                orchestrator.reject(&mut session).await
            };
        }
        println!();
    }

    if !session.messages().is_empty() {
        println!(
            "{} {}",
            style("Session saved:").dim(),
            style(&session.session_id).dim()
        );
    }
    Ok(())
}

async fn load_session(context: &AppContext, id: &str) -> Result<ConversationSession> {
    let sessions = context
        .chats
        .list_all()
        .await
        .context("Failed to load chat history")?;
    match sessions.into_iter().find(|session| session.session_id == id) {
        Some(session) => Ok(session),
        None => bail!("No saved session with id {}", id),
    }
}

/// Next stdin line, read on the blocking pool; `None` at end of input
async fn read_line() -> Result<Option<String>> {
    tokio::task::spawn_blocking(|| {
        let mut input = String::new();
        let read = io::stdin().read_line(&mut input)?;
        Ok::<_, io::Error>((read > 0).then_some(input))
    })
    .await
    .context("Input task failed")?
    .context("Failed to read input")
}

async fn confirm_invocation(invocation: &ToolInvocation) -> Result<bool> {
    println!(
        "{} {}",
        style("Approval required:").yellow().bold(),
        style(describe_invocation(invocation)).cyan()
    );
    tokio::task::spawn_blocking(|| {
        Confirm::new()
            .with_prompt("Run this tool?")
            .default(false)
            .interact()
    })
    .await
    .context("Approval prompt task failed")?
    .context("Failed to read approval")
}

/// Provider name for error labels; falls back when settings are unreadable
fn provider_label(context: &AppContext, mode: ChatMode) -> String {
    context
        .settings
        .get()
        .ok()
        .and_then(|settings| settings.model_selection(mode).ok())
        .map(|selection| selection.provider.as_str().to_string())
        .unwrap_or_else(|| "companion".to_string())
}
