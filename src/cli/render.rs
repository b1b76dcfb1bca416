//! Transcript rendering for the terminal

use companion_core::core::{MessageKind, TurnMessage};
use companion_core::llm::error_display::{format_llm_error, style_llm_error};
use companion_core::config::constants::{tool_params, tools};
use companion_core::tools::{ProgressPhase, ToolInvocation, ToolProgress};
use console::style;

/// One-line summary of a tool call
pub fn describe_invocation(invocation: &ToolInvocation) -> String {
    match invocation.name.as_str() {
        tools::COMMAND => {
            let command = invocation.param(tool_params::COMMAND).unwrap_or_default();
            match invocation.param(tool_params::CWD).filter(|cwd| !cwd.trim().is_empty()) {
                Some(cwd) => format!("$ {command}  (in {cwd})"),
                None => format!("$ {command}"),
            }
        }
        tools::WEB_SEARCH => {
            let query = invocation.param(tool_params::QUERY).unwrap_or_default();
            match invocation.param(tool_params::LIMIT) {
                Some(limit) => format!("search \"{query}\" (limit {limit})"),
                None => format!("search \"{query}\""),
            }
        }
        other => other.to_string(),
    }
}

/// Print a transcript entry. User entries are only echoed when replaying
/// a saved session; `provider` labels errors that did not come from a tool.
pub fn print_message(message: &TurnMessage, provider: &str, replay: bool) {
    match message.kind {
        MessageKind::User => {
            if replay {
                println!("{} {}", style(">").green().bold(), message.content);
            }
        }
        MessageKind::Ai => {
            println!("{} {}", style("companion:").yellow().bold(), message.content);
        }
        MessageKind::ToolRequest => {
            let summary = message
                .tool_invocation
                .as_ref()
                .map(describe_invocation)
                .unwrap_or_else(|| message.content.clone());
            println!("{} {}", style("tool:").cyan().bold(), style(summary).cyan());
        }
        MessageKind::ToolResponse => {
            println!("{}", style(message.content.trim_end()).dim());
        }
        MessageKind::Error => match &message.tool_invocation {
            Some(invocation) => println!(
                "{} {}",
                style(format!("{}:", invocation.name)).red().bold(),
                style_llm_error(&message.content)
            ),
            None => println!("{}", format_llm_error(provider, &message.content)),
        },
        MessageKind::Status => println!("{}", style(&message.content).dim()),
    }
}

pub fn print_progress(progress: &ToolProgress) {
    if progress.phase != ProgressPhase::Running {
        return;
    }
    if let Some(message) = &progress.message {
        eprintln!("{}", style(format!("  {message}...")).dim());
    }
}
