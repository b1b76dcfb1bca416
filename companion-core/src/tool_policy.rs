//! Tool approval policy
//!
//! Pure functions over a [`PolicySettings`] snapshot. Precedence for the
//! `command` tool: disabled > blacklist > whitelist > auto-approve > manual
//! approval. Enablement fails open when no settings are available,
//! auto-approval fails closed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::models::ChatMode;
use crate::config::settings::PolicySettings;
use crate::config::constants::{tool_params, tools};
use crate::tools::registry::ToolError;
use crate::tools::types::ToolInvocation;

/// Why an invocation may run without asking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteReason {
    Whitelisted,
    AutoApproved,
}

/// Why an invocation must not run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    ToolDisabled { tool: String, mode: ChatMode },
    CommandBlacklisted { command: String },
}

impl RefusalReason {
    pub fn to_tool_error(&self) -> ToolError {
        match self {
            RefusalReason::ToolDisabled { tool, mode } => ToolError::ToolDisabledForMode {
                tool: tool.clone(),
                mode: mode.to_string(),
            },
            RefusalReason::CommandBlacklisted { command } => {
                ToolError::CommandBlacklisted(command.clone())
            }
        }
    }
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_tool_error())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyDecision {
    Execute(ExecuteReason),
    RequireApproval,
    Refuse(RefusalReason),
}

impl PolicyDecision {
    pub fn label(&self) -> &'static str {
        match self {
            PolicyDecision::Execute(ExecuteReason::Whitelisted) => "whitelisted",
            PolicyDecision::Execute(ExecuteReason::AutoApproved) => "auto_approved",
            PolicyDecision::RequireApproval => "require_approval",
            PolicyDecision::Refuse(RefusalReason::ToolDisabled { .. }) => "tool_disabled",
            PolicyDecision::Refuse(RefusalReason::CommandBlacklisted { .. }) => {
                "command_blacklisted"
            }
        }
    }
}

/// True unless the mode's map explicitly disables the tool
pub fn is_enabled(tool_name: &str, mode: ChatMode, settings: Option<&PolicySettings>) -> bool {
    settings
        .and_then(|settings| settings.enabled_tools(mode).get(tool_name).copied())
        .unwrap_or(true)
}

/// Global flag, then the mode's auto-approve map; false without settings
pub fn should_auto_approve(
    tool_name: &str,
    mode: ChatMode,
    settings: Option<&PolicySettings>,
) -> bool {
    let Some(settings) = settings else {
        return false;
    };
    settings.auto_approve_tools
        || settings
            .auto_approved_tools(mode)
            .get(tool_name)
            .copied()
            .unwrap_or(false)
}

/// Whitelist match on both the raw text and the unquoted form the runner spawns
pub fn is_whitelisted(command: &str, settings: Option<&PolicySettings>) -> bool {
    let Some(settings) = settings else {
        return false;
    };
    let prefixes = &settings.whitelisted_commands;
    matches_any_prefix(command, prefixes)
        && matches_normalized(command, prefixes).unwrap_or(false)
}

/// Blacklist match on either the raw text or the unquoted form the runner spawns
pub fn is_blacklisted(command: &str, settings: Option<&PolicySettings>) -> bool {
    let Some(settings) = settings else {
        return false;
    };
    let prefixes = &settings.blacklisted_commands;
    matches_any_prefix(command, prefixes)
        || matches_normalized(command, prefixes).unwrap_or(false)
}

/// Shell-words split joined by single spaces; `None` when quoting is unbalanced
fn normalize_command(command: &str) -> Option<String> {
    shell_words::split(command).ok().map(|words| words.join(" "))
}

fn matches_normalized(command: &str, prefixes: &[String]) -> Option<bool> {
    let command = normalize_command(command)?;
    let prefixes: Vec<String> = prefixes
        .iter()
        .map(|prefix| normalize_command(prefix).unwrap_or_else(|| prefix.trim().to_string()))
        .collect();
    Some(matches_any_prefix(&command, &prefixes))
}

fn matches_any_prefix(command: &str, prefixes: &[String]) -> bool {
    let command = command.trim();
    prefixes
        .iter()
        .map(|prefix| prefix.trim())
        .filter(|prefix| !prefix.is_empty())
        .any(|prefix| command.starts_with(prefix))
}

/// Combined decision for one invocation
pub fn decide(
    invocation: &ToolInvocation,
    mode: ChatMode,
    settings: Option<&PolicySettings>,
) -> PolicyDecision {
    if !is_enabled(&invocation.name, mode, settings) {
        return PolicyDecision::Refuse(RefusalReason::ToolDisabled {
            tool: invocation.name.clone(),
            mode,
        });
    }

    if invocation.name == tools::COMMAND {
        let command = invocation.param(tool_params::COMMAND).unwrap_or_default();
        if is_blacklisted(command, settings) {
            return PolicyDecision::Refuse(RefusalReason::CommandBlacklisted {
                command: command.trim().to_string(),
            });
        }
        // The runner cannot split it either; never run it unasked
        if normalize_command(command).is_none() {
            return PolicyDecision::RequireApproval;
        }
        if is_whitelisted(command, settings) {
            return PolicyDecision::Execute(ExecuteReason::Whitelisted);
        }
    }

    if should_auto_approve(&invocation.name, mode, settings) {
        return PolicyDecision::Execute(ExecuteReason::AutoApproved);
    }

    PolicyDecision::RequireApproval
}
