//! System prompt assembly

use std::fs;
use std::path::PathBuf;

use crate::config::models::ChatMode;

const ACTION_PROMPT: &str = r#"You are Companion, an assistant that completes tasks on the user's computer.
Carry out the request directly. When you need information from the machine or the web, call a tool.
After a tool result arrives, continue from it; do not repeat the same call unless the result asks for it."#;

const WALKTHROUGH_PROMPT: &str = r#"You are Companion, an assistant that guides the user through tasks step by step.
Explain each step before it happens and keep steps small. Use a tool only when it helps the user
see the current state of their machine or find information, and explain what the result means."#;

const TOOL_RULES: &str = r#"# Tools
Call a tool by writing its tag block exactly as shown. Use at most one tool block per message,
put any explanation before the block, and stop writing after it. Tool results come back in the
next user message as "[<tool> result]" or "[<tool> error]"."#;

/// Where the assistant is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentContext {
    pub os: String,
    pub os_release: Option<String>,
    pub cwd: Option<PathBuf>,
}

impl EnvironmentContext {
    pub fn detect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            os_release: detect_os_release(),
            cwd: std::env::current_dir().ok(),
        }
    }

    fn render(&self) -> String {
        let os = match &self.os_release {
            Some(release) => format!("{} ({})", self.os, release),
            None => self.os.clone(),
        };
        let cwd = self
            .cwd
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "Unknown".to_string());
        format!("# Environment\n- Operating system: {}\n- Working directory: {}", os, cwd)
    }
}

fn detect_os_release() -> Option<String> {
    if cfg!(target_os = "linux") {
        let content = fs::read_to_string("/etc/os-release").ok()?;
        return content
            .lines()
            .find_map(|line| line.strip_prefix("PRETTY_NAME="))
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty());
    }
    None
}

/// Mode instructions, then tool usage (when any tool is enabled), then environment
pub fn build_system_prompt(
    mode: ChatMode,
    tool_descriptions: &str,
    environment: &EnvironmentContext,
) -> String {
    let mut sections = vec![match mode {
        ChatMode::Action => ACTION_PROMPT.to_string(),
        ChatMode::Walkthrough => WALKTHROUGH_PROMPT.to_string(),
    }];

    let tool_descriptions = tool_descriptions.trim();
    if !tool_descriptions.is_empty() {
        sections.push(format!("{}\n\n{}", TOOL_RULES, tool_descriptions));
    }

    sections.push(environment.render());
    sections.join("\n\n")
}
