//! `command` tool: runs a local program through a [`CommandRunner`]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::process::Command;
use tracing::{debug, info};

use super::registry::ToolError;
use super::traits::{Tool, required_param};
use super::types::{ToolContext, ToolOutput, ToolParams};
use crate::config::constants::{tool_params, tools};

const DESCRIPTION: &str = r#"## command
Run a shell command on the user's machine and read its output.
Usage:
<command>
<command>the command to run</command>
<cwd>optional working directory</cwd>
</command>
Use one command per message. Prefer read-only commands unless the user asked for changes."#;

/// Host capability that actually executes commands
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run_command(&self, command: &str, cwd: Option<&str>) -> Result<String, ToolError>;
}

/// Spawns the program directly (no shell) with arguments split shell-style
#[derive(Debug, Clone, Default)]
pub struct ProcessCommandRunner {
    default_cwd: Option<PathBuf>,
}

impl ProcessCommandRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory used when the invocation names none; the process cwd otherwise
    pub fn with_default_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.default_cwd = Some(cwd.into());
        self
    }

    fn working_dir(&self, requested: Option<&str>) -> Option<PathBuf> {
        let candidate = requested
            .map(PathBuf::from)
            .or_else(|| self.default_cwd.clone())
            .or_else(|| std::env::current_dir().ok())?;
        Path::new(&candidate).is_dir().then_some(candidate)
    }
}

#[async_trait]
impl CommandRunner for ProcessCommandRunner {
    async fn run_command(&self, command: &str, cwd: Option<&str>) -> Result<String, ToolError> {
        let parts = shell_words::split(command)
            .map_err(|e| ToolError::execution(format!("Failed to parse command: {}", e)))?;
        let Some((program, args)) = parts.split_first() else {
            return Err(ToolError::execution("Empty command"));
        };

        let mut cmd = Command::new(program);
        cmd.args(args).kill_on_drop(true);
        let working_dir = self.working_dir(cwd);
        if let Some(dir) = &working_dir {
            cmd.current_dir(dir);
        }

        debug!(
            target = "tools",
            program = %program,
            cwd = ?working_dir,
            "command_spawn"
        );

        let output = cmd
            .output()
            .await
            .map_err(|e| ToolError::execution(format!("Failed to execute command: {}", e)))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if stderr.is_empty() {
            return Ok(stdout);
        }
        if output.status.success() {
            Ok(format!("{}\n\nWarnings:\n{}", stdout, stderr))
        } else {
            Err(ToolError::execution(format!(
                "Command failed with error:\n{}",
                stderr
            )))
        }
    }
}

/// Runner for hosts that cannot spawn processes
#[derive(Debug, Clone, Default)]
pub struct UnavailableCommandRunner;

#[async_trait]
impl CommandRunner for UnavailableCommandRunner {
    async fn run_command(&self, _command: &str, _cwd: Option<&str>) -> Result<String, ToolError> {
        Err(ToolError::FeatureUnavailable(
            "Command execution is only available in the desktop app".to_string(),
        ))
    }
}

pub struct CommandTool {
    runner: Arc<dyn CommandRunner>,
}

impl CommandTool {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl Tool for CommandTool {
    fn name(&self) -> &'static str {
        tools::COMMAND
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn validate_args(&self, params: &ToolParams) -> Result<(), ToolError> {
        required_param(tools::COMMAND, params, tool_params::COMMAND).map(|_| ())
    }

    async fn execute(
        &self,
        params: &ToolParams,
        _context: &ToolContext,
    ) -> Result<ToolOutput, ToolError> {
        let command = required_param(tools::COMMAND, params, tool_params::COMMAND)?;
        let cwd = params
            .get(tool_params::CWD)
            .map(|cwd| cwd.trim())
            .filter(|cwd| !cwd.is_empty());

        info!(target = "tools", cmd = %command, cwd = ?cwd, "command_run");
        let output = self.runner.run_command(command, cwd).await?;

        Ok(ToolOutput::text(output).with_details(json!({
            "command": command,
            "cwd": cwd,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_requires_command() {
        let tool = CommandTool::new(Arc::new(UnavailableCommandRunner));
        let mut params = ToolParams::new();
        assert!(matches!(
            tool.validate_args(&params),
            Err(ToolError::InvalidParameters { .. })
        ));
        params.insert("command".into(), "   ".into());
        assert!(tool.validate_args(&params).is_err());
        params.insert("command".into(), "ls".into());
        assert!(tool.validate_args(&params).is_ok());
    }

    #[tokio::test]
    async fn unavailable_runner_reports_feature_unavailable() {
        let tool = CommandTool::new(Arc::new(UnavailableCommandRunner));
        let mut params = ToolParams::new();
        params.insert("command".into(), "ls".into());
        let err = tool
            .execute(&params, &ToolContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::FeatureUnavailable(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_returns_stdout() {
        let runner = ProcessCommandRunner::new();
        let output = runner.run_command("echo 'hello world'", None).await.unwrap();
        assert_eq!(output.trim(), "hello world");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn process_runner_honours_existing_cwd_and_ignores_missing() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ProcessCommandRunner::new();
        let path = dir.path().to_string_lossy().to_string();

        let output = runner.run_command("pwd", Some(&path)).await.unwrap();
        let reported = std::fs::canonicalize(output.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());

        let fallback = runner
            .run_command("pwd", Some("/definitely/not/here"))
            .await
            .unwrap();
        assert!(!fallback.trim().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_command_with_stderr_is_an_error() {
        let runner = ProcessCommandRunner::new();
        let err = runner
            .run_command("ls /definitely/not/here", None)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Command failed with error:\n"));
    }

    #[tokio::test]
    async fn empty_and_unbalanced_commands_fail() {
        let runner = ProcessCommandRunner::new();
        assert!(runner.run_command("   ", None).await.is_err());
        assert!(runner.run_command("echo 'unterminated", None).await.is_err());
    }
}
