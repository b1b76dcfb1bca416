/// Failures scoped to one tool invocation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters for {tool}: {message}")]
    InvalidParameters { tool: String, message: String },
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Tool '{tool}' is disabled in {mode} mode")]
    ToolDisabledForMode { tool: String, mode: String },
    #[error("Command blocked by blacklist: {0}")]
    CommandBlacklisted(String),
    #[error("{0}")]
    FeatureUnavailable(String),
    #[error("{0}")]
    Execution(String),
    #[error("Tool '{0}' is already registered")]
    DuplicateRegistration(String),
}

impl ToolError {
    pub fn execution(message: impl Into<String>) -> Self {
        ToolError::Execution(message.into())
    }
}
