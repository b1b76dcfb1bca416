use crate::llm::provider::LLMError;
use crate::tools::registry::ToolError;

/// Errors that abort the current turn; each becomes one `error` entry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("Settings not loaded: {0}")]
    SettingsUnavailable(String),
    #[error(transparent)]
    Provider(#[from] LLMError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("Stopped after {0} tool rounds in one turn")]
    ToolRoundLimit(usize),
}
