//! Core trait for the tool system

use async_trait::async_trait;

use super::registry::ToolError;
use super::types::{ToolContext, ToolOutput, ToolParams};

/// A tool the model can invoke through the tag grammar
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tag name the model uses to call the tool
    fn name(&self) -> &'static str;

    /// Capability description placed in the system prompt
    fn description(&self) -> &'static str;

    /// Check parameters before execution
    fn validate_args(&self, _params: &ToolParams) -> Result<(), ToolError> {
        Ok(())
    }

    async fn execute(
        &self,
        params: &ToolParams,
        context: &ToolContext,
    ) -> Result<ToolOutput, ToolError>;
}

/// Fetch a required, non-blank parameter
pub fn required_param<'a>(
    tool: &str,
    params: &'a ToolParams,
    key: &str,
) -> Result<&'a str, ToolError> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ToolError::InvalidParameters {
            tool: tool.to_string(),
            message: format!("missing required parameter '{}'", key),
        })
}
