//! # Tool System
//!
//! Two built-in tools, `command` and `web_search`, invoked by the model
//! through the tag grammar parsed in [`parser`]. Host capabilities
//! (process spawning, the search API) sit behind [`CommandRunner`] and
//! [`SearchBackend`] so each host decides what is actually available.

pub mod command;
pub mod executor;
pub mod parser;
pub mod registry;
pub mod traits;
pub mod types;
pub mod web_search;

pub use command::{CommandRunner, CommandTool, ProcessCommandRunner, UnavailableCommandRunner};
pub use executor::ToolExecutor;
pub use parser::{SplitText, ToolUseParser};
pub use registry::{ToolError, ToolRegistration, ToolRegistry};
pub use traits::Tool;
pub use types::{
    ProgressPhase, ProgressSink, ToolContext, ToolExecutionResult, ToolInvocation, ToolName,
    ToolOutput, ToolParams, ToolProgress,
};
pub use web_search::{BraveSearchBackend, SearchBackend, SearchResult, WebSearchTool};

use std::sync::Arc;

/// Registry holding both built-in tools
pub fn build_builtin_registry(
    runner: Arc<dyn CommandRunner>,
    search: Arc<dyn SearchBackend>,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(CommandTool::new(runner))?;
    registry.register(WebSearchTool::new(search))?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_orders_command_first() {
        let registry = build_builtin_registry(
            Arc::new(UnavailableCommandRunner),
            Arc::new(BraveSearchBackend::default()),
        )
        .unwrap();
        assert_eq!(registry.tool_names(), vec!["command", "web_search"]);
        let described = registry.describe_all(&["web_search"]);
        assert!(described.starts_with("## web_search"));
        assert!(!described.contains("## command"));
    }
}
