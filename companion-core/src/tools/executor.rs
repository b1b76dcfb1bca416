use std::sync::Arc;

use tracing::{debug, warn};

use super::registry::ToolRegistry;
use super::types::{
    ProgressPhase, ProgressSink, ToolContext, ToolExecutionResult, ToolInvocation, ToolProgress,
};

/// Runs one invocation against the registry and normalizes the outcome.
/// A failed attempt is final; nothing is retried.
#[derive(Clone)]
pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub async fn execute(
        &self,
        invocation: &ToolInvocation,
        context: &ToolContext,
        on_progress: Option<&ProgressSink>,
    ) -> ToolExecutionResult {
        let emit = |progress: ToolProgress| {
            if let Some(sink) = on_progress {
                sink(progress);
            }
        };

        let tool = match self.registry.lookup(&invocation.name) {
            Ok(tool) => tool,
            Err(err) => {
                warn!(target = "tools", tool = %invocation.name, "tool_unknown");
                emit(ToolProgress::new(ProgressPhase::Error).with_message(err.to_string()));
                return ToolExecutionResult::failure(err.to_string());
            }
        };

        if let Err(err) = tool.validate_args(&invocation.params) {
            debug!(target = "tools", tool = %invocation.name, error = %err, "tool_invalid_params");
            emit(ToolProgress::new(ProgressPhase::Error).with_message(err.to_string()));
            return ToolExecutionResult::failure(err.to_string());
        }

        emit(
            ToolProgress::new(ProgressPhase::Running)
                .with_message(format!("Running {}", invocation.name)),
        );

        match tool.execute(&invocation.params, context).await {
            Ok(output) => {
                debug!(target = "tools", tool = %invocation.name, "tool_completed");
                emit(
                    ToolProgress::new(ProgressPhase::Completed)
                        .with_message(format!("{} completed", invocation.name))
                        .with_percent(100),
                );
                ToolExecutionResult::success(output)
            }
            Err(err) => {
                warn!(target = "tools", tool = %invocation.name, error = %err, "tool_failed");
                emit(ToolProgress::new(ProgressPhase::Error).with_message(err.to_string()));
                ToolExecutionResult::failure(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::registry::ToolError;
    use crate::tools::traits::Tool;
    use crate::tools::types::{ToolOutput, ToolParams};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    struct FlakyTool;

    #[async_trait]
    impl Tool for FlakyTool {
        fn name(&self) -> &'static str {
            "flaky"
        }

        fn description(&self) -> &'static str {
            "fails when asked"
        }

        fn validate_args(&self, params: &ToolParams) -> Result<(), ToolError> {
            crate::tools::traits::required_param("flaky", params, "mode").map(|_| ())
        }

        async fn execute(
            &self,
            params: &ToolParams,
            _context: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            match params.get("mode").map(String::as_str) {
                Some("fail") => Err(ToolError::execution("boom")),
                _ => Ok(ToolOutput::text("ok").with_details(json!({"n": 1}))),
            }
        }
    }

    fn executor() -> ToolExecutor {
        let mut registry = ToolRegistry::new();
        registry.register(FlakyTool).unwrap();
        ToolExecutor::new(Arc::new(registry))
    }

    fn recorder() -> (ProgressSink, Arc<Mutex<Vec<ToolProgress>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: ProgressSink = Arc::new(move |p| sink_seen.lock().push(p));
        (sink, seen)
    }

    #[tokio::test]
    async fn success_reports_running_then_completed() {
        let (sink, seen) = recorder();
        let invocation = ToolInvocation::new("flaky").with_param("mode", "ok");
        let result = executor()
            .execute(&invocation, &ToolContext::default(), Some(&sink))
            .await;

        assert!(result.success);
        assert_eq!(result.result.as_deref(), Some("ok"));
        assert_eq!(result.details, Some(json!({"n": 1})));
        let phases: Vec<_> = seen.lock().iter().map(|p| p.phase).collect();
        assert_eq!(phases, vec![ProgressPhase::Running, ProgressPhase::Completed]);
        assert_eq!(seen.lock()[1].percent, Some(100));
    }

    #[tokio::test]
    async fn failure_reports_error_without_result() {
        let (sink, seen) = recorder();
        let invocation = ToolInvocation::new("flaky").with_param("mode", "fail");
        let result = executor()
            .execute(&invocation, &ToolContext::default(), Some(&sink))
            .await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("boom"));
        assert!(result.result.is_none());
        assert_eq!(seen.lock().last().map(|p| p.phase), Some(ProgressPhase::Error));
    }

    #[tokio::test]
    async fn invalid_params_never_reach_the_tool() {
        let (sink, seen) = recorder();
        let result = executor()
            .execute(&ToolInvocation::new("flaky"), &ToolContext::default(), Some(&sink))
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("missing required parameter 'mode'"));
        let phases: Vec<_> = seen.lock().iter().map(|p| p.phase).collect();
        assert_eq!(phases, vec![ProgressPhase::Error]);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_result() {
        let result = executor()
            .execute(&ToolInvocation::new("nope"), &ToolContext::default(), None)
            .await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Unknown tool: nope"));
    }
}
