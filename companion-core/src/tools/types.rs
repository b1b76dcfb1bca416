//! Common types used across the tool system

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::config::constants::tools;

/// Ordered parameter map, in the order tags appeared in the model output
pub type ToolParams = IndexMap<String, String>;

/// Built-in tool identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    Command,
    WebSearch,
}

impl ToolName {
    pub const ALL: [ToolName; 2] = [ToolName::Command, ToolName::WebSearch];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Command => tools::COMMAND,
            ToolName::WebSearch => tools::WEB_SEARCH,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool call parsed from model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub params: ToolParams,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: ToolParams::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Render back into the tag grammar the model uses
    pub fn to_markup(&self) -> String {
        let mut out = format!("<{}>\n", self.name);
        for (key, value) in &self.params {
            out.push_str(&format!("<{key}>{value}</{key}>\n"));
        }
        out.push_str(&format!("</{}>", self.name));
        out
    }
}

/// Normalized outcome of one execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolExecutionResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ToolExecutionResult {
    pub fn success(output: ToolOutput) -> Self {
        Self {
            success: true,
            result: Some(output.result),
            error: None,
            details: output.details,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            result: None,
            error: Some(error.into()),
            details: None,
        }
    }
}

/// What a tool hands back on success
#[derive(Debug, Clone, PartialEq)]
pub struct ToolOutput {
    pub result: String,
    pub details: Option<Value>,
}

impl ToolOutput {
    pub fn text(result: impl Into<String>) -> Self {
        Self {
            result: result.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressPhase {
    Pending,
    Running,
    Completed,
    Error,
}

/// Transient execution update; never persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolProgress {
    pub phase: ProgressPhase,
    pub message: Option<String>,
    pub percent: Option<u8>,
}

impl ToolProgress {
    pub fn new(phase: ProgressPhase) -> Self {
        Self {
            phase,
            message: None,
            percent: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_percent(mut self, percent: u8) -> Self {
        self.percent = Some(percent.min(100));
        self
    }
}

/// Fire-and-forget progress callback
pub type ProgressSink = Arc<dyn Fn(ToolProgress) + Send + Sync>;

/// Per-turn data a tool may need, taken from the settings snapshot
#[derive(Debug, Clone, Default)]
pub struct ToolContext {
    pub search_api_key: Option<String>,
}
