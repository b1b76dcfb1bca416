//! Tool registry: name to implementation, fixed at startup

mod error;

pub use error::{ToolError};

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::traits::Tool;

#[derive(Clone)]
pub struct ToolRegistration {
    name: &'static str,
    tool: Arc<dyn Tool>,
}

impl ToolRegistration {
    pub fn from_tool(tool: Arc<dyn Tool>) -> Self {
        Self {
            name: tool.name(),
            tool,
        }
    }

    pub fn from_tool_instance<T>(tool: T) -> Self
    where
        T: Tool + 'static,
    {
        Self::from_tool(Arc::new(tool))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn tool(&self) -> &Arc<dyn Tool> {
        &self.tool
    }
}

/// Registered tools in registration order; shared behind `Arc` once built
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tool_registrations: Vec<ToolRegistration>,
    tool_lookup: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_tool(&mut self, registration: ToolRegistration) -> Result<(), ToolError> {
        if self.tool_lookup.contains_key(registration.name()) {
            return Err(ToolError::DuplicateRegistration(
                registration.name().to_string(),
            ));
        }

        debug!(target = "tools", tool = registration.name(), "tool_registered");
        let index = self.tool_registrations.len();
        self.tool_lookup.insert(registration.name(), index);
        self.tool_registrations.push(registration);
        Ok(())
    }

    pub fn register<T>(&mut self, tool: T) -> Result<(), ToolError>
    where
        T: Tool + 'static,
    {
        self.register_tool(ToolRegistration::from_tool_instance(tool))
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, ToolError> {
        self.tool_lookup
            .get(name)
            .map(|index| self.tool_registrations[*index].tool().clone())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tool_lookup.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.tool_registrations
            .iter()
            .map(|registration| registration.name())
            .collect()
    }

    /// Capability descriptions of the enabled tools, in registration order
    pub fn describe_all(&self, enabled_names: &[&str]) -> String {
        self.tool_registrations
            .iter()
            .filter(|registration| enabled_names.contains(&registration.name()))
            .map(|registration| registration.tool().description().trim().to_string())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
