//! Application settings as persisted in `settings.json`.
//!
//! The document keeps the field names of the desktop application so existing
//! settings files load unchanged. Policy fields are grouped in
//! [`PolicySettings`] and flattened into the top-level object.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::api_keys;
use super::constants::{defaults, env_vars, models, providers, tools};
use super::models::{ChatMode, ModelParseError, Provider};

/// Tool approval policy snapshot consumed by [`crate::tool_policy`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySettings {
    /// Approve every tool invocation without asking
    #[serde(default)]
    pub auto_approve_tools: bool,
    /// Tool availability in walkthrough mode
    #[serde(default)]
    pub walkthrough_tools: HashMap<String, bool>,
    /// Tool availability in action mode
    #[serde(default)]
    pub action_tools: HashMap<String, bool>,
    /// Per-tool auto approval in walkthrough mode
    #[serde(default)]
    pub auto_approve_walkthrough: HashMap<String, bool>,
    /// Per-tool auto approval in action mode
    #[serde(default)]
    pub auto_approve_action: HashMap<String, bool>,
    /// Command prefixes that run without approval
    #[serde(default)]
    pub whitelisted_commands: Vec<String>,
    /// Command prefixes that never run
    #[serde(default)]
    pub blacklisted_commands: Vec<String>,
}

impl PolicySettings {
    /// Per-mode tool enablement map
    pub fn enabled_tools(&self, mode: ChatMode) -> &HashMap<String, bool> {
        match mode {
            ChatMode::Action => &self.action_tools,
            ChatMode::Walkthrough => &self.walkthrough_tools,
        }
    }

    /// Per-mode auto-approve map
    pub fn auto_approved_tools(&self, mode: ChatMode) -> &HashMap<String, bool> {
        match mode {
            ChatMode::Action => &self.auto_approve_action,
            ChatMode::Walkthrough => &self.auto_approve_walkthrough,
        }
    }

    fn with_builtin_tools() -> Self {
        let enabled: HashMap<String, bool> = [tools::COMMAND, tools::WEB_SEARCH]
            .iter()
            .map(|name| (name.to_string(), true))
            .collect();
        let manual: HashMap<String, bool> = [tools::COMMAND, tools::WEB_SEARCH]
            .iter()
            .map(|name| (name.to_string(), false))
            .collect();

        Self {
            auto_approve_tools: false,
            walkthrough_tools: enabled.clone(),
            action_tools: enabled,
            auto_approve_walkthrough: manual.clone(),
            auto_approve_action: manual,
            whitelisted_commands: Vec::new(),
            blacklisted_commands: Vec::new(),
        }
    }
}

/// Provider and model chosen for a chat mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSelection {
    pub provider: Provider,
    pub model: String,
}

/// Full settings document: credentials, model selection and tool policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub openai_api_key: String,
    #[serde(default)]
    pub claude_api_key: String,
    #[serde(default)]
    pub open_router_api_key: String,
    #[serde(default)]
    pub gemini_api_key: String,
    #[serde(default)]
    pub xai_api_key: String,
    #[serde(default)]
    pub brave_search_api_key: String,
    #[serde(default = "default_provider")]
    pub walkthrough_provider: String,
    #[serde(default = "default_model")]
    pub walkthrough_model: String,
    #[serde(default = "default_provider")]
    pub action_provider: String,
    #[serde(default = "default_model")]
    pub action_model: String,
    #[serde(flatten)]
    pub policy: PolicySettings,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_provider() -> String {
    providers::OPENAI.to_string()
}

fn default_model() -> String {
    models::openai::DEFAULT_MODEL.to_string()
}

fn default_theme() -> String {
    defaults::DEFAULT_THEME.to_string()
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            claude_api_key: String::new(),
            open_router_api_key: String::new(),
            gemini_api_key: String::new(),
            xai_api_key: String::new(),
            brave_search_api_key: String::new(),
            walkthrough_provider: default_provider(),
            walkthrough_model: default_model(),
            action_provider: default_provider(),
            action_model: default_model(),
            policy: PolicySettings::with_builtin_tools(),
            theme: default_theme(),
        }
    }
}

impl AppSettings {
    /// Provider and model configured for `mode`
    pub fn model_selection(&self, mode: ChatMode) -> Result<ModelSelection, ModelParseError> {
        let (provider, model) = match mode {
            ChatMode::Action => (&self.action_provider, &self.action_model),
            ChatMode::Walkthrough => (&self.walkthrough_provider, &self.walkthrough_model),
        };
        let provider = Provider::from_str(provider)?;
        let model = if model.trim().is_empty() {
            provider.default_model().to_string()
        } else {
            model.trim().to_string()
        };
        Ok(ModelSelection { provider, model })
    }

    /// Key stored for `provider`, falling back to the environment
    pub fn api_key(&self, provider: Provider) -> String {
        let configured = match provider {
            Provider::OpenAI => &self.openai_api_key,
            Provider::Claude => &self.claude_api_key,
            Provider::OpenRouter => &self.open_router_api_key,
            Provider::Gemini => &self.gemini_api_key,
            Provider::XAI => &self.xai_api_key,
        };
        api_keys::resolve_key(configured, provider.api_key_envs()).unwrap_or_default()
    }

    /// Brave search key, falling back to `BRAVE_API_KEY`
    pub fn search_api_key(&self) -> Option<String> {
        api_keys::resolve_key(&self.brave_search_api_key, &[env_vars::BRAVE_API_KEY])
    }

    /// Copy with every credential replaced by a short mask, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for key in [
            &mut copy.openai_api_key,
            &mut copy.claude_api_key,
            &mut copy.open_router_api_key,
            &mut copy.gemini_api_key,
            &mut copy.xai_api_key,
            &mut copy.brave_search_api_key,
        ] {
            *key = api_keys::mask_key(key);
        }
        copy
    }
}
