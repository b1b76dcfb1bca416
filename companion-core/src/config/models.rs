//! Provider and chat-mode identifiers shared by settings, the provider
//! adapter and the orchestrator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::constants::{env_vars, models, providers};

/// Error returned when a provider or mode string is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelParseError {
    #[error("Unknown provider: {0}")]
    InvalidProvider(String),
    #[error("Unknown chat mode: {0}")]
    InvalidMode(String),
}

/// Supported LLM providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions
    #[default]
    OpenAI,
    /// Anthropic messages API (stored as `claude` in settings)
    Claude,
    /// OpenRouter, OpenAI-compatible surface
    OpenRouter,
    /// Google Gemini content generation
    Gemini,
    /// xAI Grok, OpenAI-compatible surface
    XAI,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => providers::OPENAI,
            Provider::Claude => providers::CLAUDE,
            Provider::OpenRouter => providers::OPENROUTER,
            Provider::Gemini => providers::GEMINI,
            Provider::XAI => providers::XAI,
        }
    }

    /// Human readable name used in error output
    pub fn display_name(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OpenAI",
            Provider::Claude => "Anthropic",
            Provider::OpenRouter => "OpenRouter",
            Provider::Gemini => "Gemini",
            Provider::XAI => "xAI",
        }
    }

    /// Environment variables checked, in order, when no key is configured
    pub fn api_key_envs(&self) -> &'static [&'static str] {
        match self {
            Provider::OpenAI => &[env_vars::OPENAI_API_KEY],
            Provider::Claude => &[env_vars::ANTHROPIC_API_KEY],
            Provider::OpenRouter => &[env_vars::OPENROUTER_API_KEY],
            Provider::Gemini => &[env_vars::GEMINI_API_KEY, env_vars::GOOGLE_API_KEY],
            Provider::XAI => &[env_vars::XAI_API_KEY],
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAI => models::openai::DEFAULT_MODEL,
            Provider::Claude => models::anthropic::DEFAULT_MODEL,
            Provider::OpenRouter => models::openrouter::DEFAULT_MODEL,
            Provider::Gemini => models::google::DEFAULT_MODEL,
            Provider::XAI => models::xai::DEFAULT_MODEL,
        }
    }

    pub fn all_providers() -> Vec<Provider> {
        vec![
            Provider::OpenAI,
            Provider::Claude,
            Provider::OpenRouter,
            Provider::Gemini,
            Provider::XAI,
        ]
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "claude" | "anthropic" => Ok(Provider::Claude),
            "openrouter" | "open_router" => Ok(Provider::OpenRouter),
            "gemini" | "google" => Ok(Provider::Gemini),
            "xai" | "grok" => Ok(Provider::XAI),
            _ => Err(ModelParseError::InvalidProvider(s.to_string())),
        }
    }
}

/// Chat mode; each mode carries its own tool enablement and auto-approve maps
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatMode {
    /// The assistant carries out tasks directly
    #[default]
    Action,
    /// The assistant guides the user through a task step by step
    Walkthrough,
}

impl ChatMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatMode::Action => "action",
            ChatMode::Walkthrough => "walkthrough",
        }
    }
}

impl fmt::Display for ChatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChatMode {
    type Err = ModelParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "action" => Ok(ChatMode::Action),
            "walkthrough" => Ok(ChatMode::Walkthrough),
            _ => Err(ModelParseError::InvalidMode(s.to_string())),
        }
    }
}
