use crate::config::constants::{defaults, urls};
use crate::config::models::{ChatMode, Provider};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Conversation loop settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentConfig {
    /// Mode used when the CLI does not pass `--mode`
    #[serde(default)]
    pub default_mode: ChatMode,

    /// Upper bound on tool rounds within one turn; unbounded when unset
    #[serde(default)]
    pub max_tool_rounds: Option<usize>,
}

/// Where settings and chat history live
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Data directory override; defaults to the platform data dir
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Effective data directory
    pub fn resolve_data_dir(&self) -> PathBuf {
        if let Some(dir) = &self.data_dir {
            return dir.clone();
        }
        dirs::data_dir()
            .map(|dir| dir.join("companion"))
            .or_else(|| ConfigManager::get_home_dir().map(|home| home.join(defaults::DOT_DIR_NAME)))
            .unwrap_or_else(|| PathBuf::from(defaults::DOT_DIR_NAME))
    }
}

/// Host tool capabilities
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    /// Allow the `command` tool to spawn local processes
    #[serde(default = "default_true")]
    pub desktop_commands: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            desktop_commands: default_true(),
        }
    }
}

/// Base URL overrides for provider endpoints
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai_base_url: Option<String>,
    #[serde(default)]
    pub claude_base_url: Option<String>,
    #[serde(default)]
    pub openrouter_base_url: Option<String>,
    #[serde(default)]
    pub gemini_base_url: Option<String>,
    #[serde(default)]
    pub xai_base_url: Option<String>,
    #[serde(default)]
    pub brave_search_base_url: Option<String>,
}

impl ProvidersConfig {
    /// Base URL for `provider`, override first
    pub fn base_url(&self, provider: Provider) -> String {
        let (override_url, default_url) = match provider {
            Provider::OpenAI => (&self.openai_base_url, urls::OPENAI_API_BASE),
            Provider::Claude => (&self.claude_base_url, urls::ANTHROPIC_API_BASE),
            Provider::OpenRouter => (&self.openrouter_base_url, urls::OPENROUTER_API_BASE),
            Provider::Gemini => (&self.gemini_base_url, urls::GEMINI_API_BASE),
            Provider::XAI => (&self.xai_base_url, urls::XAI_API_BASE),
        };
        non_blank(override_url).unwrap_or_else(|| default_url.to_string())
    }

    pub fn brave_search_base_url(&self) -> String {
        non_blank(&self.brave_search_base_url)
            .unwrap_or_else(|| urls::BRAVE_SEARCH_API_BASE.to_string())
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(|url| url.trim().trim_end_matches('/'))
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Log filter used when neither `COMPANION_LOG` nor `RUST_LOG` is set
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    defaults::LOG_LEVEL.to_string()
}

/// Contents of `companion.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CompanionConfig {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CompanionConfig {
    /// Write the default configuration to `output`
    pub fn create_sample_config<P: AsRef<Path>>(output: P) -> Result<()> {
        let output = output.as_ref();
        let config_content = toml::to_string_pretty(&CompanionConfig::default())
            .context("Failed to serialize default configuration")?;

        fs::write(output, config_content)
            .with_context(|| format!("Failed to write config file: {}", output.display()))?;

        Ok(())
    }
}

/// Loads `companion.toml` from the usual locations
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: CompanionConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration relative to the current directory
    pub fn load() -> Result<Self> {
        Self::load_from_workspace(std::env::current_dir()?)
    }

    fn get_home_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            return Some(PathBuf::from(home));
        }
        dirs::home_dir()
    }

    /// Workspace file, then `.companion/` in the workspace, then the home
    /// directory; defaults when none exist.
    pub fn load_from_workspace(workspace: impl AsRef<Path>) -> Result<Self> {
        let workspace = workspace.as_ref();

        let mut candidates = vec![
            workspace.join(defaults::CONFIG_FILE_NAME),
            workspace
                .join(defaults::DOT_DIR_NAME)
                .join(defaults::CONFIG_FILE_NAME),
        ];
        if let Some(home_dir) = Self::get_home_dir() {
            candidates.push(
                home_dir
                    .join(defaults::DOT_DIR_NAME)
                    .join(defaults::CONFIG_FILE_NAME),
            );
        }

        for path in candidates {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Self {
            config: CompanionConfig::default(),
            config_path: None,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: CompanionConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(Self {
            config,
            config_path: Some(path.to_path_buf()),
        })
    }

    pub fn config(&self) -> &CompanionConfig {
        &self.config
    }

    /// Path of the file the configuration came from, if any
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }
}
