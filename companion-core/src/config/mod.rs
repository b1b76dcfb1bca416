//! Configuration: `companion.toml` for host behaviour, `settings.json` for
//! credentials, model selection and tool policy.

pub mod api_keys;
pub mod constants;
pub mod loader;
pub mod models;
pub mod settings;

pub use loader::{
    AgentConfig, CompanionConfig, ConfigManager, LoggingConfig, ProvidersConfig, StorageConfig,
    ToolsConfig,
};
pub use models::{ChatMode, ModelParseError, Provider};
pub use settings::{AppSettings, ModelSelection, PolicySettings};
