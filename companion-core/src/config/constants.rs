/// Provider identifiers as stored in `settings.json`
pub mod providers {
    pub const OPENAI: &str = "openai";
    pub const CLAUDE: &str = "claude";
    pub const OPENROUTER: &str = "openrouter";
    pub const GEMINI: &str = "gemini";
    pub const XAI: &str = "xai";

    pub const ALL: &[&str] = &[OPENAI, CLAUDE, OPENROUTER, GEMINI, XAI];
}

/// Model ID constants used for defaults and provider fallbacks
pub mod models {
    pub mod openai {
        pub const DEFAULT_MODEL: &str = "gpt-4o";
    }

    pub mod anthropic {
        pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
    }

    pub mod openrouter {
        pub const DEFAULT_MODEL: &str = "openai/gpt-4o";
    }

    pub mod google {
        pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
    }

    pub mod xai {
        pub const DEFAULT_MODEL: &str = "grok-2-latest";
    }
}

/// URL constants for API endpoints
pub mod urls {
    pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
    pub const ANTHROPIC_API_BASE: &str = "https://api.anthropic.com/v1";
    pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
    pub const OPENROUTER_API_BASE: &str = "https://openrouter.ai/api/v1";
    pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
    pub const XAI_API_BASE: &str = "https://api.x.ai/v1";
    pub const BRAVE_SEARCH_API_BASE: &str = "https://api.search.brave.com/res/v1";
}

/// Environment variables consulted when a key is missing from settings
pub mod env_vars {
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
    pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const XAI_API_KEY: &str = "XAI_API_KEY";
    pub const BRAVE_API_KEY: &str = "BRAVE_API_KEY";
    pub const LOG_FILTER: &str = "COMPANION_LOG";
}

/// Tool name constants
pub mod tools {
    pub const COMMAND: &str = "command";
    pub const WEB_SEARCH: &str = "web_search";
}

/// Parameter names used inside tool tags
pub mod tool_params {
    pub const COMMAND: &str = "command";
    pub const CWD: &str = "cwd";
    pub const QUERY: &str = "query";
    pub const LIMIT: &str = "limit";
}

/// Default values shared across the crate
pub mod defaults {
    pub const DEFAULT_THEME: &str = "system";
    pub const ANTHROPIC_DEFAULT_MAX_TOKENS: u32 = 4_096;
    pub const WEB_SEARCH_DEFAULT_LIMIT: u32 = 5;
    pub const WEB_SEARCH_MAX_LIMIT: u32 = 20;
    pub const CONFIG_FILE_NAME: &str = "companion.toml";
    pub const DOT_DIR_NAME: &str = ".companion";
    pub const SETTINGS_FILE_NAME: &str = "settings.json";
    pub const CHATS_DIR_NAME: &str = "chats";
    pub const LOG_LEVEL: &str = "warn";
}

/// Wording for transcript entries produced by the orchestrator
pub mod messages {
    pub const APPROVAL_REJECTED: &str = "Tool execution rejected by user";
}
