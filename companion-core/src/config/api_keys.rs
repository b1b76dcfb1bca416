//! API key retrieval: values stored in `settings.json` win, then environment
//! variables (including those loaded from a `.env` file).

use anyhow::Result;
use std::env;
use tracing::{debug, warn};

/// Load environment variables from a `.env` file in the current directory.
///
/// A missing file is not an error; a malformed one is logged and skipped.
pub fn load_dotenv() -> Result<()> {
    match dotenvy::dotenv() {
        Ok(path) => {
            debug!(target = "config", path = %path.display(), "dotenv_loaded");
            Ok(())
        }
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => {
            warn!(target = "config", error = %e, "dotenv_load_failed");
            Ok(())
        }
    }
}

/// Resolve a key from the configured value, then the listed environment
/// variables in order. Blank values count as missing.
pub fn resolve_key(configured: &str, env_vars: &[&str]) -> Option<String> {
    let configured = configured.trim();
    if !configured.is_empty() {
        return Some(configured.to_string());
    }

    env_vars.iter().find_map(|name| {
        env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Mask a secret for display, keeping the last four characters
pub fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.is_empty() {
        return String::new();
    }
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{}", tail)
}
