//! Non-interactive subcommands

use std::path::Path;

use anyhow::{Context, Result, bail};
use console::style;

use companion_core::config::CompanionConfig;
use companion_core::config::constants::defaults;
use companion_core::storage::{ChatStore, SettingsStore};

use super::AppContext;

pub async fn handle_sessions_command(context: &AppContext) -> Result<()> {
    let sessions = context
        .chats
        .list_all()
        .await
        .context("Failed to load chat history")?;

    if sessions.is_empty() {
        println!("{}", style("No saved sessions").dim());
        return Ok(());
    }

    for session in sessions {
        println!(
            "{}  {}  {:<11}  {}",
            style(&session.session_id).cyan(),
            style(session.updated_at.format("%Y-%m-%d %H:%M")).dim(),
            session.mode.as_str(),
            session.title
        );
    }
    Ok(())
}

pub async fn handle_delete_command(context: &AppContext, session_id: &str) -> Result<()> {
    context
        .chats
        .delete(session_id)
        .await
        .with_context(|| format!("Failed to delete session {session_id}"))?;
    println!("{} {}", style("Deleted").green(), session_id);
    Ok(())
}

pub fn handle_settings_command(context: &AppContext) -> Result<()> {
    let settings = context.settings.get().context("Failed to load settings")?;

    println!("{} {}", style("Data directory:").bold(), context.data_dir.display());
    println!("{} {}", style("Settings file:").bold(), context.settings.path().display());
    match context.manager.config_path() {
        Some(path) => println!("{} {}", style("Config file:").bold(), path.display()),
        None => println!("{} {}", style("Config file:").bold(), style("(defaults)").dim()),
    }
    println!();

    let rendered = serde_json::to_string_pretty(&settings.redacted())
        .context("Failed to render settings")?;
    println!("{rendered}");
    Ok(())
}

pub fn handle_init_command(force: bool) -> Result<()> {
    let path = Path::new(defaults::CONFIG_FILE_NAME);
    if path.exists() && !force {
        bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }
    CompanionConfig::create_sample_config(path)?;
    println!("{} {}", style("Wrote").green(), path.display());
    Ok(())
}
