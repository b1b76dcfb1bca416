//! Companion terminal client

mod cli;

use anyhow::Result;
use clap::Parser;
use companion_core::config::ConfigManager;
use companion_core::config::api_keys;
use companion_core::config::constants::env_vars;
use tracing_subscriber::EnvFilter;

use cli::{AppContext, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let manager = match &args.config {
        Some(path) => ConfigManager::load_from_file(path)?,
        None => ConfigManager::load()?,
    };
    init_tracing(&manager.config().logging.level);
    api_keys::load_dotenv()?;

    if args.no_color {
        console::set_colors_enabled(false);
    }

    let context = AppContext::new(manager, args.data_dir.clone());
    match args.command.unwrap_or_default() {
        Commands::Chat { mode, session } => cli::handle_chat_command(&context, mode, session).await,
        Commands::Sessions => cli::handle_sessions_command(&context).await,
        Commands::Delete { session_id } => cli::handle_delete_command(&context, &session_id).await,
        Commands::Settings => cli::handle_settings_command(&context),
        Commands::Init { force } => cli::handle_init_command(force),
    }
}

/// `COMPANION_LOG`, then `RUST_LOG`, then the configured level; logs go to stderr
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_env(env_vars::LOG_FILTER)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
