//! Relovetree CLI - Command-line console for love trees and their clones.

use clap::Parser;
use relovetree_cli::commands;
use relovetree_cli::{App, Cli, Command, Config, Formatter};
use relovetree_domain::UserId;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing (log to stderr)
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run().await {
        // Console failures were already shown as a toast
        if e.is_reported() {
            tracing::debug!("{}", e);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

async fn run() -> relovetree_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load or create config
    let config = match &cli.config {
        Some(path) => Config::load_from(Path::new(path))?,
        None => Config::load().unwrap_or_else(|e| {
            tracing::warn!("Using default configuration: {}", e);
            let cfg = Config::default();
            cfg.save().ok();
            cfg
        }),
    };

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.settings.color;

    // Create formatter
    let formatter = Formatter::new(format, color_enabled);

    let viewer = UserId::new(cli.viewer.clone().unwrap_or_else(|| config.viewer_id.clone()));
    let database = match &cli.database {
        Some(path) => PathBuf::from(path),
        None => config.database()?,
    };
    let app = App::open(config, formatter, viewer, &database)?;

    // Handle commands
    match cli.command {
        Command::List(args) => commands::execute_list(args, &app).await?,
        Command::Check(args) => commands::execute_check(args, &app).await?,
        Command::CheckAll(args) => commands::execute_check_all(args, &app).await?,
        Command::Sync(args) => commands::execute_sync(args, &app).await?,
        Command::Clone(args) => commands::execute_clone(args, &app).await?,
        Command::Delete(args) => commands::execute_delete(args, &app).await?,
        Command::Dump(args) => commands::execute_dump(args, &app).await?,
        Command::Trees(args) => commands::execute_trees(args, &app).await?,
    }

    Ok(())
}
