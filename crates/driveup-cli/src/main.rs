//! Driveup CLI - Command-line interface for driveup
//!
//! Provides commands for:
//! - Authenticating with Google Drive (`auth`)
//! - Listing the children of a Drive folder (`ls`)
//! - Watching a local folder and uploading new files (`watch`)

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use driveup_core::config::Config;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{auth::AuthCommand, ls::LsCommand, watch::WatchCommand};

#[derive(Debug, Parser)]
#[command(
    name = "driveup",
    version,
    about = "Watch a local folder and upload new files to Google Drive"
)]
pub struct Cli {
    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Authenticate with Google Drive and cache the credential
    Auth(AuthCommand),
    /// List the children of a Drive folder
    Ls(LsCommand),
    /// Monitor a local folder and upload newly appearing files
    Watch(WatchCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing: -v flags override the configured level
    let filter = match cli.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Auth(cmd) => cmd.execute(&config).await,
        Commands::Ls(cmd) => cmd.execute(&config).await,
        Commands::Watch(cmd) => cmd.execute(&config).await,
    }
}
