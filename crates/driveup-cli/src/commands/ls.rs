//! Ls command - lists the children of a Drive folder
//!
//! A thin wrapper over `DriveClient::list_children`; useful for finding
//! the id of the destination folder before starting `watch`.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use driveup_core::config::Config;
use driveup_drive::client::DriveClient;

use super::authenticator;

#[derive(Debug, Args)]
pub struct LsCommand {
    /// Drive folder id to list
    folder_id: String,

    /// Maximum number of entries to return
    #[arg(long, default_value_t = 10)]
    page_size: u32,

    /// Path to the OAuth client secrets JSON file
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Path for the reusable token cache
    #[arg(long)]
    token_cache: Option<PathBuf>,
}

impl LsCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let auth = authenticator(config, self.secrets.as_ref(), self.token_cache.as_ref());
        let tokens = auth.authenticate().await?;

        let client = DriveClient::new(
            tokens.access_token,
            config.monitor.file_types_to_monitor.clone(),
        );

        let items = client.list_children(&self.folder_id, self.page_size).await?;

        if items.is_empty() {
            println!("Folder {} has no children.", self.folder_id);
            return Ok(());
        }

        for item in items {
            println!("{}  {}  ({})", item.id, item.name, item.kind);
        }
        Ok(())
    }
}
