//! Auth command - runs the OAuth flow and caches the credential
//!
//! Loads the cached token if one is still valid, refreshes an expired
//! one, or opens the browser for the interactive consent flow. The
//! resulting credential is persisted to the token cache file so later
//! `ls` and `watch` invocations skip the browser round trip.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use driveup_core::config::Config;

use super::authenticator;

#[derive(Debug, Args)]
pub struct AuthCommand {
    /// Path to the OAuth client secrets JSON file
    #[arg(long)]
    secrets: Option<PathBuf>,

    /// Path for the reusable token cache
    #[arg(long)]
    token_cache: Option<PathBuf>,
}

impl AuthCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        let auth = authenticator(config, self.secrets.as_ref(), self.token_cache.as_ref());
        let tokens = auth.authenticate().await?;

        println!("Authenticated with Google Drive.");
        println!("Access token expires at {}", tokens.expires_at);
        if tokens.refresh_token.is_some() {
            println!("A refresh token is cached; future runs will not need the browser.");
        }
        Ok(())
    }
}
