//! CLI command implementations, one module per subcommand.

pub mod auth;
pub mod ls;
pub mod watch;

use std::path::PathBuf;

use driveup_core::config::Config;
use driveup_drive::auth::DriveAuthenticator;

/// Builds the authenticator from the config, honoring optional per-command
/// overrides for the secrets and token cache paths.
pub fn authenticator(
    config: &Config,
    secrets: Option<&PathBuf>,
    token_cache: Option<&PathBuf>,
) -> DriveAuthenticator {
    DriveAuthenticator::new(
        secrets.unwrap_or(&config.auth.client_secrets),
        token_cache.unwrap_or(&config.auth.token_cache),
        config.auth.scopes.clone(),
    )
}
