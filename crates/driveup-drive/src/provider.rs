//! RefreshingDriveStore - IRemoteStore implementation for the Drive API
//!
//! Bridges the [`DriveClient`] to the [`IRemoteStore`] port and keeps
//! the session credential fresh: before each operation the access
//! token's expiry is checked and, when it is about to lapse, the token
//! is refreshed through the [`DriveAuthenticator`] and re-persisted. A
//! long-running monitor keeps uploading past the initial token lifetime
//! without any caller involvement.
//!
//! ## Design Notes
//!
//! - Drive-specific [`DriveError`](crate::DriveError) values are erased
//!   into `anyhow::Error` at the port boundary; the monitor only decides
//!   continuation policy, never error classification.
//! - Operations serialize on an internal mutex. The monitor dispatches
//!   uploads sequentially anyway, so the lock is uncontended in practice.

use std::collections::HashSet;
use std::path::Path;

use driveup_core::ports::remote_store::{IRemoteStore, RemoteItem, Tokens, UploadedFile};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::auth::DriveAuthenticator;
use crate::client::DriveClient;

/// How long before the recorded expiry the access token is renewed.
const REFRESH_MARGIN_SECONDS: i64 = 300;

/// Drive-backed remote store with mid-session token refresh
pub struct RefreshingDriveStore {
    auth: DriveAuthenticator,
    session: Mutex<Session>,
}

/// Mutable session state guarded as one unit
struct Session {
    client: DriveClient,
    tokens: Tokens,
}

impl RefreshingDriveStore {
    /// Creates a store over a freshly authenticated credential
    pub fn new(
        auth: DriveAuthenticator,
        tokens: Tokens,
        allowed_extensions: HashSet<String>,
    ) -> Self {
        let client = DriveClient::new(tokens.access_token.clone(), allowed_extensions);
        Self::with_client(auth, tokens, client)
    }

    /// Creates a store over an existing client (custom base URLs)
    pub fn with_client(auth: DriveAuthenticator, tokens: Tokens, client: DriveClient) -> Self {
        Self {
            auth,
            session: Mutex::new(Session { client, tokens }),
        }
    }

    /// Renews the access token when it is close to expiry.
    ///
    /// Without a refresh token the current access token is kept as-is;
    /// requests will then surface the provider's 401 once it lapses.
    async fn ensure_fresh(&self, session: &mut Session) -> anyhow::Result<()> {
        let margin = chrono::Duration::seconds(REFRESH_MARGIN_SECONDS);
        if !session.tokens.expires_within(margin) {
            return Ok(());
        }

        let Some(refresh_token) = session.tokens.refresh_token.clone() else {
            warn!("Access token is expiring and no refresh token is available");
            return Ok(());
        };

        info!("Access token is expiring, refreshing mid-session");
        let tokens = self.auth.refresh_and_store(&refresh_token).await?;
        session.client.set_access_token(tokens.access_token.clone());
        session.tokens = tokens;
        Ok(())
    }
}

#[async_trait::async_trait]
impl IRemoteStore for RefreshingDriveStore {
    async fn list_children(
        &self,
        folder_id: &str,
        page_size: u32,
    ) -> anyhow::Result<Vec<RemoteItem>> {
        let mut session = self.session.lock().await;
        self.ensure_fresh(&mut session).await?;
        Ok(session.client.list_children(folder_id, page_size).await?)
    }

    async fn upload_file(
        &self,
        folder_id: &str,
        local_path: &Path,
    ) -> anyhow::Result<Option<UploadedFile>> {
        let mut session = self.session.lock().await;
        self.ensure_fresh(&mut session).await?;
        Ok(session.client.upload_file(folder_id, local_path).await?)
    }
}
