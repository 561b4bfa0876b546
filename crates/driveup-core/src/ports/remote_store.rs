//! Remote store port (driven/secondary port)
//!
//! Defines the interface for interacting with the cloud storage backend.
//! The primary implementation targets Google Drive via the Drive v3 API,
//! but the trait is provider-agnostic so the folder monitor never sees
//! provider specifics.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are
//!   adapter-specific and don't need domain-level classification.
//! - `upload_file` returns `Ok(None)` when the local path fails
//!   validation (missing file or extension outside the allow-list).
//!   That is a soft skip, not a failure; callers continue normally.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Tokens
// ============================================================================

/// OAuth tokens received from the cloud provider
///
/// Contains the access token for API requests, an optional refresh token
/// for obtaining new access tokens, and the expiration time. Serialized
/// as JSON when persisted to the reusable token cache file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tokens {
    /// Bearer token for authenticating API requests
    pub access_token: String,
    /// Token for refreshing the access token without user interaction
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
}

impl Tokens {
    /// Returns true if the access token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns true if the access token will expire within the given duration
    pub fn expires_within(&self, duration: chrono::Duration) -> bool {
        Utc::now() + duration >= self.expires_at
    }
}

// ============================================================================
// Port-level DTOs
// ============================================================================

/// A direct child of a remote folder, as returned by `list_children`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Provider-specific item identifier
    pub id: String,
    /// Item name (file or folder name)
    pub name: String,
    /// Provider resource kind (e.g., "drive#file")
    pub kind: String,
}

/// The remote object created by a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFile {
    /// Provider-specific identifier of the created file
    pub id: String,
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for remote storage operations
///
/// The folder monitor only needs `upload_file`; `list_children` is a
/// provided capability for external callers (e.g., the CLI `ls` command)
/// and is not part of the new-file detection contract.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists the non-trashed direct children of a remote folder
    ///
    /// Returns at most `page_size` entries; there is no automatic
    /// pagination in this contract.
    ///
    /// # Arguments
    /// * `folder_id` - Provider identifier of the parent folder
    /// * `page_size` - Maximum number of entries to return
    async fn list_children(
        &self,
        folder_id: &str,
        page_size: u32,
    ) -> anyhow::Result<Vec<RemoteItem>>;

    /// Uploads a local file into a remote folder
    ///
    /// Validates that `local_path` exists and that its extension is in
    /// the configured allow-list; on validation failure this logs and
    /// returns `Ok(None)` without touching the network.
    ///
    /// # Arguments
    /// * `folder_id` - Provider identifier of the destination folder
    /// * `local_path` - Path of the local file to upload
    ///
    /// # Returns
    /// `Some(UploadedFile)` on success, `None` on a validation skip
    async fn upload_file(
        &self,
        folder_id: &str,
        local_path: &Path,
    ) -> anyhow::Result<Option<UploadedFile>>;
}
