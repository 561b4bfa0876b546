//! Google Drive v3 API client
//!
//! Provides a typed HTTP client for the two Drive operations driveup
//! consumes: listing the children of a folder and uploading a local file
//! into a folder via a resumable upload session.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::collections::HashSet;
//! use driveup_drive::client::DriveClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let allowed: HashSet<String> = [".txt".to_string()].into_iter().collect();
//! let client = DriveClient::new("access-token-here", allowed);
//! let items = client.list_children("folder-id", 10).await?;
//! println!("{} children", items.len());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::Path;

use driveup_core::ports::remote_store::{RemoteItem, UploadedFile};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::DriveError;

/// Base URL for Drive v3 metadata requests
const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive v3 media upload requests
const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

// ============================================================================
// Drive API request/response types
// ============================================================================

/// Metadata body sent when creating an upload session
#[derive(Debug, Serialize)]
struct UploadMetadata<'a> {
    /// File name to create in the destination folder
    name: &'a str,
    /// Destination folder ids (always exactly one here)
    parents: [&'a str; 1],
}

/// Response from the `files.list` endpoint
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileListResponse {
    /// Listed children (absent when the folder is empty)
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// A single file resource from the Drive API
#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
    /// Resource kind, e.g. "drive#file"
    #[serde(default)]
    kind: String,
}

/// Response from completing an upload session
#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for the Google Drive v3 API
///
/// Wraps `reqwest::Client` with bearer authentication and base URL
/// construction, and carries the upload extension allow-list so that
/// validation happens before any network call.
pub struct DriveClient {
    /// The underlying HTTP client
    http: Client,
    /// Base URL for metadata requests
    base_url: String,
    /// Base URL for media upload requests
    upload_base_url: String,
    /// Current OAuth2 access token
    access_token: String,
    /// Lowercase extensions (with leading dot) eligible for upload
    allowed_extensions: HashSet<String>,
}

impl DriveClient {
    /// Creates a new DriveClient with the given access token
    ///
    /// # Arguments
    /// * `access_token` - A valid OAuth2 access token for the Drive API
    /// * `allowed_extensions` - Upload allow-list (lowercase, leading dot)
    pub fn new(access_token: impl Into<String>, allowed_extensions: HashSet<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: DRIVE_BASE_URL.to_string(),
            upload_base_url: DRIVE_UPLOAD_BASE_URL.to_string(),
            access_token: access_token.into(),
            allowed_extensions,
        }
    }

    /// Creates a DriveClient with custom base URLs (useful for testing)
    pub fn with_base_urls(
        access_token: impl Into<String>,
        allowed_extensions: HashSet<String>,
        base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            upload_base_url: upload_base_url.into(),
            access_token: access_token.into(),
            allowed_extensions,
        }
    }

    /// Updates the access token (e.g., after a token refresh)
    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
        debug!("Updated DriveClient access token");
    }

    /// Returns a reference to the current access token
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Creates an authenticated request builder for the given method and path
    ///
    /// Automatically prepends the base URL and adds the Authorization header.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.http
            .request(method, &url)
            .bearer_auth(&self.access_token)
    }

    /// Maps a non-success response into a [`DriveError::Api`]
    async fn api_error(response: Response) -> DriveError {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_string());
        DriveError::Api { status, message }
    }

    // ========================================================================
    // list_children
    // ========================================================================

    /// Lists the non-trashed direct children of a folder
    ///
    /// Issues `GET /files` with a `'{folder_id}' in parents and
    /// trashed=false` query. Returns at most `page_size` entries; callers
    /// that need more must page themselves.
    ///
    /// # Errors
    /// Returns [`DriveError`] on transport or API failure; the caller
    /// decides whether to retry.
    pub async fn list_children(
        &self,
        folder_id: &str,
        page_size: u32,
    ) -> Result<Vec<RemoteItem>, DriveError> {
        let query = format!("'{}' in parents and trashed=false", folder_id);
        let page_size = page_size.to_string();
        debug!(%query, %page_size, "Listing folder children");

        let response = self
            .request(Method::GET, "/files")
            .query(&[
                ("q", query.as_str()),
                ("pageSize", page_size.as_str()),
                ("fields", "nextPageToken, files(id, name, kind)"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let listing: FileListResponse = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;

        let items: Vec<RemoteItem> = listing
            .files
            .into_iter()
            .map(|f| RemoteItem {
                id: f.id,
                name: f.name,
                kind: f.kind,
            })
            .collect();

        for item in &items {
            info!("File: {} (ID: {})", item.name, item.id);
        }

        Ok(items)
    }

    // ========================================================================
    // upload_file
    // ========================================================================

    /// Uploads a local file into a Drive folder
    ///
    /// Validates that the path points at an existing regular file and
    /// that its extension is in the allow-list; either check failing is
    /// a soft skip that logs and returns `Ok(None)` without touching the
    /// network. Otherwise creates a resumable upload session with the
    /// metadata `{name, parents: [folder_id]}` and sends the file bytes
    /// to the session URL.
    ///
    /// # Returns
    /// `Some(UploadedFile)` with the remote id on success, `None` on a
    /// validation skip
    ///
    /// # Errors
    /// Returns [`DriveError`] on any transport or API failure. Callers
    /// decide whether that is fatal (the monitor loop treats it as
    /// non-fatal).
    pub async fn upload_file(
        &self,
        folder_id: &str,
        local_path: &Path,
    ) -> Result<Option<UploadedFile>, DriveError> {
        match tokio::fs::metadata(local_path).await {
            Ok(meta) if meta.is_file() => {}
            _ => {
                warn!("File {} does not exist", local_path.display());
                return Ok(None);
            }
        }

        let extension = local_path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        if !self.allowed_extensions.contains(&extension) {
            warn!("File type '{}' is not monitored", extension);
            return Ok(None);
        }

        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        info!(
            "Uploading file {} to folder {}",
            local_path.display(),
            folder_id
        );

        let data = tokio::fs::read(local_path)
            .await
            .map_err(|source| DriveError::LocalFile {
                path: local_path.display().to_string(),
                source,
            })?;

        let session_url = self.create_upload_session(folder_id, &name).await?;
        let uploaded = self.upload_to_session(&session_url, data).await?;

        info!("File uploaded: {}", uploaded.id);
        Ok(Some(uploaded))
    }

    /// Creates a resumable upload session and returns the session URL
    ///
    /// `POST /upload/drive/v3/files?uploadType=resumable` with the file
    /// metadata as JSON body; the session URL comes back in the
    /// `Location` response header.
    async fn create_upload_session(
        &self,
        folder_id: &str,
        name: &str,
    ) -> Result<String, DriveError> {
        let url = format!("{}/files", self.upload_base_url);
        let metadata = UploadMetadata {
            name,
            parents: [folder_id],
        };

        debug!(name, folder_id, "Creating resumable upload session");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.access_token)
            .query(&[("uploadType", "resumable"), ("fields", "id")])
            .json(&metadata)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let session_url = response
            .headers()
            .get("Location")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| {
                DriveError::InvalidResponse(
                    "upload session response missing Location header".to_string(),
                )
            })?;

        debug!("Upload session created");
        Ok(session_url)
    }

    /// Sends the file bytes to a resumable upload session URL
    ///
    /// The session URL is absolute, so this bypasses the base URL. The
    /// whole payload goes in one PUT; chunked delivery is the session's
    /// concern, not ours.
    async fn upload_to_session(
        &self,
        session_url: &str,
        data: Vec<u8>,
    ) -> Result<UploadedFile, DriveError> {
        let total = data.len();
        debug!(bytes = total, "Sending file content to upload session");

        let response = self
            .http
            .put(session_url)
            .bearer_auth(&self.access_token)
            .header("Content-Length", total.to_string())
            .body(data)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::api_error(response).await);
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(e.to_string()))?;

        Ok(UploadedFile { id: uploaded.id })
    }
}
