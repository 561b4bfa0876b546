//! Driveup Drive - Google Drive API adapter
//!
//! Provides the remote side of driveup:
//! - OAuth2 installed-application authentication with a reusable token
//!   cache persisted as JSON on disk
//! - Typed HTTP client for the Drive v3 API (folder listing, resumable
//!   file upload)
//!
//! ## Modules
//!
//! - [`auth`] - OAuth2 flow components and the token cache
//! - [`client`] - Drive v3 HTTP client
//! - [`provider`] - [`IRemoteStore`](driveup_core::ports::IRemoteStore)
//!   implementation over the client, with mid-session token refresh

pub mod auth;
pub mod client;
pub mod provider;

use thiserror::Error;

/// Errors that can occur during the authentication lifecycle
///
/// Authentication failures are fatal: without a cached, refreshable, or
/// interactively obtainable credential the process cannot proceed with
/// remote operations, so no retry is attempted.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The client secrets file is missing or unreadable
    #[error("Failed to read client secrets from {path}: {source}")]
    Secrets {
        /// Path that was attempted
        path: String,
        /// Underlying I/O or parse error
        #[source]
        source: anyhow::Error,
    },

    /// The token cache file could not be read or written
    #[error("Token cache error at {path}: {source}")]
    Cache {
        /// Path of the token cache file
        path: String,
        /// Underlying I/O or serialization error
        #[source]
        source: anyhow::Error,
    },

    /// The interactive authorization flow failed or was aborted
    #[error("Interactive authorization flow failed: {0}")]
    Flow(#[source] anyhow::Error),

    /// Refreshing the access token failed
    #[error("Token refresh failed: {0}")]
    Refresh(#[source] anyhow::Error),

    /// The local callback listener failed before receiving the grant
    #[error("OAuth callback failed: {0}")]
    Callback(#[source] anyhow::Error),
}

/// Errors that can occur when communicating with the Drive API
///
/// These are non-fatal to the monitoring loop: the offending operation
/// is logged and simply not retried.
#[derive(Debug, Error)]
pub enum DriveError {
    /// The API returned a non-success status code
    #[error("Drive API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body or status description
        message: String,
    },

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A local file slated for upload could not be read
    #[error("Failed to read local file {path}: {source}")]
    LocalFile {
        /// Path of the file that failed to read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}
