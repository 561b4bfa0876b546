//! OAuth2 authentication flow for the Google Drive API
//!
//! Implements the installed-application Authorization Code flow with
//! PKCE (RFC 7636) for a native desktop tool, with a reusable token
//! cache persisted as JSON on disk.
//!
//! ## Components
//!
//! - [`ClientSecrets`] - Parsed OAuth client registration export
//! - [`FileTokenStorage`] - Token cache file (load/store/clear)
//! - [`InstalledFlow`] - OAuth2 challenge/exchange/refresh logic
//! - [`LocalCallbackServer`] - Minimal HTTP server for the OAuth redirect
//! - [`DriveAuthenticator`] - Orchestrates the full authentication lifecycle

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use driveup_core::ports::remote_store::Tokens;
use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    EndpointNotSet, EndpointSet, PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, RefreshToken,
    Scope, TokenResponse, TokenUrl,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::AuthError;

// ============================================================================
// ClientSecrets
// ============================================================================

/// OAuth client identity parsed from the provider's registration export
///
/// Google's console exports installed-application credentials as
/// `{"installed": {"client_id": ..., "client_secret": ..., "auth_uri": ...,
/// "token_uri": ..., "redirect_uris": [...]}}`. Only the fields needed to
/// drive the flow are kept; the file is otherwise opaque.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    /// OAuth client identifier
    pub client_id: String,
    /// OAuth client secret (not user-specific for installed apps)
    pub client_secret: String,
    /// Authorization endpoint
    pub auth_uri: String,
    /// Token endpoint
    pub token_uri: String,
}

/// Wrapper matching the on-disk secrets file shape
#[derive(Debug, Deserialize)]
struct SecretsFile {
    installed: ClientSecrets,
}

impl ClientSecrets {
    /// Loads and parses a client secrets JSON file
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let read = || -> Result<Self> {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file: SecretsFile =
                serde_json::from_str(&content).context("Failed to parse client secrets JSON")?;
            Ok(file.installed)
        };

        read().map_err(|source| AuthError::Secrets {
            path: path.display().to_string(),
            source,
        })
    }
}

// ============================================================================
// FileTokenStorage
// ============================================================================

/// Stores and retrieves OAuth tokens from a JSON file on disk
///
/// The token cache path is caller-supplied; parent directories are
/// created on demand when storing. The file contains secret material
/// and restricting its permissions is a deployment concern.
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Creates a token storage backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads tokens from the cache file
    ///
    /// # Returns
    /// `Some(Tokens)` if the file exists and parses, `None` if it does
    /// not exist yet
    pub fn load(&self) -> Result<Option<Tokens>, AuthError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "No reusable token found");
            return Ok(None);
        }

        let read = || -> Result<Tokens> {
            let content = std::fs::read_to_string(&self.path)?;
            let tokens: Tokens =
                serde_json::from_str(&content).context("Failed to parse cached token JSON")?;
            Ok(tokens)
        };

        match read() {
            Ok(tokens) => {
                debug!(path = %self.path.display(), "Loaded reusable token");
                Ok(Some(tokens))
            }
            Err(source) => Err(AuthError::Cache {
                path: self.path.display().to_string(),
                source,
            }),
        }
    }

    /// Persists tokens to the cache file, creating parent directories
    pub fn store(&self, tokens: &Tokens) -> Result<(), AuthError> {
        let write = || -> Result<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let json = serde_json::to_string_pretty(tokens).context("Failed to serialize tokens")?;
            std::fs::write(&self.path, json)?;
            Ok(())
        };

        write().map_err(|source| AuthError::Cache {
            path: self.path.display().to_string(),
            source,
        })?;

        debug!(path = %self.path.display(), "Stored reusable token");
        Ok(())
    }

    /// Removes the cache file if present
    pub fn clear(&self) -> Result<(), AuthError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Cleared reusable token");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AuthError::Cache {
                path: self.path.display().to_string(),
                source: e.into(),
            }),
        }
    }
}

// ============================================================================
// InstalledFlow
// ============================================================================

/// OAuth2 installed-application flow using the `oauth2` crate
///
/// Handles generating consent URLs with PKCE challenges, exchanging
/// authorization codes for tokens, and refreshing tokens.
pub struct InstalledFlow {
    client: BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>,
    scopes: Vec<String>,
}

impl InstalledFlow {
    /// Creates a new flow from the client secrets and a redirect URI
    pub fn new(secrets: &ClientSecrets, redirect_uri: &str, scopes: &[String]) -> Result<Self> {
        let client = BasicClient::new(ClientId::new(secrets.client_id.clone()))
            .set_client_secret(ClientSecret::new(secrets.client_secret.clone()))
            .set_auth_uri(
                AuthUrl::new(secrets.auth_uri.clone()).context("Invalid authorization URL")?,
            )
            .set_token_uri(TokenUrl::new(secrets.token_uri.clone()).context("Invalid token URL")?)
            .set_redirect_uri(
                RedirectUrl::new(redirect_uri.to_string()).context("Invalid redirect URI")?,
            );

        Ok(Self {
            client,
            scopes: scopes.to_vec(),
        })
    }

    /// Generates a consent URL with a PKCE challenge
    ///
    /// # Returns
    /// A tuple of `(consent_url, csrf_token, pkce_verifier)`. The
    /// `pkce_verifier` must be kept until the code exchange step.
    pub fn generate_auth_url(&self) -> (String, CsrfToken, PkceCodeVerifier) {
        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = self.client.authorize_url(CsrfToken::new_random);

        for scope in &self.scopes {
            auth_request = auth_request.add_scope(Scope::new(scope.clone()));
        }

        let (auth_url, csrf_token) = auth_request.set_pkce_challenge(pkce_challenge).url();

        debug!("Generated consent URL");
        (auth_url.to_string(), csrf_token, pkce_verifier)
    }

    /// Exchanges an authorization code for OAuth tokens
    pub async fn exchange_code(
        &self,
        code: String,
        pkce_verifier: PkceCodeVerifier,
    ) -> Result<Tokens> {
        info!("Exchanging authorization code for tokens");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .context("Failed to exchange authorization code")?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().to_string()),
            expires_at,
        };

        info!("Successfully obtained OAuth tokens");
        Ok(tokens)
    }

    /// Refreshes an expired access token using a refresh token
    ///
    /// Google does not always return a new refresh token on refresh, so
    /// the previous one is carried forward when absent.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<Tokens> {
        info!("Refreshing access token");

        let http_client = reqwest::Client::new();
        let token_result = self
            .client
            .exchange_refresh_token(&RefreshToken::new(refresh_token.to_string()))
            .request_async(&http_client)
            .await
            .context("Failed to refresh token")?;

        let expires_at = token_result
            .expires_in()
            .map(|d| Utc::now() + Duration::seconds(d.as_secs() as i64))
            .unwrap_or_else(|| Utc::now() + Duration::hours(1));

        let tokens = Tokens {
            access_token: token_result.access_token().secret().to_string(),
            refresh_token: token_result
                .refresh_token()
                .map(|t| t.secret().to_string())
                .or_else(|| Some(refresh_token.to_string())),
            expires_at,
        };

        info!("Successfully refreshed access token");
        Ok(tokens)
    }
}

// ============================================================================
// LocalCallbackServer
// ============================================================================

/// Parameters extracted from the OAuth2 callback
#[derive(Debug)]
pub struct CallbackParams {
    /// The authorization code
    pub code: String,
    /// The CSRF state parameter
    pub state: String,
}

/// Minimal HTTP server that listens on localhost for the OAuth2 redirect.
///
/// Binds an ephemeral port on `127.0.0.1` so no fixed port has to be
/// registered; the resulting redirect URI is fed into the consent URL.
/// The server handles exactly one request: once the provider redirects
/// the user's browser back with an authorization code, it responds with
/// a small HTML page and shuts down.
pub struct LocalCallbackServer {
    listener: tokio::net::TcpListener,
    redirect_uri: String,
}

impl LocalCallbackServer {
    /// Binds the callback listener to an ephemeral localhost port
    pub async fn bind() -> Result<Self> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind OAuth callback listener")?;

        let port = listener
            .local_addr()
            .context("Failed to read callback listener address")?
            .port();
        let redirect_uri = format!("http://127.0.0.1:{}/callback", port);

        info!("OAuth callback listener bound on {}", redirect_uri);
        Ok(Self {
            listener,
            redirect_uri,
        })
    }

    /// Returns the redirect URI the provider should send the browser to
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Waits for the OAuth redirect and extracts the grant parameters
    ///
    /// Blocks until the user completes (or aborts) the consent screen
    /// and the provider redirects back to the local listener.
    pub async fn wait_for_grant(self) -> Result<CallbackParams> {
        use http_body_util::Full;
        use hyper::body::Bytes;
        use hyper::server::conn::http1;
        use hyper::service::service_fn;
        use hyper::{Request, Response, StatusCode};
        use hyper_util::rt::TokioIo;
        use tokio::sync::oneshot;

        let (tx, rx) = oneshot::channel::<CallbackParams>();
        let tx = std::sync::Arc::new(tokio::sync::Mutex::new(Some(tx)));

        // Accept a single connection
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection on callback listener")?;

        let io = TokioIo::new(stream);
        let tx_clone = tx.clone();

        let service = service_fn(move |req: Request<hyper::body::Incoming>| {
            let tx_inner = tx_clone.clone();
            async move {
                let uri = req.uri().to_string();
                debug!("Callback listener received request: {}", uri);

                let params = parse_callback_params(&uri);

                match params {
                    Some(callback_params) => {
                        if let Some(sender) = tx_inner.lock().await.take() {
                            let _ = sender.send(callback_params);
                        }

                        let html = success_html();
                        Ok::<_, hyper::Error>(
                            Response::builder()
                                .status(StatusCode::OK)
                                .header("Content-Type", "text/html; charset=utf-8")
                                .body(Full::new(Bytes::from(html)))
                                .unwrap(),
                        )
                    }
                    None => {
                        let html = error_html("Missing authorization code in callback");
                        Ok(Response::builder()
                            .status(StatusCode::BAD_REQUEST)
                            .header("Content-Type", "text/html; charset=utf-8")
                            .body(Full::new(Bytes::from(html)))
                            .unwrap())
                    }
                }
            }
        });

        // Serve the single connection
        tokio::spawn(async move {
            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                warn!("Callback listener connection error: {}", e);
            }
        });

        let params = rx
            .await
            .context("Callback listener closed without receiving a grant")?;

        info!("Received OAuth callback with authorization code");
        Ok(params)
    }
}

/// Parses the authorization code and state from a callback URI
fn parse_callback_params(uri: &str) -> Option<CallbackParams> {
    let url = url::Url::parse(&format!("http://localhost{}", uri)).ok()?;
    let mut code = None;
    let mut state = None;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.to_string()),
            "state" => state = Some(value.to_string()),
            _ => {}
        }
    }

    Some(CallbackParams {
        code: code?,
        state: state.unwrap_or_default(),
    })
}

/// Returns the HTML for a successful authentication page
fn success_html() -> String {
    r#"<!DOCTYPE html>
<html>
<head><title>driveup - Authentication Successful</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
    <h1>Authentication Successful</h1>
    <p>You have been authenticated with Google Drive.</p>
    <p>You can close this window and return to driveup.</p>
    <script>setTimeout(function() { window.close(); }, 3000);</script>
</body>
</html>"#
        .to_string()
}

/// Returns the HTML for an authentication error page
fn error_html(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>driveup - Authentication Error</title></head>
<body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
    <h1>Authentication Error</h1>
    <p>{}</p>
    <p>Please close this window and try again.</p>
</body>
</html>"#,
        message
    )
}

// ============================================================================
// DriveAuthenticator
// ============================================================================

/// High-level authenticator that orchestrates the credential lifecycle.
///
/// On [`authenticate`](DriveAuthenticator::authenticate):
///
/// 1. Loads the cached token from the reusable token file, if present
/// 2. If the cached token is still valid, uses it as-is
/// 3. If it is expired and carries a refresh token, refreshes it
/// 4. Otherwise runs the full interactive flow: opens the user's browser
///    to the consent page, receives the redirect on a local listener,
///    and exchanges the authorization code
/// 5. Persists the credential back to the token file whenever a new or
///    refreshed token was obtained
pub struct DriveAuthenticator {
    secrets_path: PathBuf,
    storage: FileTokenStorage,
    scopes: Vec<String>,
}

impl DriveAuthenticator {
    /// Creates an authenticator
    ///
    /// # Arguments
    /// * `secrets_path` - Path to the OAuth client secrets JSON file
    /// * `token_cache_path` - Path where the reusable token is persisted
    /// * `scopes` - OAuth scopes to request
    pub fn new(
        secrets_path: impl Into<PathBuf>,
        token_cache_path: impl Into<PathBuf>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            secrets_path: secrets_path.into(),
            storage: FileTokenStorage::new(token_cache_path),
            scopes,
        }
    }

    /// Runs the authentication lifecycle and returns a valid credential
    pub async fn authenticate(&self) -> Result<Tokens, AuthError> {
        info!("Authenticating with Google Drive");

        if let Some(tokens) = self.storage.load()? {
            if !tokens.is_expired() {
                info!("Using reusable token");
                return Ok(tokens);
            }

            if let Some(refresh_token) = tokens.refresh_token.clone() {
                info!("Cached token expired, refreshing");
                let refreshed = self.refresh_and_store(&refresh_token).await?;
                info!("Authentication successful");
                return Ok(refreshed);
            }

            warn!("Cached token expired without a refresh token");
        }

        let tokens = self.login().await?;
        self.storage.store(&tokens)?;
        info!("Authentication successful");
        Ok(tokens)
    }

    /// Performs the full interactive consent flow
    ///
    /// Opens the user's default browser on the provider's consent page,
    /// receives the redirect on an ephemeral local listener, and
    /// exchanges the authorization code for tokens.
    pub async fn login(&self) -> Result<Tokens, AuthError> {
        info!("Obtaining new credentials");

        let secrets = ClientSecrets::load(&self.secrets_path)?;

        let server = LocalCallbackServer::bind()
            .await
            .map_err(AuthError::Callback)?;

        let flow = InstalledFlow::new(&secrets, server.redirect_uri(), &self.scopes)
            .map_err(AuthError::Flow)?;

        let (auth_url, _csrf_token, pkce_verifier) = flow.generate_auth_url();

        info!("Opening browser for authentication");
        webbrowser::open(&auth_url)
            .context("Failed to open browser for authentication")
            .map_err(AuthError::Flow)?;

        let callback = server.wait_for_grant().await.map_err(AuthError::Callback)?;

        flow.exchange_code(callback.code, pkce_verifier)
            .await
            .map_err(AuthError::Flow)
    }

    /// Refreshes the access token and persists the renewed credential
    ///
    /// Used when a cached token is found expired at start-up, and by the
    /// remote store when a long-running session crosses the access
    /// token's lifetime.
    pub async fn refresh_and_store(&self, refresh_token: &str) -> Result<Tokens, AuthError> {
        let refreshed = self.refresh(refresh_token).await?;
        self.storage.store(&refreshed)?;
        Ok(refreshed)
    }

    /// Refreshes an expired access token
    async fn refresh(&self, refresh_token: &str) -> Result<Tokens, AuthError> {
        let secrets = ClientSecrets::load(&self.secrets_path)?;

        // The redirect URI is not used during refresh but the flow
        // requires one to be configured.
        let flow = InstalledFlow::new(&secrets, "http://127.0.0.1/callback", &self.scopes)
            .map_err(AuthError::Refresh)?;

        flow.refresh_token(refresh_token)
            .await
            .map_err(AuthError::Refresh)
    }
}
