//! Mid-session token refresh behavior of the refreshing store
//!
//! The token endpoint and the Drive endpoints both live on the same
//! mock server; the secrets file written for each test points the OAuth
//! `token_uri` at the mock.

use std::collections::HashSet;

use chrono::{Duration, Utc};
use driveup_core::ports::remote_store::{IRemoteStore, Tokens};
use driveup_drive::auth::{DriveAuthenticator, FileTokenStorage};
use driveup_drive::client::DriveClient;
use driveup_drive::provider::RefreshingDriveStore;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Writes a secrets file targeting the mock server, seeds the token
/// cache with `tokens`, and returns a store over them.
fn setup_store(
    server: &MockServer,
    dir: &tempfile::TempDir,
    tokens: Tokens,
) -> RefreshingDriveStore {
    let secrets = serde_json::json!({
        "installed": {
            "client_id": "test-client-id",
            "client_secret": "test-secret",
            "auth_uri": format!("{}/auth", server.uri()),
            "token_uri": format!("{}/token", server.uri()),
        }
    });
    let secrets_path = dir.path().join("client_secrets.json");
    std::fs::write(&secrets_path, secrets.to_string()).unwrap();

    let cache_path = dir.path().join("token.json");
    FileTokenStorage::new(&cache_path).store(&tokens).unwrap();

    let auth = DriveAuthenticator::new(
        &secrets_path,
        &cache_path,
        vec!["https://www.googleapis.com/auth/drive".to_string()],
    );

    let allowed: HashSet<String> = [".txt".to_string()].into_iter().collect();
    let client = DriveClient::with_base_urls(
        tokens.access_token.clone(),
        allowed,
        server.uri(),
        format!("{}/upload", server.uri()),
    );

    RefreshingDriveStore::with_client(auth, tokens, client)
}

/// Mounts the resumable upload pair, accepting only the given bearer.
async fn mount_upload_for_bearer(server: &MockServer, bearer: &str, file_id: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(query_param("uploadType", "resumable"))
        .and(header("authorization", format!("Bearer {bearer}")))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/session/s1", server.uri())),
        )
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/session/s1"))
        .and(header("authorization", format!("Bearer {bearer}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "drive#file",
            "id": file_id
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_expiring_token_is_refreshed_before_upload() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Valid for one more minute: inside the renewal margin, not expired
    let tokens = Tokens {
        access_token: "stale-token".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expires_at: Utc::now() + Duration::minutes(1),
    };
    let store = setup_store(&server, &dir, tokens);

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh-token",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    // The Drive endpoints only accept the renewed bearer
    mount_upload_for_bearer(&server, "fresh-token", "uploaded-1").await;

    let file = dir.path().join("report.txt");
    std::fs::write(&file, b"contents").unwrap();

    let uploaded = store
        .upload_file("folder-1", &file)
        .await
        .unwrap()
        .expect("upload should not be skipped");
    assert_eq!(uploaded.id, "uploaded-1");

    // The renewed credential is persisted for later runs; Google did not
    // return a new refresh token, so the previous one is carried forward.
    let cached = FileTokenStorage::new(dir.path().join("token.json"))
        .load()
        .unwrap()
        .expect("token cache should exist");
    assert_eq!(cached.access_token, "fresh-token");
    assert_eq!(cached.refresh_token.as_deref(), Some("1//refresh"));
}

#[tokio::test]
async fn test_fresh_token_is_used_without_refresh() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let tokens = Tokens {
        access_token: "live-token".to_string(),
        refresh_token: Some("1//refresh".to_string()),
        expires_at: Utc::now() + Duration::hours(2),
    };
    let store = setup_store(&server, &dir, tokens);

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    mount_upload_for_bearer(&server, "live-token", "uploaded-2").await;

    let file = dir.path().join("report.txt");
    std::fs::write(&file, b"contents").unwrap();

    let uploaded = store
        .upload_file("folder-1", &file)
        .await
        .unwrap()
        .expect("upload should not be skipped");
    assert_eq!(uploaded.id, "uploaded-2");
}
