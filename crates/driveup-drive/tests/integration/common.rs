//! Shared test helpers for Drive API integration tests
//!
//! Provides wiremock-based mock server setup for Drive v3 endpoints.
//! Helpers mount the necessary mock endpoints and return a configured
//! DriveClient pointing at the mock server.

use std::collections::HashSet;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use driveup_drive::client::DriveClient;

/// Starts a mock server and returns it with a DriveClient whose metadata
/// and upload base URLs both point at the mock.
///
/// The client's allow-list covers the extensions used by the tests.
pub async fn setup_drive_mock() -> (MockServer, DriveClient) {
    let server = MockServer::start().await;

    let allowed: HashSet<String> = [".txt", ".png", ".mp4"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let client = DriveClient::with_base_urls(
        "test-access-token",
        allowed,
        server.uri(),
        format!("{}/upload", server.uri()),
    );

    (server, client)
}

/// Mounts a `files.list` endpoint returning the given file entries.
pub async fn mount_list(server: &MockServer, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "drive#fileList",
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts a resumable upload session pair:
///
/// 1. `POST /upload/files?uploadType=resumable` answers with a
///    `Location` header pointing back at the mock.
/// 2. `PUT /session/{session_id}` answers with the created file id.
pub async fn mount_resumable_upload(server: &MockServer, session_id: &str, file_id: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .and(query_param("uploadType", "resumable"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/session/{}", server.uri(), session_id)),
        )
        .mount(server)
        .await;

    Mock::given(method("PUT"))
        .and(path(format!("/session/{}", session_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "kind": "drive#file",
            "id": file_id
        })))
        .mount(server)
        .await;
}
