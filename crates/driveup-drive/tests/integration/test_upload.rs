//! Integration tests for resumable uploads
//!
//! Verifies the session-create + content-put sequence, the validation
//! soft skips (which must not touch the network), and API error
//! propagation for `DriveClient::upload_file`.

use std::path::Path;

use wiremock::matchers::{body_bytes, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_upload_file_returns_remote_id() {
    let (server, client) = common::setup_drive_mock().await;
    common::mount_resumable_upload(&server, "sess-1", "uploaded-001").await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("report.txt");
    std::fs::write(&local, b"quarterly numbers").unwrap();

    let uploaded = client
        .upload_file("folder-001", &local)
        .await
        .expect("Upload failed")
        .expect("Upload was skipped");

    assert_eq!(uploaded.id, "uploaded-001");
}

#[tokio::test]
async fn test_upload_sends_file_bytes_to_session() {
    let (server, client) = common::setup_drive_mock().await;

    let content = b"binary \x00\x01\x02 payload".to_vec();

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("Location", format!("{}/session/body-check", server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/session/body-check"))
        .and(body_bytes(content.clone()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"kind": "drive#file", "id": "id-body"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("clip.mp4");
    std::fs::write(&local, &content).unwrap();

    let uploaded = client
        .upload_file("folder-001", &local)
        .await
        .expect("Upload failed")
        .expect("Upload was skipped");

    assert_eq!(uploaded.id, "id-body");
}

#[tokio::test]
async fn test_upload_missing_file_makes_no_request() {
    let (server, client) = common::setup_drive_mock().await;

    let result = client
        .upload_file("folder-001", Path::new("/nonexistent/ghost.txt"))
        .await
        .expect("Soft skip must not be an error");

    assert!(result.is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_disallowed_extension_makes_no_request() {
    let (server, client) = common::setup_drive_mock().await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("tool.exe");
    std::fs::write(&local, b"MZ").unwrap();

    let result = client
        .upload_file("folder-001", &local)
        .await
        .expect("Soft skip must not be an error");

    assert!(result.is_none());
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_upload_session_create_error_propagates() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": {"code": 500, "message": "Internal error"}
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("a.txt");
    std::fs::write(&local, b"data").unwrap();

    let result = client.upload_file("folder-001", &local).await;
    let err = result.expect_err("Expected an API error");
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_upload_missing_location_header_is_invalid_response() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/files"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("a.txt");
    std::fs::write(&local, b"data").unwrap();

    let result = client.upload_file("folder-001", &local).await;
    let err = result.expect_err("Expected an invalid response error");
    assert!(err.to_string().contains("Location"));
}
