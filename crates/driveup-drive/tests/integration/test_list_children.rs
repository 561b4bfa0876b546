//! Integration tests for folder listing
//!
//! Verifies query construction, response mapping, and API error
//! propagation for `DriveClient::list_children`.

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

#[tokio::test]
async fn test_list_children_returns_items() {
    let (server, client) = common::setup_drive_mock().await;

    common::mount_list(
        &server,
        serde_json::json!([
            {"kind": "drive#file", "id": "id-a", "name": "a.txt"},
            {"kind": "drive#file", "id": "id-b", "name": "b.png"},
            {"kind": "drive#file", "id": "id-c", "name": "subfolder"}
        ]),
    )
    .await;

    let items = client
        .list_children("folder-001", 10)
        .await
        .expect("Listing failed");

    assert_eq!(items.len(), 3);
    assert_eq!(items[0].id, "id-a");
    assert_eq!(items[0].name, "a.txt");
    assert_eq!(items[0].kind, "drive#file");
    assert_eq!(items[2].name, "subfolder");
}

#[tokio::test]
async fn test_list_children_sends_parents_query() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param(
            "q",
            "'folder-xyz' in parents and trashed=false",
        ))
        .and(query_param("pageSize", "25"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"kind": "drive#fileList", "files": []})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let items = client
        .list_children("folder-xyz", 25)
        .await
        .expect("Listing failed");

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_list_children_empty_folder() {
    let (server, client) = common::setup_drive_mock().await;

    // Drive omits the `files` array entirely for some empty responses
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"kind": "drive#fileList"})),
        )
        .mount(&server)
        .await;

    let items = client
        .list_children("folder-empty", 10)
        .await
        .expect("Listing failed");

    assert!(items.is_empty());
}

#[tokio::test]
async fn test_list_children_api_error() {
    let (server, client) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {"code": 403, "message": "The user does not have sufficient permissions"}
        })))
        .mount(&server)
        .await;

    let result = client.list_children("forbidden-folder", 10).await;
    let err = result.expect_err("Expected an API error");
    let message = err.to_string();
    assert!(message.contains("403"), "unexpected error: {message}");
}
