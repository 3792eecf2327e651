//! Integration tests for the version diff endpoint.

use axum::http::StatusCode;
use uuid::Uuid;

use docman_api::dto::response::DiffResponse;

use crate::helpers::{TestApp, id_of};

const V1: &[u8] = b"title\nalpha\nbeta\ngamma\n";
const V2: &[u8] = b"title\nalpha\nBETA\ngamma\ndelta";

async fn two_versions(app: &TestApp, token: &str) -> Uuid {
    let first = app.upload(token, "doc.txt", V1, None).await;
    app.upload(token, "doc.txt", V2, None).await;
    id_of(&first.body["file"])
}

#[tokio::test]
async fn test_text_diff_between_versions() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let file_id = two_versions(&app, &token).await;

    let response = app
        .get(&format!("/api/files/{file_id}/diff/?from=1&to=2"), &token)
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["file_id"], file_id.to_string());
    assert_eq!(response.body["from_version"], 1);
    assert_eq!(response.body["to_version"], 2);
    assert_eq!(response.body["body"]["kind"], "text");
    assert_eq!(response.body["stats"]["insertions"], 2);
    assert_eq!(response.body["stats"]["deletions"], 1);
    assert_eq!(response.body["stats"]["hunks"], 2);
    assert_eq!(response.body["stats"]["binary"], false);
}

#[tokio::test]
async fn test_diff_applies_and_inverts() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let file_id = two_versions(&app, &token).await;

    let forward = app
        .get(&format!("/api/files/{file_id}/diff/?from=1&to=latest"), &token)
        .await;
    let forward: DiffResponse = serde_json::from_value(forward.body).unwrap();
    assert_eq!(forward.delta.to_version, 2);
    assert_eq!(forward.delta.apply(V1).unwrap(), V2);

    let backward = app
        .get(&format!("/api/files/{file_id}/diff/?from=latest&to=1"), &token)
        .await;
    let backward: DiffResponse = serde_json::from_value(backward.body).unwrap();
    assert_eq!(backward.delta.apply(V2).unwrap(), V1);
    assert_eq!(forward.delta.invert(), backward.delta);
}

#[tokio::test]
async fn test_same_version_diff_is_empty() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let file_id = two_versions(&app, &token).await;

    let response = app
        .get(&format!("/api/files/{file_id}/diff/?from=2&to=2"), &token)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["body"]["hunks"], serde_json::json!([]));
    assert_eq!(response.body["stats"]["hunks"], 0);
}

#[tokio::test]
async fn test_binary_content_is_whole_file_replace() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let first = app.upload(&token, "image.bin", &[0u8, 1, 2, 3], None).await;
    app.upload(&token, "image.bin", &[0u8, 1, 2, 4], None).await;
    let file_id = id_of(&first.body["file"]);

    let response = app
        .get(&format!("/api/files/{file_id}/diff/?from=1&to=2"), &token)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["body"]["kind"], "binary");
    assert_eq!(response.body["stats"]["binary"], true);
    let parsed: DiffResponse = serde_json::from_value(response.body).unwrap();
    assert_eq!(parsed.delta.apply(&[0, 1, 2, 3]).unwrap(), vec![0, 1, 2, 4]);
}

#[tokio::test]
async fn test_diff_parameter_and_lookup_errors() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let file_id = two_versions(&app, &token).await;

    let missing = app
        .get(&format!("/api/files/{file_id}/diff/?from=1"), &token)
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);

    let garbage = app
        .get(&format!("/api/files/{file_id}/diff/?from=one&to=2"), &token)
        .await;
    assert_eq!(garbage.status, StatusCode::BAD_REQUEST);

    let unknown_version = app
        .get(&format!("/api/files/{file_id}/diff/?from=1&to=7"), &token)
        .await;
    assert_eq!(unknown_version.status, StatusCode::NOT_FOUND);

    let unknown_file = app
        .get(
            &format!("/api/files/{}/diff/?from=1&to=2", Uuid::new_v4()),
            &token,
        )
        .await;
    assert_eq!(unknown_file.status, StatusCode::NOT_FOUND);
}
