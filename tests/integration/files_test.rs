//! Integration tests for uploads, listings, versions and downloads.

use axum::http::{StatusCode, header};
use futures::future::join_all;
use serde_json::Value;
use uuid::Uuid;

use docman_core::config::Visibility;
use docman_storage::ContentDigest;

use crate::helpers::{TestApp, id_of};

fn version_numbers(body: &Value) -> Vec<i64> {
    body.as_array()
        .map(|rows| rows.iter().filter_map(|r| r["version_number"].as_i64()).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_upload_creates_first_version() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let response = app.upload(&token, "report.txt", b"v1", None).await;

    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["file"]["name"], "report.txt");
    assert!(response.body["file"]["directory_id"].is_null());
    assert_eq!(response.body["version"]["version_number"], 1);
    assert_eq!(response.body["version"]["size_bytes"], 2);
    assert_eq!(
        response.body["version"]["digest_hex"],
        ContentDigest::compute(b"v1").as_str()
    );
}

#[tokio::test]
async fn test_second_upload_appends_and_old_versions_stay_downloadable() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let first = app.upload(&token, "report.txt", b"v1", None).await;
    let second = app.upload(&token, "report.txt", b"v2", None).await;
    assert_eq!(second.status, StatusCode::CREATED);
    assert_eq!(second.body["version"]["version_number"], 2);
    assert_eq!(first.body["file"]["id"], second.body["file"]["id"]);

    let file_id = id_of(&first.body["file"]);

    let listing = app.get("/api/files/user/", &token).await;
    assert_eq!(listing.status, StatusCode::OK);
    let rows = listing.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["file_name"], "report.txt");
    assert_eq!(rows[0]["version_number"], 2);
    assert_eq!(rows[0]["id"], second.body["version"]["id"]);

    let versions = app
        .get(&format!("/api/files/{file_id}/versions/"), &token)
        .await;
    assert_eq!(version_numbers(&versions.body), vec![1, 2]);

    let v1 = app
        .get(&format!("/api/files/{file_id}/versions/1/download/"), &token)
        .await;
    assert_eq!(v1.status, StatusCode::OK);
    assert_eq!(v1.bytes, b"v1");

    let latest = app
        .get(&format!("/api/files/{file_id}/versions/latest/download/"), &token)
        .await;
    assert_eq!(latest.bytes, b"v2");
}

#[tokio::test]
async fn test_download_headers() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let uploaded = app.upload(&token, "notes.txt", b"hello\n", None).await;
    let version_id = id_of(&uploaded.body["version"]);

    let response = app
        .get(&format!("/api/file_versions/{version_id}/download/"), &token)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"hello\n");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"notes.txt\"")
    );
    let etag = format!("\"{}\"", ContentDigest::compute(b"hello\n"));
    assert_eq!(response.header(header::ETAG), Some(etag.as_str()));
    assert_eq!(response.header(header::CONTENT_TYPE), Some("text/plain"));
}

#[tokio::test]
async fn test_control_characters_in_names_are_rejected() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    for name in ["report\x0bfinal.txt", "two\nlines.txt", "cr\r.txt", "del\x7f.txt"] {
        let response = app.upload_as(&token, name, b"x").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{name:?}");
        assert_eq!(response.str("error"), "VALIDATION_ERROR");
    }

    let listing = app.get("/api/files/", &token).await;
    assert_eq!(listing.body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_non_ascii_name_downloads_with_extended_filename() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let uploaded = app.upload_as(&token, "résumé \"v2\".txt", b"cv").await;
    assert_eq!(uploaded.status, StatusCode::CREATED, "{:?}", uploaded.body);
    let version_id = id_of(&uploaded.body["version"]);

    let response = app
        .get(&format!("/api/file_versions/{version_id}/download/"), &token)
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.bytes, b"cv");
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        Some("attachment; filename=\"r_sum_ _v2_.txt\"; filename*=UTF-8''r%C3%A9sum%C3%A9%20%22v2%22.txt")
    );
}

#[tokio::test]
async fn test_identical_uploads_are_distinct_versions() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let a = app.upload(&token, "same.bin", b"payload", None).await;
    let b = app.upload(&token, "same.bin", b"payload", None).await;

    assert_eq!(a.body["version"]["version_number"], 1);
    assert_eq!(b.body["version"]["version_number"], 2);
    assert_ne!(a.body["version"]["id"], b.body["version"]["id"]);
    assert_eq!(a.body["version"]["digest_hex"], b.body["version"]["digest_hex"]);
}

#[tokio::test]
async fn test_upload_alias_route() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let response = app
        .upload_to("/api/file-uploads/", &token, "alias.txt", b"x", None)
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["file"]["name"], "alias.txt");
}

#[tokio::test]
async fn test_empty_payload_is_allowed() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let response = app.upload(&token, "empty.txt", b"", None).await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["version"]["size_bytes"], 0);
    assert_eq!(
        response.body["version"]["digest_hex"],
        ContentDigest::compute(b"").as_str()
    );
}

#[tokio::test]
async fn test_invalid_upload_leaves_nothing_behind() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let bad_name = app.upload(&token, "..", b"x", None).await;
    assert_eq!(bad_name.status, StatusCode::BAD_REQUEST);

    let missing_dir = app
        .upload(&token, "ok.txt", b"x", Some(Uuid::new_v4()))
        .await;
    assert_eq!(missing_dir.status, StatusCode::NOT_FOUND);

    let listing = app.get("/api/files/", &token).await;
    assert_eq!(listing.body.as_array().map(Vec::len), Some(0));
    let versions = app.get("/api/file_versions/", &token).await;
    assert_eq!(versions.body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_lookup_errors() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let uploaded = app.upload(&token, "a.txt", b"a", None).await;
    let file_id = id_of(&uploaded.body["file"]);

    let unknown_file = app.get(&format!("/api/files/{}/", Uuid::new_v4()), &token).await;
    assert_eq!(unknown_file.status, StatusCode::NOT_FOUND);

    let bad_id = app.get("/api/files/not-a-uuid/", &token).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_id.str("error"), "VALIDATION_ERROR");

    let unknown_version = app
        .get(&format!("/api/files/{file_id}/versions/9/download/"), &token)
        .await;
    assert_eq!(unknown_version.status, StatusCode::NOT_FOUND);

    let bad_selector = app
        .get(&format!("/api/files/{file_id}/versions/0/download/"), &token)
        .await;
    assert_eq!(bad_selector.status, StatusCode::BAD_REQUEST);

    let unknown_row = app
        .get(&format!("/api/file_versions/{}/", Uuid::new_v4()), &token)
        .await;
    assert_eq!(unknown_row.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_record_and_version_rows() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    app.upload(&token, "a.txt", b"one", None).await;
    let second = app.upload(&token, "a.txt", b"two", None).await;
    let file_id = id_of(&second.body["file"]);
    let version_id = id_of(&second.body["version"]);

    let file = app.get(&format!("/api/files/{file_id}/"), &token).await;
    assert_eq!(file.status, StatusCode::OK);
    assert_eq!(file.body["file_id"], file_id.to_string());
    assert_eq!(file.body["version_number"], 2);

    let row = app
        .get(&format!("/api/file_versions/{version_id}/"), &token)
        .await;
    assert_eq!(row.body["version_number"], 2);
    assert_eq!(row.body["file_name"], "a.txt");

    let all = app.get("/api/file_versions/", &token).await;
    assert_eq!(all.body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_missing_payload_is_reported_as_gone() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let uploaded = app.upload(&token, "lost.txt", b"lost", None).await;
    let version_id = id_of(&uploaded.body["version"]);
    let digest = uploaded.body["version"]["digest_hex"].as_str().unwrap();

    std::fs::remove_file(app.blob_file(digest)).unwrap();

    let response = app
        .get(&format!("/api/file_versions/{version_id}/download/"), &token)
        .await;
    assert_eq!(response.status, StatusCode::GONE);
    assert_eq!(response.str("error"), "PAYLOAD_MISSING");

    let row = app
        .get(&format!("/api/file_versions/{version_id}/"), &token)
        .await;
    assert_eq!(row.status, StatusCode::OK);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_uploads_get_distinct_numbers() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let uploads = (0..8u8).map(|i| {
        let app = &app;
        let token = token.as_str();
        async move { app.upload(token, "race.txt", &[b'a' + i], None).await }
    });
    let responses = join_all(uploads).await;

    for response in &responses {
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    }
    let mut numbers: Vec<i64> = responses
        .iter()
        .filter_map(|r| r.body["version"]["version_number"].as_i64())
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=8).collect::<Vec<_>>());

    let listing = app.get("/api/files/", &token).await;
    assert_eq!(listing.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_shared_visibility_lets_everyone_append() {
    let app = TestApp::new().await;
    let alice = app.signup_and_login("alice@example.com").await;
    let bob = app.signup_and_login("bob@example.com").await;

    app.upload(&alice, "team.txt", b"alice", None).await;
    let appended = app.upload(&bob, "team.txt", b"bob", None).await;
    assert_eq!(appended.status, StatusCode::CREATED);
    assert_eq!(appended.body["version"]["version_number"], 2);

    let bobs_own = app.get("/api/files/user/", &bob).await;
    assert_eq!(bobs_own.body.as_array().map(Vec::len), Some(0));
    let everything = app.get("/api/files/", &bob).await;
    assert_eq!(everything.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_private_visibility_hides_other_owners() {
    let app = TestApp::with_visibility(Visibility::Private).await;
    let admin = app.signup_and_login("root@example.com").await;
    let alice = app.signup_and_login("alice@example.com").await;
    let bob = app.signup_and_login("bob@example.com").await;

    let uploaded = app.upload(&alice, "secret.txt", b"mine", None).await;
    let file_id = id_of(&uploaded.body["file"]);

    let read = app.get(&format!("/api/files/{file_id}/"), &bob).await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);

    let append = app.upload(&bob, "secret.txt", b"theirs", None).await;
    assert_eq!(append.status, StatusCode::FORBIDDEN);

    let listing = app.get("/api/files/", &bob).await;
    assert_eq!(listing.body.as_array().map(Vec::len), Some(0));

    let as_admin = app.get(&format!("/api/files/{file_id}/"), &admin).await;
    assert_eq!(as_admin.status, StatusCode::OK);
    let admin_listing = app.get("/api/files/", &admin).await;
    assert_eq!(admin_listing.body.as_array().map(Vec::len), Some(1));
}
