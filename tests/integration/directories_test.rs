//! Integration tests for the directory tree endpoints.

use axum::http::StatusCode;
use futures::future::join_all;
use uuid::Uuid;

use crate::helpers::{TestApp, id_of};

#[tokio::test]
async fn test_create_and_list_root_directories() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    for name in ["projects", "archive", "Inbox"] {
        let created = app.mkdir(&token, name, None).await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
        assert_eq!(created.str("name"), name);
        assert!(created.body["parent_id"].is_null());
    }

    let listing = app.get("/api/file_versions/directories/", &token).await;
    assert_eq!(listing.status, StatusCode::OK);
    let names: Vec<&str> = listing
        .body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Inbox", "archive", "projects"]);
}

#[tokio::test]
async fn test_sibling_names_are_unique_per_parent() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let docs = app.mkdir(&token, "docs", None).await;
    let duplicate = app.mkdir(&token, "docs", None).await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let nested = app.mkdir(&token, "docs", Some(id_of(&docs.body))).await;
    assert_eq!(nested.status, StatusCode::CREATED);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_duplicate_directories_resolve_to_one() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let responses = join_all((0..8).map(|_| app.mkdir(&token, "Projects", None))).await;

    let created = responses
        .iter()
        .filter(|r| r.status == StatusCode::CREATED)
        .count();
    assert_eq!(created, 1);
    for response in responses.iter().filter(|r| r.status != StatusCode::CREATED) {
        assert_eq!(response.status, StatusCode::CONFLICT, "{:?}", response.body);
    }

    let listing = app.get("/api/file_versions/directories/", &token).await;
    assert_eq!(listing.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_nested_path_resolution() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    let projects = id_of(&app.mkdir(&token, "projects", None).await.body);
    let year = id_of(&app.mkdir(&token, "2024", Some(projects)).await.body);
    let q1 = id_of(&app.mkdir(&token, "Q1 reports", Some(year)).await.body);

    let path = app
        .get(&format!("/api/file_versions/directories/{q1}/path/"), &token)
        .await;
    assert_eq!(path.status, StatusCode::OK);
    assert_eq!(path.body["directory_id"], q1.to_string());
    assert_eq!(
        path.body["names"],
        serde_json::json!(["projects", "2024", "Q1 reports"])
    );

    let children = app
        .get(
            &format!("/api/file_versions/directories/?parent={projects}"),
            &token,
        )
        .await;
    let rows = children.body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], year.to_string());

    let single = app
        .get(&format!("/api/file_versions/directories/{year}/"), &token)
        .await;
    assert_eq!(single.body["parent_id"], projects.to_string());
}

#[tokio::test]
async fn test_directory_validation_and_lookup_errors() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;

    for bad in ["", "a/b", ".."] {
        let response = app.mkdir(&token, bad, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{bad:?}");
    }

    let orphan = app.mkdir(&token, "orphan", Some(Uuid::new_v4())).await;
    assert_eq!(orphan.status, StatusCode::NOT_FOUND);

    let unknown = Uuid::new_v4();
    let listing = app
        .get(&format!("/api/file_versions/directories/?parent={unknown}"), &token)
        .await;
    assert_eq!(listing.status, StatusCode::NOT_FOUND);

    let path = app
        .get(&format!("/api/file_versions/directories/{unknown}/path/"), &token)
        .await;
    assert_eq!(path.status, StatusCode::NOT_FOUND);

    let root = app.get("/api/file_versions/directories/", &token).await;
    assert_eq!(root.body.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn test_same_file_name_in_different_directories() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("alice@example.com").await;
    let drafts = id_of(&app.mkdir(&token, "drafts", None).await.body);
    let final_dir = id_of(&app.mkdir(&token, "final", None).await.body);

    let a = app.upload(&token, "paper.md", b"draft", Some(drafts)).await;
    let b = app.upload(&token, "paper.md", b"final", Some(final_dir)).await;

    assert_eq!(a.status, StatusCode::CREATED);
    assert_eq!(b.status, StatusCode::CREATED);
    assert_ne!(a.body["file"]["id"], b.body["file"]["id"]);
    assert_eq!(a.body["version"]["version_number"], 1);
    assert_eq!(b.body["version"]["version_number"], 1);
    assert_eq!(a.body["file"]["directory_id"], drafts.to_string());

    let listing = app.get("/api/files/user/", &token).await;
    assert_eq!(listing.body.as_array().map(Vec::len), Some(2));
}
