//! Integration tests for accounts, sessions and the health endpoint.

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use futures::future::join_all;
use serde_json::json;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_health_needs_no_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health/", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.str("status"), "ok");
    assert_eq!(response.str("database"), "memory");
    assert_eq!(response.body["storage_ok"], true);
}

#[tokio::test]
async fn test_first_account_is_admin() {
    let app = TestApp::new().await;
    let admin = app.signup_and_login("admin@example.com").await;
    let member = app.signup_and_login("member@example.com").await;

    let me = app.get("/api/accounts/me/", &admin).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.str("email"), "admin@example.com");
    assert_eq!(me.str("role"), "admin");

    let me = app.get("/api/accounts/me/", &member).await;
    assert_eq!(me.str("role"), "member");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_signups_yield_one_admin() {
    let app = TestApp::new().await;
    let emails: Vec<String> = (0..4).map(|i| format!("user{i}@example.com")).collect();

    let created = join_all(emails.iter().map(|email| app.signup(email))).await;
    for response in &created {
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    }

    let mut admins = 0;
    for email in &emails {
        let token = app.login(email).await;
        let me = app.get("/api/accounts/me/", &token).await;
        if me.str("role") == "admin" {
            admins += 1;
        }
    }
    assert_eq!(admins, 1);
}

#[tokio::test]
async fn test_signup_normalizes_email_and_rejects_duplicates() {
    let app = TestApp::new().await;

    let created = app.signup("  Alice@Example.COM ").await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.str("email"), "alice@example.com");

    let again = app.signup("alice@example.com").await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.str("error"), "CONFLICT");
}

#[tokio::test]
async fn test_signup_rejects_mismatched_confirmation() {
    let app = TestApp::new().await;
    let body = json!({
        "email": "bob@example.com",
        "name": "Bob",
        "password": PASSWORD,
        "password_confirm": "something else",
    });

    let response = app
        .request("POST", "/api/accounts/signup/", Some(body), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.str("message"), "Passwords do not match.");
    assert_eq!(response.str("detail"), "Passwords do not match.");
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let app = TestApp::new().await;
    app.signup_and_login("carol@example.com").await;

    let wrong_password = app
        .request(
            "POST",
            "/api/accounts/login/",
            Some(json!({ "email": "carol@example.com", "password": "nope-nope-nope" })),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/accounts/login/",
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.str("message"), unknown_email.str("message"));
}

#[tokio::test]
async fn test_authenticated_routes_require_a_token() {
    let app = TestApp::new().await;

    for path in [
        "/api/accounts/me/",
        "/api/files/",
        "/api/files/user/",
        "/api/file_versions/",
        "/api/file_versions/directories/",
    ] {
        let response = app.request("GET", path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(response.str("error"), "UNAUTHORIZED");
    }

    let garbage = app.get("/api/files/", "not-a-token").await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_scheme_is_accepted() {
    let app = TestApp::new().await;
    let token = app.signup_and_login("dave@example.com").await;

    let req = Request::builder()
        .uri("/api/accounts/me/")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.send(req).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_only_that_session() {
    let app = TestApp::new().await;
    let first = app.signup_and_login("erin@example.com").await;
    let second = app.login("erin@example.com").await;

    let response = app
        .request("POST", "/api/accounts/logout/", None, Some(&first))
        .await;
    assert_eq!(response.status, StatusCode::NO_CONTENT);

    let revoked = app.get("/api/accounts/me/", &first).await;
    assert_eq!(revoked.status, StatusCode::UNAUTHORIZED);

    let still_valid = app.get("/api/accounts/me/", &second).await;
    assert_eq!(still_valid.status, StatusCode::OK);
}
