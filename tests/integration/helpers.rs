//! Shared test helpers for integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use docman_api::{AppState, build_router};
use docman_core::config::{AppConfig, Visibility};
use docman_database::Repositories;
use docman_storage::{BlobStore, ContentDigest, LocalStorageProvider};

pub const PASSWORD: &str = "correct horse battery";

const BOUNDARY: &str = "docman-test-boundary-7d3f";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Wired services, for assertions below the HTTP layer
    pub state: AppState,
    data: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw body
    pub bytes: Vec<u8>,
    /// Parsed JSON body (Null when the body is not JSON)
    pub body: Value,
}

impl TestResponse {
    /// String field of the JSON body.
    pub fn str(&self, key: &str) -> &str {
        self.body[key].as_str().unwrap_or_default()
    }

    /// Header value as text.
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Configuration used by every test app.
pub fn test_config(data_root: PathBuf, visibility: Visibility) -> AppConfig {
    let mut config = AppConfig::default();
    config.storage.data_root = data_root.to_string_lossy().into_owned();
    config.storage.version_retry_attempts = 32;
    config.access.visibility = visibility;
    config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
    config.auth.argon2_memory_kib = 1024;
    config.auth.argon2_iterations = 1;
    config
}

impl TestApp {
    /// Shared-visibility app.
    pub async fn new() -> Self {
        Self::with_visibility(Visibility::Shared).await
    }

    /// App with the given visibility policy.
    pub async fn with_visibility(visibility: Visibility) -> Self {
        let data = TempDir::new().expect("Failed to create temp dir");
        let config = test_config(data.path().to_path_buf(), visibility);

        let provider = LocalStorageProvider::new(data.path())
            .await
            .expect("Failed to init storage");
        let blobs = BlobStore::new(Arc::new(provider));

        let state = AppState::new(config, Repositories::memory(), blobs)
            .expect("Failed to wire services");
        let router = build_router(state.clone());

        Self {
            router,
            state,
            data,
        }
    }

    /// On-disk location of a stored payload.
    pub fn blob_file(&self, digest_hex: &str) -> PathBuf {
        let digest = ContentDigest::parse(digest_hex).expect("Invalid digest");
        self.data.path().join(BlobStore::blob_path(&digest))
    }

    /// Send a prepared request.
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024 * 1024)
            .await
            .expect("Failed to read body")
            .to_vec();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Token {token}"));
        }

        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        self.send(req).await
    }

    /// GET with a token.
    pub async fn get(&self, path: &str, token: &str) -> TestResponse {
        self.request("GET", path, None, Some(token)).await
    }

    /// Create an account.
    pub async fn signup(&self, email: &str) -> TestResponse {
        let body = json!({
            "email": email,
            "name": email.split('@').next().unwrap_or(email),
            "password": PASSWORD,
            "password_confirm": PASSWORD,
        });
        self.request("POST", "/api/accounts/signup/", Some(body), None)
            .await
    }

    /// Log in and return the token.
    pub async fn login(&self, email: &str) -> String {
        let body = json!({ "email": email, "password": PASSWORD });
        let response = self
            .request("POST", "/api/accounts/login/", Some(body), None)
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );
        response.str("token").to_string()
    }

    /// Create an account and log in.
    pub async fn signup_and_login(&self, email: &str) -> String {
        let created = self.signup(email).await;
        assert_eq!(
            created.status,
            StatusCode::CREATED,
            "Signup failed: {:?}",
            created.body
        );
        self.login(email).await
    }

    /// Upload through the multipart endpoint.
    pub async fn upload(
        &self,
        token: &str,
        name: &str,
        content: &[u8],
        directory: Option<Uuid>,
    ) -> TestResponse {
        self.upload_to("/api/file_versions/upload/", token, name, content, directory)
            .await
    }

    /// Upload to an explicit endpoint path.
    pub async fn upload_to(
        &self,
        path: &str,
        token: &str,
        name: &str,
        content: &[u8],
        directory: Option<Uuid>,
    ) -> TestResponse {
        let mut body = Vec::new();
        if let Some(directory) = directory {
            push_text_part(&mut body, "directory", &directory.to_string());
        }
        push_file_part(&mut body, name, content);
        self.send_multipart(path, token, body).await
    }

    /// Upload with the stored name sent in the `name` text field.
    pub async fn upload_as(&self, token: &str, name: &str, content: &[u8]) -> TestResponse {
        let mut body = Vec::new();
        push_text_part(&mut body, "name", name);
        push_file_part(&mut body, "upload.bin", content);
        self.send_multipart("/api/file_versions/upload/", token, body)
            .await
    }

    async fn send_multipart(&self, path: &str, token: &str, mut body: Vec<u8>) -> TestResponse {
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        let req = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Token {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .expect("Failed to build request");
        self.send(req).await
    }

    /// Create a directory through the form endpoint.
    pub async fn mkdir(&self, token: &str, name: &str, parent: Option<Uuid>) -> TestResponse {
        let parent = parent.map(|p| p.to_string()).unwrap_or_default();
        let form = format!("parent={parent}&name={}", form_encode(name));
        let req = Request::builder()
            .method("POST")
            .uri("/api/file_versions/directories/")
            .header(header::AUTHORIZATION, format!("Token {token}"))
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .expect("Failed to build request");
        self.send(req).await
    }
}

/// Id field of a JSON object.
pub fn id_of(value: &Value) -> Uuid {
    value["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("No id in {value}"))
}

fn push_file_part(body: &mut Vec<u8>, filename: &str, content: &[u8]) {
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(b"\r\n");
}

fn push_text_part(body: &mut Vec<u8>, name: &str, value: &str) {
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
            .as_bytes(),
    );
}

fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}
