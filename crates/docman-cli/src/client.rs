//! Thin HTTP client for the Docman REST API.

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use futures::StreamExt;
use reqwest::{Method, RequestBuilder, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use docman_api::error::ApiErrorResponse;

/// Authenticated (or anonymous) connection to one server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Client for `base_url`, e.g. `http://127.0.0.1:8000`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("docman-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Absolute URL of an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!(%method, %url, "Sending request");
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.header(header::AUTHORIZATION, format!("Token {token}")),
            None => builder,
        }
    }

    /// Fail early with a readable message when a command needs a token.
    pub fn require_token(&self) -> Result<()> {
        if self.token.is_none() {
            bail!("Not logged in: pass --token or set DOCMAN_TOKEN (see `docman login`)");
        }
        Ok(())
    }

    /// GET a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.request(Method::GET, path).send().await?;
        decode(response).await
    }

    /// GET with query parameters.
    pub async fn get_json_query<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let response = self.request(Method::GET, path).query(query).send().await?;
        decode(response).await
    }

    /// POST a JSON body.
    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request(Method::POST, path).json(body).send().await?;
        decode(response).await
    }

    /// POST a urlencoded form.
    pub async fn post_form<T, B>(&self, path: &str, form: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self.request(Method::POST, path).form(form).send().await?;
        decode(response).await
    }

    /// POST with no body, expecting no content back.
    pub async fn post_empty(&self, path: &str) -> Result<()> {
        let response = self.request(Method::POST, path).send().await?;
        check(response).await.map(|_| ())
    }

    /// Upload a local file as the `file` multipart field.
    pub async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        local: &Path,
        name: &str,
        directory: Option<Uuid>,
    ) -> Result<T> {
        let content = tokio::fs::read(local)
            .await
            .with_context(|| format!("Failed to read {}", local.display()))?;
        let mime = mime_guess::from_path(name).first_or_octet_stream();

        let part = reqwest::multipart::Part::bytes(content)
            .file_name(name.to_string())
            .mime_str(mime.as_ref())?;
        let mut form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("name", name.to_string());
        if let Some(directory) = directory {
            form = form.text("directory", directory.to_string());
        }

        let response = self
            .request(Method::POST, path)
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }

    /// Stream a download into `dest`, returning the bytes written and the
    /// server-suggested file name.
    pub async fn download_to(
        &self,
        path: &str,
        dest: Option<&Path>,
    ) -> Result<(u64, std::path::PathBuf)> {
        let response = check(self.request(Method::GET, path).send().await?).await?;

        let suggested = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(attachment_filename);
        let target = match (dest, suggested) {
            (Some(dest), _) => dest.to_path_buf(),
            (None, Some(name)) => std::path::PathBuf::from(name),
            (None, None) => bail!("Server did not suggest a file name; pass --output"),
        };

        let mut file = tokio::fs::File::create(&target)
            .await
            .with_context(|| format!("Failed to create {}", target.display()))?;
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.context("Download interrupted")?;
            written += chunk.len() as u64;
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok((written, target))
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(api_error(status, &body))
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let response = check(response).await?;
    response
        .json::<T>()
        .await
        .context("Unexpected response from server")
}

/// Turn an error response into a one-line message.
pub fn api_error(status: StatusCode, body: &str) -> anyhow::Error {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(err) => anyhow!("{} ({}): {}", status.as_u16(), err.error, err.message),
        Err(_) if body.trim().is_empty() => anyhow!("Server returned {status}"),
        Err(_) => anyhow!("Server returned {status}: {}", body.trim()),
    }
}

/// `filename` parameter of a `Content-Disposition: attachment` header.
pub fn attachment_filename(value: &str) -> Option<String> {
    value.split(';').map(str::trim).find_map(|param| {
        let raw = param.strip_prefix("filename=")?;
        let name = raw.trim_matches('"').replace("\\\"", "\"");
        let base = Path::new(&name).file_name()?.to_str()?.to_string();
        (!base.is_empty()).then_some(base)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_filename() {
        assert_eq!(
            attachment_filename("attachment; filename=\"report.txt\"").as_deref(),
            Some("report.txt")
        );
        assert_eq!(
            attachment_filename("attachment; filename=plain.bin").as_deref(),
            Some("plain.bin")
        );
        assert_eq!(attachment_filename("inline"), None);
    }

    #[test]
    fn test_attachment_filename_strips_directories() {
        assert_eq!(
            attachment_filename("attachment; filename=\"../../etc/passwd\"").as_deref(),
            Some("passwd")
        );
    }

    #[test]
    fn test_api_error_prefers_server_message() {
        let body = r#"{"error":"NOT_FOUND","message":"File not found","detail":"File not found"}"#;
        let err = api_error(StatusCode::NOT_FOUND, body);
        assert_eq!(err.to_string(), "404 (NOT_FOUND): File not found");

        let err = api_error(StatusCode::BAD_GATEWAY, "");
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = ApiClient::new("http://localhost:8000/", None).unwrap();
        assert_eq!(client.url("/api/files/"), "http://localhost:8000/api/files/");
        assert!(client.require_token().is_err());
    }
}
