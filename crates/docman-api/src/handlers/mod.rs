//! HTTP handlers grouped by resource.

pub mod accounts;
pub mod directories;
pub mod file_versions;
pub mod files;
pub mod health;

use axum::body::Body;
use axum::http::{StatusCode, header};
use axum::response::Response;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use docman_core::error::AppError;
use docman_service::Download;

/// Stream a version to the client as an attachment.
pub(crate) fn download_response(download: Download) -> Result<Response, AppError> {
    let version = &download.version;
    let content_type = mime_guess::from_path(&version.file_name).first_or_octet_stream();
    let disposition = content_disposition(&version.file_name);
    let etag = format!("\"{}\"", version.digest_hex);
    let length = version.size_bytes;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_DISPOSITION, disposition)
        .header(header::CONTENT_LENGTH, length)
        .header(header::ETAG, etag)
        .body(Body::from_stream(download.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

/// RFC 5987 `attr-char` minus alphanumerics.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// `attachment` disposition with an ASCII `filename` and, for any other
/// name, an RFC 6266 `filename*` carrying the UTF-8 original.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            ' '..='~' => c,
            _ => '_',
        })
        .collect();
    if fallback == name {
        return format!("attachment; filename=\"{name}\"");
    }
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        utf8_percent_encode(name, ATTR_CHAR)
    )
}
