//! Typed path parameter helpers.

use uuid::Uuid;

use docman_core::error::AppError;

/// Parses a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid id: '{s}'")))
}

/// Parses an optional UUID form or query value; empty means none.
pub fn parse_optional_uuid(s: Option<&str>) -> Result<Option<Uuid>, AppError> {
    match s.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_uuid(value).map(Some),
    }
}
