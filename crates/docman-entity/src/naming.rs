//! Name rules shared by directories and files.

use docman_core::{AppError, AppResult};

/// Longest accepted name, in bytes.
pub const MAX_NAME_BYTES: usize = 255;

/// Validate a directory or file name.
///
/// `what` is used in the error message ("Directory name", "File name").
pub fn validate_name(what: &str, name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation(format!("{what} must not be empty")));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(AppError::validation(format!(
            "{what} must not contain a path separator: '{name}'"
        )));
    }
    if name == "." || name == ".." {
        return Err(AppError::validation(format!("{what} must not be '{name}'")));
    }
    if name.chars().any(char::is_control) {
        return Err(AppError::validation(format!(
            "{what} must not contain control characters"
        )));
    }
    if name.len() > MAX_NAME_BYTES {
        return Err(AppError::validation(format!(
            "{what} exceeds {MAX_NAME_BYTES} bytes"
        )));
    }
    Ok(())
}
