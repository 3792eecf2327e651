//! # docman-core
//!
//! Core crate for Docman. Contains configuration schemas, the storage
//! provider trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Docman crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
