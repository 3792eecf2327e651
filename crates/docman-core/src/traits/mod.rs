//! Core trait definitions implemented by other Docman crates.

pub mod storage;

pub use storage::{ByteStream, StorageProvider};
