//! Storage provider trait for pluggable payload backends.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading and writing payloads.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for payload storage backends.
///
/// Paths are relative, `/`-separated keys. The trait is defined here in
/// `docman-core` and implemented in `docman-storage`.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Open a stored object as a byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Read a stored object into memory.
    async fn read_bytes(&self, path: &str) -> AppResult<Bytes>;

    /// Drain a byte stream into the given path. Returns bytes written.
    async fn write_stream(&self, path: &str, stream: ByteStream) -> AppResult<u64>;

    /// Move an object within this provider.
    async fn rename(&self, from: &str, to: &str) -> AppResult<()>;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Delete the object at the given path. Missing objects are not an error.
    async fn delete(&self, path: &str) -> AppResult<()>;
}
