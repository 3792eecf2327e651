//! Local filesystem storage provider.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::debug;

use docman_core::error::{AppError, ErrorKind};
use docman_core::result::AppResult;
use docman_core::traits::storage::{ByteStream, StorageProvider};

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored objects.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// Root directory of this provider.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative key to a path inside the root.
    fn resolve(&self, path: &str) -> AppResult<PathBuf> {
        let clean = Path::new(path.trim_start_matches('/'));
        if clean
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(AppError::storage(format!("Invalid storage key: '{path}'")));
        }
        Ok(self.root.join(clean))
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

fn open_error(path: &str, action: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("Object not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to {action}: {path}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false))
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path)?;
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| open_error(path, "open", e))?;
        Ok(Box::pin(ReaderStream::new(file)))
    }

    async fn read_bytes(&self, path: &str) -> AppResult<Bytes> {
        let full_path = self.resolve(path)?;
        let data = fs::read(&full_path)
            .await
            .map_err(|e| open_error(path, "read", e))?;
        Ok(Bytes::from(data))
    }

    async fn write_stream(&self, path: &str, mut stream: ByteStream) -> AppResult<u64> {
        let full_path = self.resolve(path)?;
        self.ensure_parent(&full_path).await?;

        let mut file = fs::File::create(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create object: {path}"),
                e,
            )
        })?;

        let mut total_bytes = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk
                .map_err(|e| AppError::with_source(ErrorKind::Storage, "Stream read error", e))?;
            total_bytes += chunk.len() as u64;
            file.write_all(&chunk).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to write chunk", e)
            })?;
        }

        file.sync_all()
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to sync object", e))?;

        debug!(path, bytes = total_bytes, "Wrote object from stream");
        Ok(total_bytes)
    }

    async fn rename(&self, from: &str, to: &str) -> AppResult<()> {
        let from_path = self.resolve(from)?;
        let to_path = self.resolve(to)?;
        self.ensure_parent(&to_path).await?;

        fs::rename(&from_path, &to_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to rename {from} -> {to}"),
                e,
            )
        })
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        let full_path = self.resolve(path)?;
        fs::try_exists(&full_path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to check object: {path}"),
                e,
            )
        })
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path)?;
        match fs::remove_file(&full_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to delete object: {path}"),
                e,
            )),
        }
    }
}
