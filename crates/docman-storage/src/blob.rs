//! Content-addressed payload store.
//!
//! Payloads live at `blobs/<first two hex chars>/<digest>`. Uploads are
//! streamed to `tmp/<uuid>` while being hashed, then renamed into place, so
//! a blob path only ever holds complete content. Identical payloads share a
//! single blob; version rows are never merged because of it.

use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use futures::StreamExt;
use tracing::{debug, warn};
use uuid::Uuid;

use docman_core::error::{AppError, ErrorKind};
use docman_core::result::AppResult;
use docman_core::traits::storage::{ByteStream, StorageProvider};

use crate::digest::{ContentDigest, Sha256Hasher};

const BLOB_PREFIX: &str = "blobs";
const TMP_PREFIX: &str = "tmp";

/// Result of storing a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    /// Digest of the stored bytes.
    pub digest: ContentDigest,
    /// Number of bytes stored.
    pub size_bytes: u64,
}

/// Digest-keyed blob storage over a [`StorageProvider`].
#[derive(Debug, Clone)]
pub struct BlobStore {
    provider: Arc<dyn StorageProvider>,
}

impl BlobStore {
    /// Create a blob store on top of a provider.
    pub fn new(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// Storage key of a digest.
    pub fn blob_path(digest: &ContentDigest) -> String {
        let hex = digest.as_str();
        format!("{BLOB_PREFIX}/{}/{hex}", &hex[..2])
    }

    /// Drain `stream` into the store, hashing as it goes.
    pub async fn put_stream(&self, stream: ByteStream) -> AppResult<StoredBlob> {
        let hasher = Arc::new(Mutex::new(Sha256Hasher::new()));
        let tap = Arc::clone(&hasher);
        let hashed: ByteStream = Box::pin(stream.inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                tap.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .update(bytes);
            }
        }));

        let tmp_path = format!("{TMP_PREFIX}/{}", Uuid::new_v4());
        let written = match self.provider.write_stream(&tmp_path, hashed).await {
            Ok(n) => n,
            Err(e) => {
                self.discard(&tmp_path).await;
                return Err(e);
            }
        };

        let digest = {
            let mut guard = hasher.lock().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *guard).finalize()
        };
        let final_path = Self::blob_path(&digest);

        if self.provider.exists(&final_path).await? {
            self.discard(&tmp_path).await;
            debug!(digest = %digest, "Blob already stored");
        } else if let Err(e) = self.provider.rename(&tmp_path, &final_path).await {
            self.discard(&tmp_path).await;
            return Err(e);
        } else {
            debug!(digest = %digest, bytes = written, "Stored blob");
        }

        Ok(StoredBlob {
            digest,
            size_bytes: written,
        })
    }

    /// Open a stored payload as a stream.
    ///
    /// A missing blob is reported as `PayloadMissing`: the caller already
    /// knows the digest from a version row, so absence means lost content.
    pub async fn open(&self, digest: &ContentDigest) -> AppResult<ByteStream> {
        self.provider
            .read(&Self::blob_path(digest))
            .await
            .map_err(|e| missing_payload(digest, e))
    }

    /// Read a stored payload into memory.
    pub async fn read_all(&self, digest: &ContentDigest) -> AppResult<Bytes> {
        self.provider
            .read_bytes(&Self::blob_path(digest))
            .await
            .map_err(|e| missing_payload(digest, e))
    }

    /// Check the underlying provider.
    pub async fn health_check(&self) -> AppResult<bool> {
        self.provider.health_check().await
    }

    async fn discard(&self, tmp_path: &str) {
        if let Err(e) = self.provider.delete(tmp_path).await {
            warn!(path = tmp_path, error = %e, "Failed to remove temporary upload");
        }
    }
}

fn missing_payload(digest: &ContentDigest, e: AppError) -> AppError {
    if e.kind == ErrorKind::NotFound {
        AppError::payload_missing(format!("Stored content {digest} is missing"))
    } else {
        e
    }
}
