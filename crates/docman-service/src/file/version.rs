//! Version history of a file: append, list, select, stream.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use docman_core::error::AppError;
use docman_core::result::AppResult;
use docman_core::traits::storage::ByteStream;
use docman_database::repositories::FileRepository;
use docman_entity::file::{FileVersion, NewFileVersion, VersionSelector};
use docman_storage::{BlobStore, ContentDigest, StoredBlob};

use crate::context::RequestContext;

/// Owns the mapping from a file to its ordered, append-only versions.
///
/// Version numbers are assigned as `max + 1` and claimed with a unique
/// `(file_id, version_number)` insert; losing that race surfaces as
/// `Conflict` and nothing is overwritten.
#[derive(Clone)]
pub struct VersionStore {
    files: Arc<dyn FileRepository>,
    blobs: BlobStore,
}

impl std::fmt::Debug for VersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionStore")
            .field("blobs", &self.blobs)
            .finish_non_exhaustive()
    }
}

impl VersionStore {
    /// Creates a version store over file metadata and blob storage.
    pub fn new(files: Arc<dyn FileRepository>, blobs: BlobStore) -> Self {
        Self { files, blobs }
    }

    /// Store `content` and append it as the next version of `file_id`.
    ///
    /// Fails with `Conflict` if a concurrent upload claimed the number first;
    /// the caller retries with [`append`](Self::append) since the payload is
    /// already stored.
    pub async fn create_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        file_name: &str,
        content: ByteStream,
    ) -> AppResult<FileVersion> {
        let blob = self.store_payload(content).await?;
        self.append(ctx, file_id, file_name, &blob).await
    }

    /// Hash and store a payload without touching any version history.
    pub async fn store_payload(&self, content: ByteStream) -> AppResult<StoredBlob> {
        self.blobs.put_stream(content).await
    }

    /// Append an already stored payload as version `max + 1` of `file_id`.
    pub async fn append(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        file_name: &str,
        blob: &StoredBlob,
    ) -> AppResult<FileVersion> {
        let next = self
            .files
            .max_version_number(file_id)
            .await?
            .map_or(1, |n| n + 1);

        let version = self
            .files
            .insert_version(new_version_row(ctx, file_id, next, file_name, blob)?)
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file_id,
            version = version.version_number,
            digest = %version.digest_hex,
            "Version created"
        );
        Ok(version)
    }

    /// All versions of a file, ascending by number.
    pub async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        self.files.list_versions(file_id).await
    }

    /// One version of a file by number or `latest`.
    pub async fn get_version(
        &self,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<FileVersion> {
        let number = match selector {
            VersionSelector::Number(n) => n,
            VersionSelector::Latest => self
                .files
                .max_version_number(file_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("File {file_id} has no versions")))?,
        };

        self.files
            .find_version(file_id, number)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Version {number} of file {file_id} not found"))
            })
    }

    /// One version by its own id.
    pub async fn get_version_by_id(&self, version_id: Uuid) -> AppResult<FileVersion> {
        self.files
            .find_version_by_id(version_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File version {version_id} not found")))
    }

    /// Version metadata and a stream of its bytes.
    ///
    /// An unknown id is `NotFound`; a known version whose payload is gone is
    /// `PayloadMissing`.
    pub async fn get_content(&self, version_id: Uuid) -> AppResult<(FileVersion, ByteStream)> {
        let version = self.get_version_by_id(version_id).await?;
        let stream = self.open(&version).await?;
        Ok((version, stream))
    }

    /// Stream the payload of a version already looked up.
    pub async fn open(&self, version: &FileVersion) -> AppResult<ByteStream> {
        let digest = stored_digest(version)?;
        self.blobs.open(&digest).await
    }

    /// Read the payload of a version into memory.
    pub async fn read_all(&self, version: &FileVersion) -> AppResult<Bytes> {
        let digest = stored_digest(version)?;
        self.blobs.read_all(&digest).await
    }
}

/// Build the row for version `number` of `file_id` from a stored payload.
pub(crate) fn new_version_row(
    ctx: &RequestContext,
    file_id: Uuid,
    number: i32,
    file_name: &str,
    blob: &StoredBlob,
) -> AppResult<NewFileVersion> {
    let size_bytes = i64::try_from(blob.size_bytes)
        .map_err(|_| AppError::payload_too_large("Payload size exceeds the supported range"))?;
    Ok(NewFileVersion {
        file_id,
        version_number: number,
        file_name: file_name.to_string(),
        digest_hex: blob.digest.as_str().to_string(),
        size_bytes,
        created_by: ctx.user_id,
    })
}

fn stored_digest(version: &FileVersion) -> AppResult<ContentDigest> {
    ContentDigest::parse(&version.digest_hex).map_err(|_| {
        AppError::internal(format!(
            "Version {} has a malformed digest",
            version.id
        ))
    })
}
