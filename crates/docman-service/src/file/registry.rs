//! The file registry: uploads into directories, listings, downloads.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use docman_auth::AccessController;
use docman_core::error::{AppError, ErrorKind};
use docman_core::result::AppResult;
use docman_core::traits::storage::ByteStream;
use docman_database::repositories::FileRepository;
use docman_entity::file::{
    CreateFile, File, FileSummary, FileVersion, ListScope, VersionSelector,
};
use docman_entity::naming::validate_name;
use docman_storage::StoredBlob;

use super::version::{VersionStore, new_version_row};
use crate::context::RequestContext;
use crate::directory::DirectoryTree;

/// Result of an upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// The file the version was appended to.
    pub file: File,
    /// The new version.
    pub version: FileVersion,
    /// Whether this upload created the file.
    pub created: bool,
}

/// A version ready to be streamed to a client.
pub struct Download {
    /// Metadata of the version being sent.
    pub version: FileVersion,
    /// Payload bytes.
    pub stream: ByteStream,
}

impl Download {
    /// File name to present to the client.
    pub fn file_name(&self) -> &str {
        &self.version.file_name
    }
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}

/// Composes [`VersionStore`] and [`DirectoryTree`] into the operations a
/// user performs on files.
#[derive(Clone)]
pub struct FileRegistry {
    files: Arc<dyn FileRepository>,
    versions: VersionStore,
    directories: DirectoryTree,
    access: Arc<dyn AccessController>,
    retry_attempts: u32,
}

impl std::fmt::Debug for FileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRegistry")
            .field("versions", &self.versions)
            .field("access", &self.access)
            .field("retry_attempts", &self.retry_attempts)
            .finish_non_exhaustive()
    }
}

impl FileRegistry {
    /// Creates a file registry.
    pub fn new(
        files: Arc<dyn FileRepository>,
        versions: VersionStore,
        directories: DirectoryTree,
        access: Arc<dyn AccessController>,
        retry_attempts: u32,
    ) -> Self {
        Self {
            files,
            versions,
            directories,
            access,
            retry_attempts: retry_attempts.max(1),
        }
    }

    /// The version store behind this registry.
    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    /// Files with their latest version, ordered by name.
    pub async fn list_files(
        &self,
        ctx: &RequestContext,
        scope: ListScope,
    ) -> AppResult<Vec<FileSummary>> {
        let owner = self.access.listing_owner_filter(ctx, scope);
        self.files.list_summaries(owner).await
    }

    /// Upload `content` as `name` into `directory_id` (None = root).
    ///
    /// The first upload to a location creates the file together with its
    /// first version in one transaction. Later uploads append. Version
    /// number races are retried with a fresh read of the current maximum;
    /// the payload itself is stored once.
    pub async fn upload_file(
        &self,
        ctx: &RequestContext,
        directory_id: Option<Uuid>,
        name: &str,
        content: ByteStream,
    ) -> AppResult<UploadOutcome> {
        validate_name("File name", name)?;
        if let Some(directory) = directory_id {
            self.directories.get_directory(directory).await?;
        }

        let blob = self.versions.store_payload(content).await?;

        for attempt in 1..=self.retry_attempts {
            match self.try_upload(ctx, directory_id, name, &blob).await {
                Err(e) if e.kind == ErrorKind::Conflict => {
                    warn!(
                        user_id = %ctx.user_id,
                        file_name = name,
                        attempt,
                        error = %e,
                        "Upload lost a race, retrying"
                    );
                }
                result => return result,
            }
        }

        Err(AppError::conflict(format!(
            "Could not record a new version of '{name}' after {} attempts; try again",
            self.retry_attempts
        )))
    }

    async fn try_upload(
        &self,
        ctx: &RequestContext,
        directory_id: Option<Uuid>,
        name: &str,
        blob: &StoredBlob,
    ) -> AppResult<UploadOutcome> {
        if let Some(file) = self.files.find_by_location(directory_id, name).await? {
            self.access.require_write(ctx, &file)?;
            let version = self.versions.append(ctx, file.id, &file.name, blob).await?;
            return Ok(UploadOutcome {
                file,
                version,
                created: false,
            });
        }

        let file_id = Uuid::new_v4();
        let (file, version) = self
            .files
            .create_with_first_version(
                CreateFile {
                    id: file_id,
                    name: name.to_string(),
                    directory_id,
                    owner_id: ctx.user_id,
                },
                new_version_row(ctx, file_id, 1, name, blob)?,
            )
            .await?;

        info!(
            user_id = %ctx.user_id,
            file_id = %file.id,
            directory_id = ?directory_id,
            file_name = name,
            digest = %version.digest_hex,
            "File created"
        );
        Ok(UploadOutcome {
            file,
            version,
            created: true,
        })
    }

    /// A file the caller may read.
    pub async fn get_file(&self, ctx: &RequestContext, file_id: Uuid) -> AppResult<File> {
        let file = self
            .files
            .find_by_id(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        self.access.require_read(ctx, &file)?;
        Ok(file)
    }

    /// A readable file together with its latest version.
    pub async fn get_file_summary(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> AppResult<FileSummary> {
        let file = self.get_file(ctx, file_id).await?;
        let latest = self
            .versions
            .get_version(file_id, VersionSelector::Latest)
            .await?;
        Ok(FileSummary::from_parts(&file, &latest))
    }

    /// Version history of a readable file, ascending.
    pub async fn list_versions(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
    ) -> AppResult<Vec<FileVersion>> {
        self.get_file(ctx, file_id).await?;
        self.versions.list_versions(file_id).await
    }

    /// One version of a readable file by number or `latest`.
    pub async fn get_file_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<FileVersion> {
        self.get_file(ctx, file_id).await?;
        self.versions.get_version(file_id, selector).await
    }

    /// One version by id, if its file is readable.
    pub async fn get_version(
        &self,
        ctx: &RequestContext,
        version_id: Uuid,
    ) -> AppResult<FileVersion> {
        let version = self.versions.get_version_by_id(version_id).await?;
        self.get_file(ctx, version.file_id).await?;
        Ok(version)
    }

    /// Every visible version row, newest first.
    pub async fn list_all_versions(&self, ctx: &RequestContext) -> AppResult<Vec<FileVersion>> {
        let owner = self.access.listing_owner_filter(ctx, ListScope::All);
        self.files.list_all_versions(owner).await
    }

    /// Stream one version of a file selected by number or `latest`.
    pub async fn download_version(
        &self,
        ctx: &RequestContext,
        file_id: Uuid,
        selector: VersionSelector,
    ) -> AppResult<Download> {
        let version = self.get_file_version(ctx, file_id, selector).await?;
        self.start_download(ctx, version).await
    }

    /// Stream one version selected by its id.
    pub async fn download_version_by_id(
        &self,
        ctx: &RequestContext,
        version_id: Uuid,
    ) -> AppResult<Download> {
        let version = self.get_version(ctx, version_id).await?;
        self.start_download(ctx, version).await
    }

    async fn start_download(
        &self,
        ctx: &RequestContext,
        version: FileVersion,
    ) -> AppResult<Download> {
        let stream = self.versions.open(&version).await?;
        info!(
            user_id = %ctx.user_id,
            file_id = %version.file_id,
            version = version.version_number,
            "Download started"
        );
        Ok(Download { version, stream })
    }
}
