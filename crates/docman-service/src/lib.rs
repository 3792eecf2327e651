//! # docman-service
//!
//! The versioning core of Docman. Services are built from repository and
//! storage handles passed in at construction time and receive the caller's
//! [`RequestContext`] explicitly on every operation.
//!
//! - [`VersionStore`] owns the ordered version history of each file
//! - [`DirectoryTree`] owns the directory hierarchy
//! - [`FileRegistry`] joins the two and is what the API talks to
//! - [`DiffEngine`] computes and applies line deltas between versions

pub mod context;
pub mod diff;
pub mod directory;
pub mod file;

pub use context::RequestContext;
pub use diff::{Delta, DeltaBody, DiffEngine, DiffStats, Hunk, HunkKind};
pub use directory::DirectoryTree;
pub use file::{Download, FileRegistry, UploadOutcome, VersionStore};

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;
    use std::sync::Arc;

    use bytes::Bytes;
    use futures::StreamExt;
    use tempfile::TempDir;
    use uuid::Uuid;

    use docman_auth::VisibilityPolicy;
    use docman_core::config::{DiffConfig, Visibility};
    use docman_core::traits::storage::ByteStream;
    use docman_database::repositories::MemoryStore;
    use docman_entity::user::UserRole;
    use docman_storage::{BlobStore, LocalStorageProvider};

    use crate::{DiffEngine, DirectoryTree, FileRegistry, RequestContext, VersionStore};

    pub struct Fixture {
        pub dir: TempDir,
        pub registry: FileRegistry,
        pub directories: DirectoryTree,
        pub diff: DiffEngine,
    }

    impl Fixture {
        pub fn data_root(&self) -> PathBuf {
            self.dir.path().to_path_buf()
        }
    }

    pub async fn fixture(visibility: Visibility, retry_attempts: u32) -> Fixture {
        let dir = TempDir::new().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        let store = Arc::new(MemoryStore::new());

        let directories = DirectoryTree::new(store.clone());
        let versions = VersionStore::new(store.clone(), BlobStore::new(Arc::new(provider)));
        let registry = FileRegistry::new(
            store,
            versions,
            directories.clone(),
            Arc::new(VisibilityPolicy::new(visibility)),
            retry_attempts,
        );
        let diff = DiffEngine::new(registry.clone(), DiffConfig::default());

        Fixture {
            dir,
            registry,
            directories,
            diff,
        }
    }

    pub fn actor(role: UserRole) -> RequestContext {
        RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), role, "user@example.com")
    }

    pub fn content(data: &[u8]) -> ByteStream {
        let chunk: Result<Bytes, std::io::Error> = Ok(Bytes::copy_from_slice(data));
        Box::pin(futures::stream::iter([chunk]))
    }

    pub async fn collect(mut stream: ByteStream) -> Vec<u8> {
        let mut out = Vec::new();
        while let Some(chunk) = stream.next().await {
            out.extend_from_slice(&chunk.unwrap());
        }
        out
    }
}
