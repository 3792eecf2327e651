//! Directory creation, listing and breadcrumb resolution.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use docman_core::error::AppError;
use docman_core::result::AppResult;
use docman_database::repositories::DirectoryRepository;
use docman_entity::directory::{CreateDirectory, Directory};
use docman_entity::naming::validate_name;

use crate::context::RequestContext;

/// Owns the directory tree.
///
/// Directories attach only below existing nodes and never move, so the tree
/// stays acyclic by construction. Sibling names are unique; the storage
/// layer enforces it, so racing creators get `Conflict`.
#[derive(Clone)]
pub struct DirectoryTree {
    directories: Arc<dyn DirectoryRepository>,
}

impl std::fmt::Debug for DirectoryTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryTree").finish_non_exhaustive()
    }
}

impl DirectoryTree {
    /// Creates a directory tree service.
    pub fn new(directories: Arc<dyn DirectoryRepository>) -> Self {
        Self { directories }
    }

    /// Create `name` under `parent_id` (None = root), owned by the caller.
    pub async fn create_directory(
        &self,
        ctx: &RequestContext,
        parent_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Directory> {
        validate_name("Directory name", name)?;
        if let Some(parent) = parent_id {
            self.get_directory(parent).await?;
        }

        let directory = self
            .directories
            .create(CreateDirectory {
                parent_id,
                name: name.to_string(),
                owner_id: ctx.user_id,
            })
            .await?;

        info!(
            user_id = %ctx.user_id,
            directory_id = %directory.id,
            parent_id = ?parent_id,
            name = %directory.name,
            "Directory created"
        );
        Ok(directory)
    }

    /// Look up one directory.
    pub async fn get_directory(&self, id: Uuid) -> AppResult<Directory> {
        self.directories
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Directory {id} not found")))
    }

    /// Children of `parent_id` (None = root), ordered by name.
    pub async fn list_children(&self, parent_id: Option<Uuid>) -> AppResult<Vec<Directory>> {
        if let Some(parent) = parent_id {
            self.get_directory(parent).await?;
        }
        self.directories.list_children(parent_id).await
    }

    /// Names from the top-level ancestor down to `directory_id`, inclusive.
    pub async fn resolve_path(&self, directory_id: Uuid) -> AppResult<Vec<String>> {
        let chain = self.directories.ancestors(directory_id).await?;
        if chain.is_empty() {
            return Err(AppError::not_found(format!(
                "Directory {directory_id} not found"
            )));
        }
        Ok(chain.into_iter().map(|d| d.name).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docman_core::ErrorKind;
    use docman_database::repositories::MemoryStore;
    use docman_entity::user::UserRole;

    fn tree() -> DirectoryTree {
        DirectoryTree::new(Arc::new(MemoryStore::new()))
    }

    fn ctx() -> RequestContext {
        RequestContext::new(Uuid::new_v4(), Uuid::new_v4(), UserRole::Member, "u@example.com")
    }

    #[tokio::test]
    async fn test_duplicate_root_directory_conflicts() {
        let tree = tree();
        let ctx = ctx();
        tree.create_directory(&ctx, None, "Projects").await.unwrap();
        let err = tree
            .create_directory(&ctx, None, "Projects")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(tree.list_children(None).await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_creators_get_one_directory() {
        let tree = tree();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tree = tree.clone();
                tokio::spawn(async move { tree.create_directory(&ctx(), None, "Projects").await })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert_eq!(err.kind, ErrorKind::Conflict),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(tree.list_children(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_same_name_under_different_parents() {
        let tree = tree();
        let ctx = ctx();
        let a = tree.create_directory(&ctx, None, "a").await.unwrap();
        let b = tree.create_directory(&ctx, None, "b").await.unwrap();
        tree.create_directory(&ctx, Some(a.id), "docs").await.unwrap();
        tree.create_directory(&ctx, Some(b.id), "docs").await.unwrap();
        assert_eq!(tree.list_children(Some(a.id)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_path_reproduces_creation_names() {
        let tree = tree();
        let ctx = ctx();
        let names = ["Projects", "2026", "Q3 reports"];
        let mut parent = None;
        for name in names {
            parent = Some(tree.create_directory(&ctx, parent, name).await.unwrap().id);
        }
        let path = tree.resolve_path(parent.unwrap()).await.unwrap();
        assert_eq!(path, names);
    }

    #[tokio::test]
    async fn test_rejects_invalid_names() {
        let tree = tree();
        let ctx = ctx();
        for bad in ["", "   ", "a/b", "..", "x\0y"] {
            let err = tree.create_directory(&ctx, None, bad).await.unwrap_err();
            assert_eq!(err.kind, ErrorKind::Validation, "{bad:?}");
        }
        assert!(tree.list_children(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_parent_is_not_found() {
        let tree = tree();
        let ctx = ctx();
        let missing = Uuid::new_v4();
        let err = tree
            .create_directory(&ctx, Some(missing), "orphan")
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(
            tree.list_children(Some(missing)).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
        assert_eq!(
            tree.resolve_path(missing).await.unwrap_err().kind,
            ErrorKind::NotFound
        );
    }
}
