//! Repository traits and the backend selector.
//!
//! Every trait is implemented twice: by the `postgres` repositories and by
//! [`MemoryStore`]. Both report uniqueness violations as
//! [`ErrorKind::Conflict`](docman_core::ErrorKind::Conflict) so callers can
//! treat them identically.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use docman_core::config::{DatabaseConfig, DatabaseProvider};
use docman_core::result::AppResult;
use docman_entity::directory::{CreateDirectory, Directory};
use docman_entity::file::{CreateFile, File, FileSummary, FileVersion, NewFileVersion};
use docman_entity::session::{CreateSession, Session};
use docman_entity::user::{CreateUser, User};

use crate::connection::DatabasePool;

pub use memory::MemoryStore;
pub use postgres::{
    PgDirectoryRepository, PgFileRepository, PgSessionRepository, PgUserRepository,
};

/// Account persistence.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Insert a user. Fails with `Conflict` if the email is taken.
    ///
    /// The first account ever stored gets `UserRole::Admin`, every later
    /// one `UserRole::Member`. The check and the insert are one atomic
    /// step, so concurrent first signups yield exactly one admin.
    async fn create(&self, data: CreateUser) -> AppResult<User>;

    /// Find a user by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by normalized email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Stamp `last_login_at`.
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;
}

/// Login session persistence.
#[async_trait]
pub trait SessionRepository: Send + Sync + 'static {
    /// Open a session.
    async fn create(&self, data: CreateSession) -> AppResult<Session>;

    /// Find a session by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Mark a session revoked. Revoking twice keeps the first timestamp.
    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()>;

    /// Delete sessions that expired before `before`. Returns rows removed.
    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64>;
}

/// Directory tree persistence.
#[async_trait]
pub trait DirectoryRepository: Send + Sync + 'static {
    /// Insert a directory.
    ///
    /// Fails with `Conflict` when a sibling already uses the name and with
    /// `NotFound` when the parent does not exist.
    async fn create(&self, data: CreateDirectory) -> AppResult<Directory>;

    /// Find a directory by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Directory>>;

    /// Children of `parent_id` (None = root), ordered by name.
    async fn list_children(&self, parent_id: Option<Uuid>) -> AppResult<Vec<Directory>>;

    /// The chain from the top-level ancestor down to `id`, inclusive.
    /// Empty when `id` does not exist.
    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Directory>>;
}

/// File and version persistence.
#[async_trait]
pub trait FileRepository: Send + Sync + 'static {
    /// Find a file by id.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>>;

    /// Find the file named `name` in `directory_id` (None = root).
    async fn find_by_location(
        &self,
        directory_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>>;

    /// Atomically insert a file together with its first version.
    ///
    /// Fails with `Conflict` when another file already occupies the
    /// location; nothing is written in that case.
    async fn create_with_first_version(
        &self,
        file: CreateFile,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)>;

    /// Insert a version row claiming `version.version_number`.
    ///
    /// Fails with `Conflict` when the number is already taken for the file.
    async fn insert_version(&self, version: NewFileVersion) -> AppResult<FileVersion>;

    /// Highest version number of a file, if it has any version.
    async fn max_version_number(&self, file_id: Uuid) -> AppResult<Option<i32>>;

    /// All versions of a file, ascending by number.
    async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>>;

    /// One version of a file by number.
    async fn find_version(&self, file_id: Uuid, number: i32) -> AppResult<Option<FileVersion>>;

    /// One version by its own id.
    async fn find_version_by_id(&self, id: Uuid) -> AppResult<Option<FileVersion>>;

    /// Files with their latest version, ordered by name. `owner_id`
    /// restricts the listing to one owner.
    async fn list_summaries(&self, owner_id: Option<Uuid>) -> AppResult<Vec<FileSummary>>;

    /// Every version row, newest first, optionally restricted to files of
    /// one owner.
    async fn list_all_versions(&self, owner_id: Option<Uuid>) -> AppResult<Vec<FileVersion>>;
}

/// The set of repositories the services are built from.
#[derive(Clone)]
pub struct Repositories {
    /// Accounts.
    pub users: Arc<dyn UserRepository>,
    /// Login sessions.
    pub sessions: Arc<dyn SessionRepository>,
    /// Directory tree.
    pub directories: Arc<dyn DirectoryRepository>,
    /// Files and versions.
    pub files: Arc<dyn FileRepository>,
    /// Pool handle when backed by Postgres.
    pub pool: Option<DatabasePool>,
}

impl Repositories {
    /// Build repositories for the configured provider.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Postgres => {
                let pool = DatabasePool::connect(config).await?;
                Ok(Self::postgres(pool))
            }
            DatabaseProvider::Memory => {
                info!("Using in-memory metadata store; data is lost on restart");
                Ok(Self::memory())
            }
        }
    }

    /// Postgres-backed repositories sharing one pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            users: Arc::new(PgUserRepository::new(pg.clone())),
            sessions: Arc::new(PgSessionRepository::new(pg.clone())),
            directories: Arc::new(PgDirectoryRepository::new(pg.clone())),
            files: Arc::new(PgFileRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// Repositories over one fresh [`MemoryStore`].
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            sessions: store.clone(),
            directories: store.clone(),
            files: store,
            pool: None,
        }
    }

    /// Backend name for logs and the health endpoint.
    pub fn provider_name(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// Check the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(pool) => pool.ping().await,
            None => Ok(true),
        }
    }
}

impl std::fmt::Debug for Repositories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repositories")
            .field("provider", &self.provider_name())
            .finish()
    }
}
