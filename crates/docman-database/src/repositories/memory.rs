//! Process-local implementation of every repository trait.
//!
//! All tables sit behind one `RwLock`, so each trait method is atomic with
//! respect to the others. The uniqueness rules mirror the Postgres indexes.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use docman_core::error::AppError;
use docman_core::result::AppResult;
use docman_entity::directory::{CreateDirectory, Directory};
use docman_entity::file::{CreateFile, File, FileSummary, FileVersion, NewFileVersion};
use docman_entity::session::{CreateSession, Session};
use docman_entity::user::{CreateUser, User, UserRole};

use super::{DirectoryRepository, FileRepository, SessionRepository, UserRepository};

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    sessions: HashMap<Uuid, Session>,
    directories: HashMap<Uuid, Directory>,
    files: HashMap<Uuid, File>,
    /// Versions of each file, kept sorted by version number.
    versions: HashMap<Uuid, Vec<FileVersion>>,
}

impl Tables {
    fn file_at(&self, directory_id: Option<Uuid>, name: &str) -> Option<&File> {
        self.files
            .values()
            .find(|f| f.directory_id == directory_id && f.name == name)
    }

    fn latest(&self, file_id: Uuid) -> Option<&FileVersion> {
        self.versions.get(&file_id).and_then(|v| v.last())
    }

    fn push_version(&mut self, version: NewFileVersion) -> AppResult<FileVersion> {
        if !self.files.contains_key(&version.file_id) {
            return Err(AppError::not_found(format!(
                "File {} not found",
                version.file_id
            )));
        }
        if version.version_number < 1 {
            return Err(AppError::validation("Version numbers start at 1"));
        }

        let rows = self.versions.entry(version.file_id).or_default();
        if rows.iter().any(|v| v.version_number == version.version_number) {
            return Err(AppError::conflict(format!(
                "Version {} of file {} was claimed by a concurrent upload",
                version.version_number, version.file_id
            )));
        }

        let row = FileVersion {
            id: Uuid::new_v4(),
            file_id: version.file_id,
            version_number: version.version_number,
            file_name: version.file_name,
            digest_hex: version.digest_hex,
            size_bytes: version.size_bytes,
            created_by: version.created_by,
            created_at: Utc::now(),
        };
        let at = rows.partition_point(|v| v.version_number < row.version_number);
        rows.insert(at, row.clone());
        Ok(row)
    }
}

/// In-memory metadata store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, data: CreateUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == data.email) {
            return Err(AppError::conflict(format!(
                "An account with email '{}' already exists",
                data.email
            )));
        }
        let role = if tables.users.is_empty() {
            UserRole::Admin
        } else {
            UserRole::Member
        };
        let user = User {
            id: Uuid::new_v4(),
            email: data.email,
            name: data.name,
            password_hash: data.password_hash,
            role,
            created_at: Utc::now(),
            last_login_at: None,
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(user) = self.tables.write().await.users.get_mut(&id) {
            user.last_login_at = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn create(&self, data: CreateSession) -> AppResult<Session> {
        let session = Session {
            id: data.id,
            user_id: data.user_id,
            created_at: Utc::now(),
            expires_at: data.expires_at,
            revoked_at: None,
        };
        let mut tables = self.tables.write().await;
        if tables.sessions.contains_key(&session.id) {
            return Err(AppError::conflict(format!(
                "Session {} already exists",
                session.id
            )));
        }
        tables.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>> {
        Ok(self.tables.read().await.sessions.get(&id).cloned())
    }

    async fn revoke(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<()> {
        if let Some(session) = self.tables.write().await.sessions.get_mut(&id) {
            session.revoked_at.get_or_insert(at);
        }
        Ok(())
    }

    async fn delete_expired(&self, before: DateTime<Utc>) -> AppResult<u64> {
        let mut tables = self.tables.write().await;
        let len = tables.sessions.len();
        tables.sessions.retain(|_, s| s.expires_at >= before);
        Ok((len - tables.sessions.len()) as u64)
    }
}

#[async_trait]
impl DirectoryRepository for MemoryStore {
    async fn create(&self, data: CreateDirectory) -> AppResult<Directory> {
        let mut tables = self.tables.write().await;
        if let Some(parent_id) = data.parent_id {
            if !tables.directories.contains_key(&parent_id) {
                return Err(AppError::not_found(format!(
                    "Parent directory {parent_id} not found"
                )));
            }
        }
        if tables
            .directories
            .values()
            .any(|d| d.parent_id == data.parent_id && d.name == data.name)
        {
            return Err(AppError::conflict(format!(
                "Directory '{}' already exists in this location",
                data.name
            )));
        }
        let directory = Directory {
            id: Uuid::new_v4(),
            name: data.name,
            parent_id: data.parent_id,
            owner_id: data.owner_id,
            created_at: Utc::now(),
        };
        tables.directories.insert(directory.id, directory.clone());
        Ok(directory)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Directory>> {
        Ok(self.tables.read().await.directories.get(&id).cloned())
    }

    async fn list_children(&self, parent_id: Option<Uuid>) -> AppResult<Vec<Directory>> {
        let tables = self.tables.read().await;
        let mut children: Vec<Directory> = tables
            .directories
            .values()
            .filter(|d| d.parent_id == parent_id)
            .cloned()
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    async fn ancestors(&self, id: Uuid) -> AppResult<Vec<Directory>> {
        let tables = self.tables.read().await;
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(directory) = tables.directories.get(&current) else {
                break;
            };
            if chain.len() > tables.directories.len() {
                return Err(AppError::internal(format!(
                    "Directory {id} has a cyclic parent chain"
                )));
            }
            chain.push(directory.clone());
            cursor = directory.parent_id;
        }
        chain.reverse();
        Ok(chain)
    }
}

#[async_trait]
impl FileRepository for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<File>> {
        Ok(self.tables.read().await.files.get(&id).cloned())
    }

    async fn find_by_location(
        &self,
        directory_id: Option<Uuid>,
        name: &str,
    ) -> AppResult<Option<File>> {
        Ok(self.tables.read().await.file_at(directory_id, name).cloned())
    }

    async fn create_with_first_version(
        &self,
        file: CreateFile,
        version: NewFileVersion,
    ) -> AppResult<(File, FileVersion)> {
        if version.file_id != file.id {
            return Err(AppError::internal(
                "First version must reference the file being created",
            ));
        }

        let mut tables = self.tables.write().await;
        if let Some(directory_id) = file.directory_id {
            if !tables.directories.contains_key(&directory_id) {
                return Err(AppError::not_found(format!(
                    "Directory {directory_id} not found"
                )));
            }
        }
        if tables.file_at(file.directory_id, &file.name).is_some() {
            return Err(AppError::conflict(format!(
                "File '{}' already exists in this directory",
                file.name
            )));
        }

        let created = File {
            id: file.id,
            name: file.name,
            directory_id: file.directory_id,
            owner_id: file.owner_id,
            created_at: Utc::now(),
        };
        tables.files.insert(created.id, created.clone());
        match tables.push_version(version) {
            Ok(first) => Ok((created, first)),
            Err(e) => {
                tables.files.remove(&created.id);
                tables.versions.remove(&created.id);
                Err(e)
            }
        }
    }

    async fn insert_version(&self, version: NewFileVersion) -> AppResult<FileVersion> {
        self.tables.write().await.push_version(version)
    }

    async fn max_version_number(&self, file_id: Uuid) -> AppResult<Option<i32>> {
        let tables = self.tables.read().await;
        Ok(tables.latest(file_id).map(|v| v.version_number))
    }

    async fn list_versions(&self, file_id: Uuid) -> AppResult<Vec<FileVersion>> {
        let tables = self.tables.read().await;
        Ok(tables.versions.get(&file_id).cloned().unwrap_or_default())
    }

    async fn find_version(&self, file_id: Uuid, number: i32) -> AppResult<Option<FileVersion>> {
        let tables = self.tables.read().await;
        Ok(tables
            .versions
            .get(&file_id)
            .and_then(|rows| rows.iter().find(|v| v.version_number == number))
            .cloned())
    }

    async fn find_version_by_id(&self, id: Uuid) -> AppResult<Option<FileVersion>> {
        let tables = self.tables.read().await;
        Ok(tables
            .versions
            .values()
            .flat_map(|rows| rows.iter())
            .find(|v| v.id == id)
            .cloned())
    }

    async fn list_summaries(&self, owner_id: Option<Uuid>) -> AppResult<Vec<FileSummary>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<FileSummary> = tables
            .files
            .values()
            .filter(|f| owner_id.is_none_or(|owner| f.owner_id == owner))
            .filter_map(|f| tables.latest(f.id).map(|v| FileSummary::from_parts(f, v)))
            .collect();
        rows.sort_by(|a, b| {
            a.file_name
                .cmp(&b.file_name)
                .then_with(|| a.file_id.cmp(&b.file_id))
        });
        Ok(rows)
    }

    async fn list_all_versions(&self, owner_id: Option<Uuid>) -> AppResult<Vec<FileVersion>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<FileVersion> = tables
            .files
            .values()
            .filter(|f| owner_id.is_none_or(|owner| f.owner_id == owner))
            .filter_map(|f| tables.versions.get(&f.id))
            .flat_map(|rows| rows.iter().cloned())
            .collect();
        rows.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.version_number.cmp(&a.version_number))
        });
        Ok(rows)
    }
}
