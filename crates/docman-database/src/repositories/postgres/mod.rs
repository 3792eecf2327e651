//! PostgreSQL repository implementations.

pub mod directory;
pub mod file;
pub mod session;
pub mod user;

pub use directory::PgDirectoryRepository;
pub use file::PgFileRepository;
pub use session::PgSessionRepository;
pub use user::PgUserRepository;

/// Name of the constraint a database error violated, if any.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}
