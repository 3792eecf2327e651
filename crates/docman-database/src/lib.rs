//! # docman-database
//!
//! Metadata persistence for Docman. Repository traits live in
//! [`repositories`]; `postgres` implements them with sqlx and `memory`
//! implements them with process-local maps for tests and single-node use.

pub mod connection;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::Repositories;
