//! # docman-entity
//!
//! Domain entity models for Docman. Every struct in this crate represents
//! a database table row or a domain value object. Database entities derive
//! `sqlx::FromRow` so the Postgres repositories can map rows directly.

pub mod directory;
pub mod file;
pub mod naming;
pub mod session;
pub mod user;
